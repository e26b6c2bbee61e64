//! Encounter assembly and the headless frame loop.

use anyhow::{Context, Result};
use battle_content::ContentFactory;
use battle_core::{
    BattleEvent, BattleOrchestrator, BattlePhase, BattleView, CommandPhase, InputState, Loot,
    ParticipantId,
};
use serde::Serialize;

use crate::config::SimConfig;
use crate::effects::builtin_effects;

/// Loads content and builds the orchestrator for `config.encounter`.
pub fn assemble(config: &SimConfig) -> Result<BattleOrchestrator> {
    let factory = ContentFactory::new(&config.content_dir);

    let battle_config = config.apply(
        factory
            .load_config()
            .with_context(|| format!("Failed to load config from {}", factory.data_dir().display()))?,
    );
    let (catalog, roster) = factory
        .load_roster(&config.encounter)
        .with_context(|| format!("Failed to assemble encounter '{}'", config.encounter))?;
    let inventory = factory.load_inventory().context("Failed to load party inventory")?;

    let effects = builtin_effects();
    for ability in catalog.iter() {
        if !effects.contains(&ability.effect) {
            tracing::warn!(ability = %ability.name, effect = %ability.effect, "no built-in routine");
        }
    }

    Ok(BattleOrchestrator::new(
        battle_config,
        roster,
        catalog,
        effects,
        inventory,
    ))
}

/// Scripted player input: confirms whatever is highlighted, skipping
/// disabled entries and empty categories.
#[derive(Debug, Default)]
pub struct AutoPilot {
    change_category: bool,
}

impl AutoPilot {
    pub fn next_input(&mut self, view: &BattleView) -> InputState {
        let Some(command) = &view.command else {
            return InputState::empty();
        };

        match command.phase {
            CommandPhase::Category if self.change_category => {
                self.change_category = false;
                InputState::DOWN
            }
            CommandPhase::AbilityList => {
                if command.options.get(command.cursor).is_some_and(|o| o.enabled) {
                    InputState::CONFIRM
                } else if command.options.iter().any(|o| o.enabled) {
                    InputState::DOWN
                } else {
                    self.change_category = true;
                    InputState::CANCEL
                }
            }
            CommandPhase::Info => InputState::LEFT,
            CommandPhase::Category | CommandPhase::Target => InputState::CONFIRM,
        }
    }
}

/// Final report printed as JSON.
#[derive(Debug, Serialize)]
pub struct Summary {
    pub encounter: String,
    pub outcome: BattlePhase,
    pub ticks: u64,
    pub elapsed_ms: u64,
    pub actions_executed: u32,
    pub actions_failed: u32,
    pub loot: Option<Loot>,
    pub view: BattleView,
}

/// Runs frames until the encounter ends or `max_ticks` is reached.
pub fn run(mut battle: BattleOrchestrator, config: &SimConfig) -> Summary {
    let mut pilot = AutoPilot::default();
    let mut actions_executed = 0;
    let mut actions_failed = 0;
    let mut loot = None;

    for _ in 0..config.max_ticks {
        let input = pilot.next_input(&battle.view());
        battle.update(config.frame_ms, input);

        for event in battle.drain_events() {
            match &event {
                BattleEvent::ActionExecuted { .. } => actions_executed += 1,
                BattleEvent::ActionFailed { .. } => actions_failed += 1,
                BattleEvent::LootGranted { loot: granted } => loot = Some(granted.clone()),
                _ => {}
            }
            log_event(&battle, &event);
        }

        if battle.is_finished() {
            break;
        }
    }

    if !battle.is_finished() {
        tracing::warn!(ticks = battle.tick(), "encounter still running at the tick limit");
    }

    Summary {
        encounter: config.encounter.clone(),
        outcome: battle.phase(),
        ticks: battle.tick(),
        elapsed_ms: battle.elapsed_ms(),
        actions_executed,
        actions_failed,
        loot,
        view: battle.view(),
    }
}

fn name(battle: &BattleOrchestrator, id: ParticipantId) -> &str {
    battle
        .roster()
        .get(id)
        .map_or("<unknown>", |p| p.name.as_str())
}

fn log_event(battle: &BattleOrchestrator, event: &BattleEvent) {
    match event {
        BattleEvent::ActionExecuted {
            participant,
            ability,
            target,
        } => {
            let ability = battle
                .catalog()
                .get(*ability)
                .map_or("<unknown>", |a| a.name.as_str());
            tracing::info!(
                "{} uses {} on {:?}",
                name(battle, *participant),
                ability,
                target
            );
        }
        BattleEvent::ActionFailed {
            participant,
            reason,
            ..
        } => {
            tracing::info!("{}'s action failed: {}", name(battle, *participant), reason);
        }
        BattleEvent::ParticipantDied { participant } => {
            tracing::info!("{} is defeated", name(battle, *participant));
        }
        BattleEvent::LootGranted { loot } => {
            tracing::info!(
                experience = loot.experience,
                drops = loot.drops.len(),
                "loot granted"
            );
        }
        other => tracing::debug!(?other, "battle event"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use battle_core::{AbilityId, CommandCategory, CommandView, OptionView};

    fn create_test_view(phase: CommandPhase, cursor: usize, enabled: &[bool]) -> BattleView {
        BattleView {
            phase: BattlePhase::Command,
            tick: 0,
            elapsed_ms: 0,
            frozen: false,
            participants: vec![],
            command: Some(CommandView {
                owner: ParticipantId(0),
                phase,
                category: CommandCategory::Attack,
                cursor,
                options: enabled
                    .iter()
                    .enumerate()
                    .map(|(i, &enabled)| OptionView {
                        ability: AbilityId(i as u32),
                        name: format!("option{i}"),
                        enabled,
                        available: None,
                    })
                    .collect(),
                target: None,
            }),
            command_queue: vec![ParticipantId(0)],
            ready_queue: vec![],
        }
    }

    #[test]
    fn pilot_skips_disabled_entries() {
        let mut pilot = AutoPilot::default();
        let view = create_test_view(CommandPhase::AbilityList, 0, &[false, true]);
        assert_eq!(pilot.next_input(&view), InputState::DOWN);

        let view = create_test_view(CommandPhase::AbilityList, 1, &[false, true]);
        assert_eq!(pilot.next_input(&view), InputState::CONFIRM);
    }

    #[test]
    fn pilot_leaves_empty_categories() {
        let mut pilot = AutoPilot::default();
        let view = create_test_view(CommandPhase::AbilityList, 0, &[false]);
        assert_eq!(pilot.next_input(&view), InputState::CANCEL);

        let view = create_test_view(CommandPhase::Category, 0, &[]);
        assert_eq!(pilot.next_input(&view), InputState::DOWN);
        assert_eq!(pilot.next_input(&view), InputState::CONFIRM);
    }

    #[test]
    fn bundled_encounter_runs_to_completion() {
        let config = SimConfig {
            speed: Some(battle_core::BattleSpeed::Fast),
            ..SimConfig::default()
        };
        let battle = assemble(&config).unwrap();
        let summary = run(battle, &config);

        assert!(summary.outcome.is_terminal(), "ended in {}", summary.outcome);
        assert!(summary.actions_executed > 0);
        assert_eq!(
            summary.loot.is_some(),
            summary.outcome == BattlePhase::Victory
        );
        assert!(summary.view.acting().count() <= 1);
        serde_json::to_string(&summary).unwrap();
    }
}
