//! Action execution.
//!
//! Execution runs entirely within one tick:
//! 1. **Cost check** against current SP, or the item's true count
//! 2. **Target re-validation**, re-resolving a stale target once
//! 3. **Routine lookup and invocation** through an [`EffectContext`]
//! 4. **Settlement**: SP deducted or item consumed, request marked executed
//!
//! The executor never changes participant state. The orchestrator moves the
//! source to `CoolDown` on [`Outcome::Applied`] and to `Idle` on
//! [`Outcome::Failed`].

use crate::config::BattleConfig;
use crate::error::{BattleError, Reference};
use crate::participant::{ParticipantId, ParticipantState, Roster};
use crate::status::{StatusChange, StatusScripts};
use crate::store::PartyStore;
use crate::target::{TargetDescriptor, TargetResolver};

use super::{AbilityId, EffectContext, EffectRegistry};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    Applied,
    Failed(BattleError),
}

impl Outcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Outcome::Applied)
    }

    /// State the source moves to once execution has finished.
    pub fn next_state(&self) -> ParticipantState {
        match self {
            Outcome::Applied => ParticipantState::CoolDown,
            Outcome::Failed(_) => ParticipantState::Idle,
        }
    }
}

/// Result of one execution, with what the orchestrator needs to report it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Execution {
    pub source: ParticipantId,
    pub outcome: Outcome,
    pub ability: Option<AbilityId>,
    pub target: Option<TargetDescriptor>,
    pub status_changes: Vec<(ParticipantId, StatusChange)>,
}

impl Execution {
    fn failed(source: ParticipantId, error: BattleError) -> Self {
        Self {
            source,
            outcome: Outcome::Failed(error),
            ability: None,
            target: None,
            status_changes: Vec::new(),
        }
    }
}

/// Explicit context for execution, borrowed from the orchestrator.
pub struct ExecutionContext<'a> {
    pub roster: &'a mut Roster,
    pub store: &'a mut dyn PartyStore,
    pub effects: &'a EffectRegistry,
    pub scripts: &'a dyn StatusScripts,
    pub config: &'a BattleConfig,
}

pub struct ActionExecutor;

impl ActionExecutor {
    /// Executes the pending request of `source`, which must be `Acting`.
    ///
    /// On failure the request is discarded (releasing any item reservation)
    /// before returning. On success it stays on the participant, marked
    /// executed, so its cool-down can be read.
    pub fn execute(ctx: &mut ExecutionContext<'_>, source: ParticipantId) -> Execution {
        let Some(participant) = ctx.roster.get_mut(source) else {
            return Execution::failed(source, BattleError::participant(source));
        };
        if participant.state() != ParticipantState::Acting {
            return Execution::failed(
                source,
                BattleError::InvalidTransition {
                    participant: source,
                    state: participant.state(),
                },
            );
        }
        let Some(mut request) = participant.pending_action.take().filter(|r| r.is_pending()) else {
            return Execution::failed(
                source,
                BattleError::ReferenceInvalid(Reference::PendingAction(source)),
            );
        };

        let ability = request.ability_ref().clone();
        let mut execution = Execution {
            source,
            outcome: Outcome::Applied,
            ability: Some(ability.id),
            target: Some(*request.target()),
            status_changes: Vec::new(),
        };

        // Cost against the current balance, not the one seen at selection.
        let cost = ability.sp_cost();
        let shortfall = match ability.item() {
            Some(item) => {
                let owned = ctx.store.item_true_count(item);
                (owned == 0).then_some(BattleError::InsufficientResource {
                    required: 1,
                    available: owned,
                })
            }
            None => {
                let available = ctx.store.get_resource_points(participant);
                (available < cost).then_some(BattleError::InsufficientResource {
                    required: cost,
                    available,
                })
            }
        };
        if let Some(error) = shortfall {
            request.discard(ctx.store);
            execution.outcome = Outcome::Failed(error);
            return execution;
        }

        let target = match TargetResolver::revalidate(
            ctx.roster,
            source,
            ability.target_type,
            request.target(),
        ) {
            Ok(target) => target,
            Err(error) => {
                request.discard(ctx.store);
                execution.outcome = Outcome::Failed(error);
                return execution;
            }
        };
        request.retarget(target);
        execution.target = Some(target);

        let Some(routine) = ctx.effects.get(&ability.effect) else {
            tracing::warn!(%source, effect = %ability.effect, "no routine registered");
            request.discard(ctx.store);
            execution.outcome =
                Outcome::Failed(BattleError::ReferenceInvalid(Reference::Effect(ability.effect.clone())));
            return execution;
        };

        let mut effect_ctx = EffectContext::new(
            ctx.roster,
            source,
            target,
            &ability,
            ctx.scripts,
            ctx.config.default_effect_duration_ms,
        );
        let result = routine.apply(&mut effect_ctx);
        let mutated = effect_ctx.is_mutated();
        execution.status_changes = effect_ctx.into_status_changes();

        if let Err(error) = result {
            if !mutated {
                tracing::warn!(%source, ability = %ability.id, %error, "effect routine failed");
                request.discard(ctx.store);
                execution.outcome = Outcome::Failed(BattleError::ExternalEffect(error));
                return execution;
            }
            tracing::warn!(
                %source,
                ability = %ability.id,
                %error,
                "effect routine failed after mutating state; action kept"
            );
        }

        // The routine may have touched the source's SP or the store; settle
        // against whatever is left.
        match ability.item() {
            Some(item) => {
                if let Err(error) = ctx.store.consume_item(item) {
                    tracing::warn!(%source, %item, %error, "item vanished before consumption");
                }
            }
            None => {
                if let Some(participant) = ctx.roster.get_mut(source) {
                    if let Err(error) = ctx.store.spend(participant, cost) {
                        tracing::warn!(%source, %error, "resource points ran short before settling");
                        participant.sp.drain(cost);
                    }
                }
            }
        }

        request.mark_executed();
        if let Some(participant) = ctx.roster.get_mut(source) {
            participant.pending_action = Some(request);
        }
        tracing::debug!(%source, ability = %ability.id, ?target, "action executed");
        execution
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::action::ability::tests::{create_test_item, create_test_skill};
    use crate::action::{ActionRequest, RequestStatus};
    use crate::error::EffectError;
    use crate::participant::tests::create_test_template;
    use crate::status::NoScripts;
    use crate::store::{Inventory, ItemId};
    use crate::target::TargetType;

    struct Fixture {
        roster: Roster,
        store: Inventory,
        effects: EffectRegistry,
        config: BattleConfig,
        hero: ParticipantId,
        foes: Vec<ParticipantId>,
    }

    fn create_test_fixture() -> Fixture {
        let mut roster = Roster::new();
        let foes = (0..2)
            .map(|i| roster.add(create_test_template(&format!("foe{i}"), true, 10)).unwrap())
            .collect();
        let hero = roster.add(create_test_template("hero", false, 10)).unwrap();

        let effects = EffectRegistry::new()
            .with("strike", |ctx: &mut EffectContext<'_>| -> Result<(), EffectError> {
                for id in ctx.target_ids() {
                    ctx.damage(id, 40);
                }
                Ok(())
            })
            .with("potion", |ctx: &mut EffectContext<'_>| -> Result<(), EffectError> {
                for id in ctx.target_ids() {
                    ctx.heal(id, 25);
                }
                Ok(())
            })
            .with("broken", |_: &mut EffectContext<'_>| -> Result<(), EffectError> {
                Err(EffectError::new("boom"))
            })
            .with("half-broken", |ctx: &mut EffectContext<'_>| -> Result<(), EffectError> {
                let target = ctx.target_ids()[0];
                ctx.damage(target, 5);
                Err(EffectError::new("boom"))
            });

        Fixture {
            roster,
            store: Inventory::new().with_item(ItemId(1), 1),
            effects,
            config: BattleConfig::default(),
            hero,
            foes,
        }
    }

    impl Fixture {
        fn submit(&mut self, ability: crate::action::Ability, target: TargetDescriptor) {
            let config = self.config.clone();
            if let Some(item) = ability.item() {
                self.store.reserve_item(item).unwrap();
            }
            let hero = self.roster.get_mut(self.hero).unwrap();
            hero.pending_action = Some(ActionRequest::new(self.hero, target, Arc::new(ability)));
            hero.enter_state(ParticipantState::Command, &config).unwrap();
            hero.enter_state(ParticipantState::Acting, &config).unwrap();
        }

        fn execute(&mut self) -> Execution {
            let mut ctx = ExecutionContext {
                roster: &mut self.roster,
                store: &mut self.store,
                effects: &self.effects,
                scripts: &NoScripts,
                config: &self.config,
            };
            ActionExecutor::execute(&mut ctx, self.hero)
        }

        fn hp(&self, id: ParticipantId) -> u32 {
            self.roster.get(id).unwrap().hp.current
        }
    }

    #[test]
    fn applies_and_deducts_cost() {
        let mut f = create_test_fixture();
        let foe = f.foes[0];
        f.submit(create_test_skill(1, 4, TargetType::Foe), TargetDescriptor::Actor { actor: foe });

        let execution = f.execute();
        assert_eq!(execution.outcome, Outcome::Applied);
        assert_eq!(f.hp(foe), 60);

        let hero = f.roster.get(f.hero).unwrap();
        assert_eq!(hero.resource_points(), 6);
        assert_eq!(
            hero.pending_action().map(|r| r.status()),
            Some(RequestStatus::Executed)
        );
    }

    #[test]
    fn fails_for_insufficient_sp_without_side_effects() {
        let mut f = create_test_fixture();
        let foe = f.foes[0];
        f.submit(create_test_skill(1, 11, TargetType::Foe), TargetDescriptor::Actor { actor: foe });

        let execution = f.execute();
        assert_eq!(
            execution.outcome,
            Outcome::Failed(BattleError::InsufficientResource {
                required: 11,
                available: 10
            })
        );
        assert_eq!(execution.outcome.next_state(), ParticipantState::Idle);
        assert_eq!(f.hp(foe), 100);
        assert_eq!(f.roster.get(f.hero).unwrap().resource_points(), 10);
    }

    #[test]
    fn re_resolves_dead_target() {
        let mut f = create_test_fixture();
        let (first, second) = (f.foes[0], f.foes[1]);
        f.submit(create_test_skill(1, 0, TargetType::Foe), TargetDescriptor::Actor { actor: first });
        f.roster.get_mut(first).unwrap().take_damage(u32::MAX);

        let execution = f.execute();
        assert!(execution.outcome.is_applied());
        assert_eq!(execution.target, Some(TargetDescriptor::Actor { actor: second }));
        assert_eq!(f.hp(second), 60);
    }

    #[test]
    fn fails_for_no_valid_target() {
        let mut f = create_test_fixture();
        let first = f.foes[0];
        f.submit(create_test_skill(1, 2, TargetType::Foe), TargetDescriptor::Actor { actor: first });
        for &foe in &f.foes {
            f.roster.get_mut(foe).unwrap().take_damage(u32::MAX);
        }

        let execution = f.execute();
        assert_eq!(execution.outcome, Outcome::Failed(BattleError::NoValidTarget));
        assert_eq!(f.roster.get(f.hero).unwrap().resource_points(), 10);
    }

    #[test]
    fn item_is_consumed_on_success() {
        let mut f = create_test_fixture();
        let hero = f.hero;
        f.roster.get_mut(hero).unwrap().take_damage(50);
        f.submit(create_test_item(2, ItemId(1)), TargetDescriptor::Actor { actor: hero });
        assert_eq!(f.store.item_available_count(ItemId(1)), 0);

        assert!(f.execute().outcome.is_applied());
        assert_eq!(f.hp(hero), 75);
        assert_eq!(f.store.item_true_count(ItemId(1)), 0);
    }

    #[test]
    fn missing_routine_releases_item_reservation() {
        let mut f = create_test_fixture();
        let hero = f.hero;
        let mut potion = create_test_item(2, ItemId(1));
        potion.effect = "unknown".into();
        f.submit(potion, TargetDescriptor::Actor { actor: hero });

        let execution = f.execute();
        assert!(matches!(
            execution.outcome,
            Outcome::Failed(BattleError::ReferenceInvalid(Reference::Effect(_)))
        ));
        assert_eq!(f.store.item_available_count(ItemId(1)), 1);
        assert_eq!(f.store.item_true_count(ItemId(1)), 1);
    }

    #[test]
    fn routine_error_before_mutation_fails() {
        let mut f = create_test_fixture();
        let mut skill = create_test_skill(1, 3, TargetType::Foe);
        skill.effect = "broken".into();
        let foe = f.foes[0];
        f.submit(skill, TargetDescriptor::Actor { actor: foe });

        let execution = f.execute();
        assert!(matches!(execution.outcome, Outcome::Failed(BattleError::ExternalEffect(_))));
        assert_eq!(f.roster.get(f.hero).unwrap().resource_points(), 10);
    }

    #[test]
    fn routine_error_after_mutation_still_executes() {
        let mut f = create_test_fixture();
        let foe = f.foes[0];
        let mut skill = create_test_skill(1, 3, TargetType::Foe);
        skill.effect = "half-broken".into();
        f.submit(skill, TargetDescriptor::Actor { actor: foe });

        assert!(f.execute().outcome.is_applied());
        assert_eq!(f.hp(foe), 95);
        assert_eq!(f.roster.get(f.hero).unwrap().resource_points(), 7);
    }

    #[test]
    fn requires_acting_source() {
        let mut f = create_test_fixture();
        let execution = f.execute();
        assert!(matches!(
            execution.outcome,
            Outcome::Failed(BattleError::InvalidTransition { .. })
        ));
    }
}
