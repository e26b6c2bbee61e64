use std::collections::BTreeMap;

use crate::action::{
    AbilityCatalog, ActionExecutor, ActionRequest, EffectRegistry, Execution, ExecutionContext,
    Outcome,
};
use crate::command::{CommandContext, CommandOutcome, CommandSession, InputState};
use crate::config::BattleConfig;
use crate::error::{BattleError, BattleFault, ErrorSeverity};
use crate::participant::{ParticipantId, ParticipantKind, ParticipantState, Roster, Side, StateSignal};
use crate::status::{NoScripts, StatusScripts};
use crate::store::{Loot, PartyStore};
use crate::timer::Timer;

use super::BattlePhase;
use super::ai::HostileAi;
use super::events::BattleEvent;
use super::queue::TurnQueue;
use super::scheduler::{SchedulerStep, TurnScheduler};
use super::view::{BattleView, CommandView, OptionView, ParticipantView};

/// Top-level encounter state machine.
///
/// # Invariants
///
/// - At most one participant is `Acting`, and it is the ready queue head.
/// - Only player participants in `Command` are in the command queue; its head
///   is the active commander while the phase is `Command`.
/// - Every state change goes through [`Self::change_state`], which keeps the
///   queues and sessions in step with participant states.
pub struct BattleOrchestrator {
    config: BattleConfig,
    phase: BattlePhase,
    roster: Roster,
    catalog: AbilityCatalog,
    effects: EffectRegistry,
    scripts: Box<dyn StatusScripts>,
    store: Box<dyn PartyStore>,
    ai: HostileAi,

    command_queue: TurnQueue,
    scheduler: TurnScheduler,
    sessions: BTreeMap<ParticipantId, CommandSession>,
    active_commander: Option<ParticipantId>,

    entrance: Timer,
    frozen: bool,
    loot_granted: bool,
    events: Vec<BattleEvent>,
    tick: u64,
    elapsed_ms: u64,
}

impl BattleOrchestrator {
    /// Assembles an encounter. Idle windows are computed here, once every
    /// participant is known.
    pub fn new(
        config: BattleConfig,
        mut roster: Roster,
        catalog: AbilityCatalog,
        effects: EffectRegistry,
        store: impl PartyStore + 'static,
    ) -> Self {
        roster.assign_idle_durations(&config);
        for participant in roster.iter_mut() {
            participant.start();
        }

        let mut entrance = Timer::new(config.entrance_duration_ms);
        entrance.run();

        tracing::info!(
            hostiles = roster.living_count(Side::Hostile),
            party = roster.living_count(Side::Party),
            speed = %config.speed,
            "encounter assembled"
        );

        Self {
            config,
            phase: BattlePhase::Initial,
            roster,
            catalog,
            effects,
            scripts: Box::new(NoScripts),
            store: Box::new(store),
            ai: HostileAi::default(),
            command_queue: TurnQueue::new(),
            scheduler: TurnScheduler::new(),
            sessions: BTreeMap::new(),
            active_commander: None,
            entrance,
            frozen: false,
            loot_granted: false,
            events: Vec::new(),
            tick: 0,
            elapsed_ms: 0,
        }
    }

    pub fn with_scripts(mut self, scripts: impl StatusScripts + 'static) -> Self {
        self.scripts = Box::new(scripts);
        self
    }

    pub fn with_ai(mut self, ai: HostileAi) -> Self {
        self.ai = ai;
        self
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn phase(&self) -> BattlePhase {
        self.phase
    }

    pub fn is_finished(&self) -> bool {
        self.phase.is_terminal()
    }

    pub fn config(&self) -> &BattleConfig {
        &self.config
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn catalog(&self) -> &AbilityCatalog {
        &self.catalog
    }

    pub fn store(&self) -> &dyn PartyStore {
        self.store.as_ref()
    }

    pub fn session(&self, id: ParticipantId) -> Option<&CommandSession> {
        self.sessions.get(&id)
    }

    /// Owner of the session currently receiving input.
    pub fn active_commander(&self) -> Option<ParticipantId> {
        self.active_commander
    }

    pub fn command_queue(&self) -> &TurnQueue {
        &self.command_queue
    }

    pub fn ready_queue(&self) -> &TurnQueue {
        self.scheduler.queue()
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Battle time that actually ran, excluding frozen and event time.
    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ms
    }

    /// Takes every event recorded since the last call.
    pub fn drain_events(&mut self) -> Vec<BattleEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn view(&self) -> BattleView {
        BattleView {
            phase: self.phase,
            tick: self.tick,
            elapsed_ms: self.elapsed_ms,
            frozen: self.frozen,
            participants: self.roster.iter().map(ParticipantView::from).collect(),
            command: self.command_view(),
            command_queue: self.command_queue.iter().collect(),
            ready_queue: self.scheduler.queue().iter().collect(),
        }
    }

    fn command_view(&self) -> Option<CommandView> {
        let owner = self.active_commander?;
        let session = self.sessions.get(&owner)?;
        let options = session
            .options(&self.roster, &self.catalog, self.store.as_ref())
            .into_iter()
            .map(|option| OptionView {
                ability: option.ability.id,
                name: option.ability.name.clone(),
                enabled: option.enabled,
                available: option.available,
            })
            .collect();
        Some(CommandView {
            owner,
            phase: session.phase(),
            category: session.category(),
            cursor: session.cursor(),
            options,
            target: session.target().copied(),
        })
    }

    // ========================================================================
    // Tick
    // ========================================================================

    /// Advances the encounter by one frame.
    pub fn update(&mut self, dt_ms: u32, input: InputState) {
        if self.phase.is_terminal() {
            return;
        }
        self.tick += 1;

        if self.phase == BattlePhase::Initial {
            if !self.frozen {
                self.entrance.update(dt_ms);
            }
            if self.entrance.is_finished() {
                self.set_phase(BattlePhase::Normal);
            }
            return;
        }
        if !self.phase.is_running() || self.frozen {
            return;
        }
        self.elapsed_ms += dt_ms as u64;

        // Blows landed last tick are settled before anyone's timer moves.
        self.reap_dead();
        if self.check_outcome() {
            return;
        }

        if self.phase == BattlePhase::Command {
            self.process_command_input(input);
        }

        let waiting = self.phase == BattlePhase::Command && self.config.wait_during_command;
        if !waiting {
            self.advance_participants(dt_ms);
        }

        self.reap_dead();
        if self.check_outcome() {
            return;
        }

        if !waiting {
            self.run_scheduler();
        }
    }

    fn advance_participants(&mut self, dt_ms: u32) {
        let ids: Vec<ParticipantId> = self.roster.ids().collect();
        for id in ids {
            let Some(participant) = self.roster.get_mut(id) else {
                continue;
            };
            let tick = participant.update(dt_ms, self.scripts.as_ref());
            for change in tick.status_changes {
                self.events.push(BattleEvent::StatusChanged {
                    participant: id,
                    change,
                });
            }

            match tick.signal {
                Some(StateSignal::IdleElapsed) => self.on_idle_elapsed(id),
                Some(StateSignal::WarmUpElapsed) => {
                    self.change_state(id, ParticipantState::Ready);
                }
                Some(StateSignal::CoolDownElapsed) => {
                    self.change_state(id, ParticipantState::Idle);
                }
                None => {}
            }
        }
    }

    fn on_idle_elapsed(&mut self, id: ParticipantId) {
        let Some(participant) = self.roster.get(id) else {
            return;
        };
        if !participant.is_hostile() {
            self.change_state(id, ParticipantState::Command);
            return;
        }

        match self.ai.decide(&self.roster, &self.catalog, id) {
            Some(request) => self.assign_request(id, request),
            None => {
                tracing::debug!(participant = %id, "nothing usable, idling again");
                if let Some(participant) = self.roster.get_mut(id) {
                    participant.restart_state_timer();
                }
            }
        }
    }

    fn reap_dead(&mut self) {
        let fallen: Vec<ParticipantId> = self
            .roster
            .iter()
            .filter(|p| p.hp.is_empty() && p.state() != ParticipantState::Dead)
            .map(|p| p.id())
            .collect();
        for id in fallen {
            self.change_state(id, ParticipantState::Dead);
        }
    }

    /// Enters `Victory` or `Defeat` once a side is wiped out. A simultaneous
    /// wipe-out is a defeat.
    fn check_outcome(&mut self) -> bool {
        let hostiles = self.roster.living_count(Side::Hostile);
        let party = self.roster.living_count(Side::Party);
        let outcome = match (hostiles, party) {
            (_, 0) => BattlePhase::Defeat,
            (0, _) => BattlePhase::Victory,
            _ => return false,
        };
        self.set_phase(outcome);
        true
    }

    fn run_scheduler(&mut self) {
        let actor = match self.scheduler.advance(&self.roster) {
            SchedulerStep::Empty => return,
            SchedulerStep::Promote(id) => {
                // A stunned head holds the queue until the stun wears off.
                if self.roster.get(id).is_some_and(|p| p.effects().is_stunned()) {
                    return;
                }
                if !self.change_state(id, ParticipantState::Acting) {
                    return;
                }
                id
            }
            SchedulerStep::Acting(id) => id,
        };
        self.execute(actor);
    }

    fn execute(&mut self, actor: ParticipantId) {
        let execution = {
            let mut ctx = ExecutionContext {
                roster: &mut self.roster,
                store: self.store.as_mut(),
                effects: &self.effects,
                scripts: self.scripts.as_ref(),
                config: &self.config,
            };
            ActionExecutor::execute(&mut ctx, actor)
        };
        self.record_execution(&execution);
        self.change_state(actor, execution.outcome.next_state());
    }

    fn record_execution(&mut self, execution: &Execution) {
        for &(participant, change) in &execution.status_changes {
            self.events
                .push(BattleEvent::StatusChanged { participant, change });
        }

        let participant = execution.source;
        match &execution.outcome {
            Outcome::Applied => {
                if let (Some(ability), Some(target)) = (execution.ability, execution.target) {
                    self.events.push(BattleEvent::ActionExecuted {
                        participant,
                        ability,
                        target,
                    });
                }
            }
            Outcome::Failed(error) => {
                log_fault(participant, error, "action failed");
                self.events.push(BattleEvent::ActionFailed {
                    participant,
                    ability: execution.ability,
                    reason: error.kind(),
                });
            }
        }
    }

    // ========================================================================
    // State transitions
    // ========================================================================

    /// Moves a participant to `new_state` and applies the queue side effects.
    ///
    /// Returns `false` (after logging) when the transition is rejected.
    fn change_state(&mut self, id: ParticipantId, new_state: ParticipantState) -> bool {
        let Some(participant) = self.roster.get_mut(id) else {
            log_fault(id, &BattleError::participant(id), "state change ignored");
            return false;
        };
        let from = match participant.enter_state(new_state, &self.config) {
            Ok(from) => from,
            Err(error) => {
                log_fault(id, &error, "state change ignored");
                return false;
            }
        };

        tracing::debug!(participant = %id, %from, to = %new_state, "state changed");
        self.events.push(BattleEvent::StateChanged {
            participant: id,
            from,
            to: new_state,
        });

        if from == ParticipantState::Command {
            self.command_queue.remove(id);
            if self.active_commander == Some(id) {
                self.active_commander = None;
            }
        }
        if matches!(from, ParticipantState::Ready | ParticipantState::Acting)
            && new_state != ParticipantState::Acting
        {
            self.scheduler.remove(id);
        }

        match new_state {
            ParticipantState::Command => {
                self.command_queue.push_unique(id);
            }
            ParticipantState::Ready => self.scheduler.notify_ready(id),
            ParticipantState::Dead => self.on_death(id),
            _ => {}
        }

        if from == ParticipantState::Command
            || matches!(new_state, ParticipantState::Command | ParticipantState::Dead)
        {
            self.sync_command_phase();
        }
        true
    }

    fn on_death(&mut self, id: ParticipantId) {
        if let Some(participant) = self.roster.get_mut(id) {
            if let Some(mut request) = participant.pending_action.take() {
                request.discard(self.store.as_mut());
            }
            for change in participant.clear_effects(self.scripts.as_ref()) {
                self.events.push(BattleEvent::StatusChanged {
                    participant: id,
                    change,
                });
            }
        }
        self.command_queue.remove(id);
        self.scheduler.remove(id);
        if self.active_commander == Some(id) {
            self.active_commander = None;
        }
        for session in self.sessions.values_mut() {
            session.forget(id);
        }
        tracing::debug!(participant = %id, "participant died");
        self.events
            .push(BattleEvent::ParticipantDied { participant: id });
    }

    fn assign_request(&mut self, id: ParticipantId, request: ActionRequest) {
        let submitted = BattleEvent::ActionSubmitted {
            participant: id,
            ability: request.ability().id,
            target: *request.target(),
        };
        let Some(participant) = self.roster.get_mut(id) else {
            return;
        };
        participant.pending_action = Some(request);

        if self.change_state(id, ParticipantState::WarmUp) {
            self.events.push(submitted);
        } else if let Some(participant) = self.roster.get_mut(id) {
            if let Some(mut request) = participant.pending_action.take() {
                request.discard(self.store.as_mut());
            }
        }
    }

    fn set_phase(&mut self, to: BattlePhase) {
        let from = self.phase;
        if from == to {
            return;
        }
        self.phase = to;
        tracing::info!(%from, %to, tick = self.tick, "battle phase changed");
        self.events.push(BattleEvent::PhaseChanged { from, to });

        if from == BattlePhase::Command {
            self.active_commander = None;
        }
        if to.is_terminal() {
            self.finish(to);
        }
    }

    fn finish(&mut self, outcome: BattlePhase) {
        for participant in self.roster.iter_mut() {
            if let Some(mut request) = participant.pending_action.take() {
                request.discard(self.store.as_mut());
            }
        }
        self.command_queue.clear();
        self.scheduler.clear();
        self.active_commander = None;

        if outcome == BattlePhase::Victory && !self.loot_granted {
            let mut loot = Loot::default();
            for hostile in self.roster.side(Side::Hostile) {
                if let ParticipantKind::Hostile { loot: carried, .. } = hostile.kind() {
                    loot.merge(carried);
                }
            }
            self.store.grant_loot(&loot);
            self.loot_granted = true;
            tracing::info!(experience = loot.experience, drops = loot.drops.len(), "loot granted");
            self.events.push(BattleEvent::LootGranted { loot });
        }
    }

    // ========================================================================
    // Command sessions
    // ========================================================================

    /// Keeps the phase and the active session in line with the command queue.
    fn sync_command_phase(&mut self) {
        match (self.phase, self.command_queue.front()) {
            (BattlePhase::Normal, Some(head)) => {
                self.set_phase(BattlePhase::Command);
                self.open_session(head);
            }
            (BattlePhase::Command, Some(head)) if self.active_commander != Some(head) => {
                self.open_session(head);
            }
            (BattlePhase::Command, None) => self.set_phase(BattlePhase::Normal),
            _ => {}
        }
    }

    fn open_session(&mut self, owner: ParticipantId) {
        let session = self
            .sessions
            .entry(owner)
            .or_insert_with(|| CommandSession::new(owner));
        session.begin();
        let phase = session.phase();
        self.active_commander = Some(owner);
        tracing::debug!(%owner, "command session opened");
        self.events.push(BattleEvent::CommandOpened {
            participant: owner,
            phase,
        });
    }

    fn process_command_input(&mut self, input: InputState) {
        let Some(owner) = self.active_commander else {
            return;
        };
        let Some(session) = self.sessions.get_mut(&owner) else {
            return;
        };

        if let Err(error) = session.refresh_target(&self.roster) {
            log_fault(owner, &error, "command target lost");
        }
        if input.is_empty() {
            return;
        }

        let mut ctx = CommandContext {
            roster: &self.roster,
            catalog: &self.catalog,
            store: self.store.as_mut(),
        };
        match session.handle_input(&mut ctx, input) {
            Ok(CommandOutcome::Pending) => {}
            Ok(CommandOutcome::Submitted(request)) => self.submit_command(owner, request),
            Ok(CommandOutcome::Withdrawn) => self.withdraw_command(owner),
            Err(error) => log_fault(owner, &error, "command rejected"),
        }
    }

    fn submit_command(&mut self, owner: ParticipantId, request: ActionRequest) {
        self.active_commander = None;
        self.assign_request(owner, request);
    }

    fn withdraw_command(&mut self, owner: ParticipantId) {
        self.command_queue.remove(owner);
        self.active_commander = None;
        tracing::debug!(%owner, "command withdrawn");
        self.events
            .push(BattleEvent::CommandWithdrawn { participant: owner });
        self.sync_command_phase();
    }

    /// Re-queues a player left in `Command` by a cancel out of the category
    /// menu.
    pub fn open_command(&mut self, id: ParticipantId) -> Result<(), BattleError> {
        let participant = self.roster.get(id).ok_or(BattleError::participant(id))?;
        if participant.state() != ParticipantState::Command || self.phase.is_terminal() {
            return Err(BattleError::InvalidTransition {
                participant: id,
                state: participant.state(),
            });
        }
        if self.command_queue.push_unique(id) {
            self.sync_command_phase();
        }
        Ok(())
    }

    // ========================================================================
    // Freeze and events
    // ========================================================================

    /// Pauses every participant timer and the scheduler without losing
    /// progress.
    pub fn freeze(&mut self) {
        if self.frozen {
            return;
        }
        self.frozen = true;
        for participant in self.roster.iter_mut() {
            participant.freeze();
        }
        tracing::info!(tick = self.tick, "battle frozen");
    }

    pub fn resume(&mut self) {
        if !self.frozen {
            return;
        }
        self.frozen = false;
        for participant in self.roster.iter_mut() {
            participant.thaw();
        }
        tracing::info!(tick = self.tick, "battle resumed");
    }

    /// Enters the `Event` phase for a scripted interlude. Only allowed from
    /// `Normal`.
    pub fn begin_event(&mut self) -> bool {
        if self.phase != BattlePhase::Normal {
            tracing::warn!(phase = %self.phase, "event can only start from Normal");
            return false;
        }
        self.set_phase(BattlePhase::Event);
        true
    }

    pub fn end_event(&mut self) -> bool {
        if self.phase != BattlePhase::Event {
            return false;
        }
        self.set_phase(BattlePhase::Normal);
        self.sync_command_phase();
        true
    }
}

impl std::fmt::Debug for BattleOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BattleOrchestrator")
            .field("phase", &self.phase)
            .field("tick", &self.tick)
            .field("participants", &self.roster.len())
            .field("command_queue", &self.command_queue)
            .field("ready_queue", self.scheduler.queue())
            .finish_non_exhaustive()
    }
}

fn log_fault(participant: ParticipantId, error: &BattleError, message: &str) {
    match error.severity() {
        ErrorSeverity::Recoverable => {
            tracing::debug!(%participant, %error, code = error.error_code(), "{message}");
        }
        ErrorSeverity::Validation | ErrorSeverity::Internal => {
            tracing::warn!(%participant, %error, code = error.error_code(), "{message}");
        }
    }
}
