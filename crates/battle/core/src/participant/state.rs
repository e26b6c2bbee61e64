//! Participant lifecycle state machine.
//!
//! ```text
//! Idle → Command → WarmUp → Ready → Acting → CoolDown → Idle
//!   └──(hostile: AI stub)──┘
//! any state → Dead (terminal)
//! ```
//!
//! The participant only owns its own timer. Queue bookkeeping for each
//! transition lives in the orchestrator, which is the only caller of
//! [`Participant::enter_state`].

use crate::config::BattleConfig;
use crate::error::{BattleError, Reference};
use crate::status::{StatusChange, StatusScripts};

use super::Participant;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display, strum::IntoStaticStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ParticipantState {
    #[default]
    Idle,
    Command,
    WarmUp,
    Ready,
    Acting,
    CoolDown,
    Dead,
}

/// Timer-driven transition request raised by [`Participant::update`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StateSignal {
    IdleElapsed,
    WarmUpElapsed,
    CoolDownElapsed,
}

/// What happened to a participant during one update.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ParticipantTick {
    pub signal: Option<StateSignal>,
    pub status_changes: Vec<StatusChange>,
}

impl Participant {
    /// Switches state and configures the state timer for it.
    ///
    /// Returns the previous state. Fails without change when the state is
    /// already `new_state`, when the participant is dead, or when `WarmUp` is
    /// requested without a pending action.
    pub(crate) fn enter_state(
        &mut self,
        new_state: ParticipantState,
        config: &BattleConfig,
    ) -> Result<ParticipantState, BattleError> {
        if self.state == new_state || self.state == ParticipantState::Dead {
            return Err(BattleError::InvalidTransition {
                participant: self.id,
                state: self.state,
            });
        }

        let duration = match new_state {
            ParticipantState::Idle => {
                self.pending_action = None;
                Some(self.idle_duration_ms)
            }
            ParticipantState::WarmUp => {
                let request = self
                    .pending_action
                    .as_ref()
                    .ok_or(BattleError::ReferenceInvalid(Reference::PendingAction(self.id)))?;
                Some(config.scaled(request.ability().warmup_ms))
            }
            ParticipantState::CoolDown => Some(config.scaled(
                self.pending_action
                    .as_ref()
                    .map_or(0, |request| request.ability().cooldown_ms),
            )),
            ParticipantState::Command
            | ParticipantState::Ready
            | ParticipantState::Acting
            | ParticipantState::Dead => None,
        };

        match duration {
            Some(duration_ms) => {
                self.state_timer.initialize(duration_ms);
                self.state_timer.run();
            }
            None => self.state_timer.initialize(0),
        }
        self.timer_held = false;

        let previous = core::mem::replace(&mut self.state, new_state);
        self.sync_timer_hold();
        Ok(previous)
    }

    /// Advances effects and the state timer by `dt_ms`.
    ///
    /// While stunned or frozen the state timer is held and no signal is
    /// raised; it resumes by itself once the hold is gone.
    pub(crate) fn update(&mut self, dt_ms: u32, scripts: &dyn StatusScripts) -> ParticipantTick {
        if !self.is_alive() {
            return ParticipantTick::default();
        }

        let status_changes = self.effects.update(dt_ms);
        for change in &status_changes {
            self.run_status_scripts(*change, scripts);
        }

        self.sync_timer_hold();
        if self.timer_held {
            return ParticipantTick {
                signal: None,
                status_changes,
            };
        }

        let signal = if self.state_timer.update(dt_ms) {
            match self.state {
                ParticipantState::Idle => Some(StateSignal::IdleElapsed),
                ParticipantState::WarmUp => Some(StateSignal::WarmUpElapsed),
                ParticipantState::CoolDown => Some(StateSignal::CoolDownElapsed),
                _ => None,
            }
        } else {
            None
        };

        if let Some(signal) = signal {
            tracing::trace!(participant = %self.id, ?signal, "state timer elapsed");
        }

        ParticipantTick {
            signal,
            status_changes,
        }
    }

    /// Arms the first idle window of a freshly assembled participant.
    pub(crate) fn start(&mut self) {
        if self.state == ParticipantState::Idle && self.state_timer.is_initial() {
            self.state_timer.initialize(self.idle_duration_ms);
            self.state_timer.run();
            self.sync_timer_hold();
        }
    }

    /// Starts the current state's timer over (e.g. the AI found nothing to
    /// do and waits another idle window).
    pub(crate) fn restart_state_timer(&mut self) {
        self.state_timer.restart();
        self.timer_held = false;
        self.sync_timer_hold();
    }

    pub(crate) fn freeze(&mut self) {
        self.frozen = true;
        self.sync_timer_hold();
    }

    pub(crate) fn thaw(&mut self) {
        self.frozen = false;
        self.sync_timer_hold();
    }

    /// Whether the state timer is currently held by a freeze or stun.
    pub fn is_held(&self) -> bool {
        self.timer_held
    }

    pub(super) fn sync_timer_hold(&mut self) {
        let hold = self.frozen || self.effects.is_stunned();
        if hold {
            if self.state_timer.is_running() {
                self.state_timer.pause();
                self.timer_held = true;
            }
        } else if self.timer_held {
            self.timer_held = false;
            self.state_timer.run();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::participant::tests::create_test_template;
    use crate::participant::{Participant, ParticipantId};
    use crate::status::{NoScripts, StatusEffectKind};

    fn idle_participant(idle_ms: u32) -> Participant {
        let mut p = Participant::new(ParticipantId(1), create_test_template("P", false, 10));
        p.set_idle_duration(idle_ms);
        p.enter_state(ParticipantState::Command, &BattleConfig::default())
            .unwrap();
        p.enter_state(ParticipantState::Idle, &BattleConfig::default())
            .unwrap();
        p
    }

    #[test]
    fn same_state_is_rejected() {
        let mut p = idle_participant(100);
        let err = p
            .enter_state(ParticipantState::Idle, &BattleConfig::default())
            .unwrap_err();
        assert!(matches!(err, BattleError::InvalidTransition { .. }));
    }

    #[test]
    fn dead_is_terminal() {
        let mut p = idle_participant(100);
        p.enter_state(ParticipantState::Dead, &BattleConfig::default())
            .unwrap();
        assert!(
            p.enter_state(ParticipantState::Idle, &BattleConfig::default())
                .is_err()
        );
        assert_eq!(p.update(1_000, &NoScripts), ParticipantTick::default());
    }

    #[test]
    fn fallen_participant_raises_no_signal() {
        let mut p = idle_participant(100);
        p.update(90, &NoScripts);
        p.take_damage(u32::MAX);
        // Not yet reaped, but the idle window must not fire for a corpse.
        assert_eq!(p.state(), ParticipantState::Idle);
        assert_eq!(p.update(50, &NoScripts), ParticipantTick::default());
        assert_eq!(p.state_timer().elapsed(), 90);
    }

    #[test]
    fn warm_up_requires_pending_action() {
        let mut p = idle_participant(100);
        let err = p
            .enter_state(ParticipantState::WarmUp, &BattleConfig::default())
            .unwrap_err();
        assert_eq!(
            err,
            BattleError::ReferenceInvalid(Reference::PendingAction(ParticipantId(1)))
        );
        assert_eq!(p.state(), ParticipantState::Idle);
    }

    #[test]
    fn idle_elapses_into_signal() {
        let mut p = idle_participant(100);
        assert_eq!(p.update(60, &NoScripts).signal, None);
        assert_eq!(
            p.update(60, &NoScripts).signal,
            Some(StateSignal::IdleElapsed)
        );
    }

    #[test]
    fn stun_holds_timer_until_it_expires() {
        let mut p = idle_participant(100);
        p.update(50, &NoScripts);
        p.change_status(StatusEffectKind::Stun, 1, 200, &NoScripts);
        assert!(p.is_held());

        // Stun runs for 200ms; idle progress stays at 50 meanwhile.
        assert_eq!(p.update(150, &NoScripts).signal, None);
        assert_eq!(p.state_timer().elapsed(), 50);

        // Stun expires during this update; the timer resumes and advances.
        let tick = p.update(50, &NoScripts);
        assert!(!p.is_held());
        assert_eq!(tick.signal, Some(StateSignal::IdleElapsed));
    }

    #[test]
    fn freeze_and_thaw_preserve_progress() {
        let mut p = idle_participant(100);
        p.update(30, &NoScripts);
        p.freeze();
        assert!(p.state_timer().is_paused());
        p.thaw();
        assert!(p.state_timer().is_running());
        assert_eq!(p.state_timer().elapsed(), 30);
    }

    #[test]
    fn thaw_keeps_stun_hold() {
        let mut p = idle_participant(100);
        p.change_status(StatusEffectKind::Stun, 1, 200, &NoScripts);
        p.freeze();
        p.thaw();
        assert!(p.is_held());
        assert!(p.state_timer().is_paused());
    }
}
