//! Encounter orchestration.
//!
//! [`BattleOrchestrator`] is the top-level state machine of an encounter. It
//! owns the roster, both queues and every command session, and drives one
//! cooperative tick per [`BattleOrchestrator::update`] call:
//!
//! 1. player input for the active command session
//! 2. participant timers and status effects
//! 3. death reaping and the victory/defeat check
//! 4. the ready queue: promote the head, execute it
//!
//! Everything happens sequentially inside the tick, so no locking is needed.

mod ai;
mod events;
mod orchestrator;
mod queue;
mod scheduler;
mod view;

pub use ai::{AiContext, AiNode, HostileAi, Selector, Status, UseSkill};
pub use events::BattleEvent;
pub use orchestrator::BattleOrchestrator;
pub use queue::TurnQueue;
pub use scheduler::{SchedulerStep, TurnScheduler};
pub use view::{BattleView, CommandView, OptionView, ParticipantView};

/// Top-level encounter phase.
///
/// ```text
/// Initial → Normal ⇄ Command
///             ⇅
///           Event
/// Normal | Command → Victory | Defeat   (terminal)
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BattlePhase {
    /// Entrance sequence; nothing else runs.
    #[default]
    Initial,
    Normal,
    /// At least one player participant is choosing a command.
    Command,
    /// Scripted interlude; participants and the scheduler stand still.
    Event,
    Victory,
    Defeat,
}

impl BattlePhase {
    pub const fn is_terminal(self) -> bool {
        matches!(self, BattlePhase::Victory | BattlePhase::Defeat)
    }

    /// Phases in which participants and the scheduler advance.
    pub const fn is_running(self) -> bool {
        matches!(self, BattlePhase::Normal | BattlePhase::Command)
    }
}
