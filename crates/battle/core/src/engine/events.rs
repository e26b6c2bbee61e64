//! Battle event log, the feed for rendering and audio collaborators.

use crate::action::AbilityId;
use crate::command::CommandPhase;
use crate::error::FailureKind;
use crate::participant::{ParticipantId, ParticipantState};
use crate::status::StatusChange;
use crate::store::Loot;
use crate::target::TargetDescriptor;

use super::BattlePhase;

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BattleEvent {
    PhaseChanged {
        from: BattlePhase,
        to: BattlePhase,
    },
    StateChanged {
        participant: ParticipantId,
        from: ParticipantState,
        to: ParticipantState,
    },
    /// A command session became active for its owner.
    CommandOpened {
        participant: ParticipantId,
        phase: CommandPhase,
    },
    /// The owner cancelled out of the category menu.
    CommandWithdrawn {
        participant: ParticipantId,
    },
    ActionSubmitted {
        participant: ParticipantId,
        ability: AbilityId,
        target: TargetDescriptor,
    },
    ActionExecuted {
        participant: ParticipantId,
        ability: AbilityId,
        target: TargetDescriptor,
    },
    ActionFailed {
        participant: ParticipantId,
        ability: Option<AbilityId>,
        reason: FailureKind,
    },
    StatusChanged {
        participant: ParticipantId,
        change: StatusChange,
    },
    ParticipantDied {
        participant: ParticipantId,
    },
    LootGranted {
        loot: Loot,
    },
}

impl BattleEvent {
    /// Participant the event is about, if any.
    pub fn participant(&self) -> Option<ParticipantId> {
        use BattleEvent::*;
        match self {
            StateChanged { participant, .. }
            | CommandOpened { participant, .. }
            | CommandWithdrawn { participant }
            | ActionSubmitted { participant, .. }
            | ActionExecuted { participant, .. }
            | ActionFailed { participant, .. }
            | StatusChanged { participant, .. }
            | ParticipantDied { participant } => Some(*participant),
            PhaseChanged { .. } | LootGranted { .. } => None,
        }
    }
}
