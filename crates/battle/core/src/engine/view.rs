//! Read-only per-frame snapshots for rendering collaborators.

use crate::action::AbilityId;
use crate::command::{CommandCategory, CommandPhase};
use crate::participant::{Participant, ParticipantId, ParticipantState, ResourceMeter, Side};
use crate::status::{Intensity, StatusEffectKind};
use crate::target::TargetDescriptor;

use super::BattlePhase;

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParticipantView {
    pub id: ParticipantId,
    pub name: String,
    pub side: Side,
    pub state: ParticipantState,
    /// Progress of the current state window, 0.0..=1.0.
    pub timer_percent: f32,
    pub held: bool,
    pub hp: ResourceMeter,
    pub sp: ResourceMeter,
    pub effects: Vec<(StatusEffectKind, Intensity)>,
}

impl From<&Participant> for ParticipantView {
    fn from(participant: &Participant) -> Self {
        Self {
            id: participant.id(),
            name: participant.name.clone(),
            side: participant.side(),
            state: participant.state(),
            timer_percent: participant.state_timer().percent_complete(),
            held: participant.is_held(),
            hp: participant.hp,
            sp: participant.sp,
            effects: participant
                .effects()
                .iter()
                .map(|entry| (entry.kind, entry.intensity))
                .collect(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OptionView {
    pub ability: AbilityId,
    pub name: String,
    pub enabled: bool,
    pub available: Option<u32>,
}

/// State of the active command session.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CommandView {
    pub owner: ParticipantId,
    pub phase: CommandPhase,
    pub category: CommandCategory,
    pub cursor: usize,
    pub options: Vec<OptionView>,
    pub target: Option<TargetDescriptor>,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BattleView {
    pub phase: BattlePhase,
    pub tick: u64,
    pub elapsed_ms: u64,
    pub frozen: bool,
    pub participants: Vec<ParticipantView>,
    pub command: Option<CommandView>,
    pub command_queue: Vec<ParticipantId>,
    pub ready_queue: Vec<ParticipantId>,
}

impl BattleView {
    pub fn participant(&self, id: ParticipantId) -> Option<&ParticipantView> {
        self.participants.iter().find(|p| p.id == id)
    }

    /// Participants currently acting. Never more than one.
    pub fn acting(&self) -> impl Iterator<Item = &ParticipantView> {
        self.participants
            .iter()
            .filter(|p| p.state == ParticipantState::Acting)
    }
}
