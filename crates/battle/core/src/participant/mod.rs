//! Participant state types.
//!
//! This module contains everything specific to a single combatant:
//! - [`Participant`]: vitals, stats, attack points, state machine, effects
//! - [`ParticipantKind`]: player-controlled vs hostile, with kind-specific data
//! - [`Roster`]: the arena that owns every participant of an encounter
//!
//! Participants are addressed by [`ParticipantId`] handles. Handles stay valid
//! for the whole encounter: dead participants remain in the arena, so action
//! requests and target descriptors never dangle; they are re-validated lazily.

mod roster;
mod state;

pub use roster::Roster;
pub use state::{ParticipantState, ParticipantTick, StateSignal};

use core::fmt;

use arrayvec::ArrayVec;

use crate::action::{AbilityId, ActionRequest};
use crate::config::BattleConfig;
use crate::error::BattleError;
use crate::status::{StatKind, StatusChange, StatusEffectKind, StatusEffectTable, StatusScripts};
use crate::store::Loot;
use crate::timer::Timer;

/// Stable handle of a participant within one encounter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParticipantId(pub u32);

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Which roster a participant belongs to.
///
/// `Hostile` is the encounter's side A, `Party` its side B.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Side {
    Hostile,
    Party,
}

impl Side {
    #[inline]
    pub const fn opposite(self) -> Side {
        match self {
            Side::Hostile => Side::Party,
            Side::Party => Side::Hostile,
        }
    }
}

/// Current/maximum pair for HP and SP.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResourceMeter {
    pub current: u32,
    pub maximum: u32,
}

impl ResourceMeter {
    pub const fn new(current: u32, maximum: u32) -> Self {
        Self { current, maximum }
    }

    pub const fn full(maximum: u32) -> Self {
        Self::new(maximum, maximum)
    }

    /// Lowers the current value, returning the amount actually removed.
    pub fn drain(&mut self, amount: u32) -> u32 {
        let removed = amount.min(self.current);
        self.current -= removed;
        removed
    }

    /// Raises the current value up to the maximum, returning the amount added.
    pub fn restore(&mut self, amount: u32) -> u32 {
        let added = amount.min(self.maximum.saturating_sub(self.current));
        self.current += added;
        added
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.current == 0
    }
}

/// Base combat stats. Never modified by status effects.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BaseStats {
    pub attack: u32,
    pub defense: u32,
    pub evasion: u32,
    pub agility: u32,
}

impl BaseStats {
    pub fn get(&self, stat: StatKind) -> u32 {
        match stat {
            StatKind::Attack => self.attack,
            StatKind::Defense => self.defense,
            StatKind::Evasion => self.evasion,
            StatKind::Agility => self.agility,
        }
    }
}

/// A targetable location on a participant's body.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttackPoint {
    pub name: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub defense_modifier: i32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub evasion_modifier: i32,
}

impl AttackPoint {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            defense_modifier: 0,
            evasion_modifier: 0,
        }
    }
}

/// Player-controlled vs hostile, with the data only that kind carries.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ParticipantKind {
    Player {
        skills: Vec<AbilityId>,
    },
    Hostile {
        skills: Vec<AbilityId>,
        #[cfg_attr(feature = "serde", serde(default))]
        loot: Loot,
    },
}

impl ParticipantKind {
    pub fn side(&self) -> Side {
        match self {
            ParticipantKind::Player { .. } => Side::Party,
            ParticipantKind::Hostile { .. } => Side::Hostile,
        }
    }

    pub fn skills(&self) -> &[AbilityId] {
        match self {
            ParticipantKind::Player { skills } | ParticipantKind::Hostile { skills, .. } => skills,
        }
    }
}

/// Everything needed to put a participant into an encounter.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParticipantTemplate {
    pub name: String,
    pub kind: ParticipantKind,
    pub hp: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub sp: u32,
    pub stats: BaseStats,
    #[cfg_attr(feature = "serde", serde(default))]
    pub attack_points: Vec<AttackPoint>,
}

/// One combatant in an encounter.
///
/// # Invariants
///
/// - `state` only changes through the orchestrator, which owns the queue
///   side effects of each transition.
/// - Base stats are never modified; effects are folded in by
///   [`Participant::effective`].
#[derive(Clone, Debug)]
pub struct Participant {
    id: ParticipantId,
    pub name: String,
    kind: ParticipantKind,

    pub hp: ResourceMeter,
    pub sp: ResourceMeter,
    stats: BaseStats,
    attack_points: ArrayVec<AttackPoint, { BattleConfig::MAX_ATTACK_POINTS }>,

    state: ParticipantState,
    state_timer: Timer,
    idle_duration_ms: u32,
    /// Set while the timer is paused on behalf of a freeze or stun.
    timer_held: bool,
    frozen: bool,

    pub(crate) pending_action: Option<ActionRequest>,
    effects: StatusEffectTable,
}

impl Participant {
    pub fn new(id: ParticipantId, template: ParticipantTemplate) -> Self {
        let mut attack_points: ArrayVec<AttackPoint, { BattleConfig::MAX_ATTACK_POINTS }> =
            ArrayVec::new();
        for point in template.attack_points {
            if attack_points.try_push(point).is_err() {
                tracing::warn!(
                    participant = %id,
                    name = %template.name,
                    "attack points beyond {} ignored",
                    BattleConfig::MAX_ATTACK_POINTS
                );
                break;
            }
        }
        if attack_points.is_empty() {
            attack_points.push(AttackPoint::new("Body"));
        }

        let hp = ResourceMeter::full(template.hp);
        let state = if hp.is_empty() {
            ParticipantState::Dead
        } else {
            ParticipantState::Idle
        };

        Self {
            id,
            name: template.name,
            kind: template.kind,
            hp,
            sp: ResourceMeter::full(template.sp),
            stats: template.stats,
            attack_points,
            state,
            state_timer: Timer::default(),
            idle_duration_ms: 0,
            timer_held: false,
            frozen: false,
            pending_action: None,
            effects: StatusEffectTable::new(),
        }
    }

    #[inline]
    pub fn id(&self) -> ParticipantId {
        self.id
    }

    pub fn kind(&self) -> &ParticipantKind {
        &self.kind
    }

    #[inline]
    pub fn side(&self) -> Side {
        self.kind.side()
    }

    #[inline]
    pub fn is_hostile(&self) -> bool {
        matches!(self.kind, ParticipantKind::Hostile { .. })
    }

    /// Alive means HP above zero and not yet in the terminal state.
    #[inline]
    pub fn is_alive(&self) -> bool {
        !self.hp.is_empty() && self.state != ParticipantState::Dead
    }

    #[inline]
    pub fn state(&self) -> ParticipantState {
        self.state
    }

    pub fn state_timer(&self) -> &Timer {
        &self.state_timer
    }

    pub fn idle_duration(&self) -> u32 {
        self.idle_duration_ms
    }

    pub fn pending_action(&self) -> Option<&ActionRequest> {
        self.pending_action.as_ref()
    }

    pub fn effects(&self) -> &StatusEffectTable {
        &self.effects
    }

    pub fn base_stats(&self) -> &BaseStats {
        &self.stats
    }

    pub fn attack_points(&self) -> &[AttackPoint] {
        &self.attack_points
    }

    pub fn resource_points(&self) -> u32 {
        self.sp.current
    }

    /// Deducts SP, failing without change when the balance is short.
    pub fn spend(&mut self, cost: u32) -> Result<(), BattleError> {
        if self.sp.current < cost {
            return Err(BattleError::InsufficientResource {
                required: cost,
                available: self.sp.current,
            });
        }
        self.sp.current -= cost;
        Ok(())
    }

    /// Stat with active status modifiers applied.
    pub fn effective(&self, stat: StatKind) -> u32 {
        let base = self.stats.get(stat) as u64;
        let percent = self.effects.stat_modifier(stat).modifier_percent() as u64;
        (base * percent / 100) as u32
    }

    /// Effective defense at one attack point.
    pub fn defense_at(&self, point: usize) -> u32 {
        let modifier = self.attack_points.get(point).map_or(0, |p| p.defense_modifier);
        self.effective(StatKind::Defense).saturating_add_signed(modifier)
    }

    /// Effective evasion at one attack point.
    pub fn evasion_at(&self, point: usize) -> u32 {
        let modifier = self.attack_points.get(point).map_or(0, |p| p.evasion_modifier);
        self.effective(StatKind::Evasion).saturating_add_signed(modifier)
    }

    /// Lowers HP, returning the damage actually dealt. Reaching zero does not
    /// change state by itself; the orchestrator moves the participant to
    /// `Dead` on its next pass.
    pub fn take_damage(&mut self, amount: u32) -> u32 {
        self.hp.drain(amount)
    }

    pub fn heal(&mut self, amount: u32) -> u32 {
        if !self.is_alive() {
            return 0;
        }
        self.hp.restore(amount)
    }

    /// Changes a status effect and runs its scripts.
    ///
    /// A stun takes hold of the state timer immediately.
    pub fn change_status(
        &mut self,
        kind: StatusEffectKind,
        delta: i8,
        duration_ms: u32,
        scripts: &dyn StatusScripts,
    ) -> StatusChange {
        let change = self.effects.change_intensity(kind, delta, duration_ms);
        self.run_status_scripts(change, scripts);
        self.sync_timer_hold();
        change
    }

    /// Removes every effect, running "on-remove" for each.
    pub(crate) fn clear_effects(&mut self, scripts: &dyn StatusScripts) -> Vec<StatusChange> {
        let changes: Vec<StatusChange> = self
            .effects
            .clear()
            .into_iter()
            .map(|kind| StatusChange::Removed { kind })
            .collect();
        for change in &changes {
            self.run_status_scripts(*change, scripts);
        }
        changes
    }

    fn run_status_scripts(&mut self, change: StatusChange, scripts: &dyn StatusScripts) {
        let result = match change {
            StatusChange::Applied { kind, intensity }
            | StatusChange::Strengthened { kind, intensity } => {
                scripts.on_apply(self, kind, intensity)
            }
            StatusChange::Removed { kind } => scripts.on_remove(self, kind),
            StatusChange::Weakened { .. } | StatusChange::Unchanged => Ok(()),
        };
        if let Err(error) = result {
            tracing::warn!(participant = %self.id, ?change, %error, "status script failed");
        }
    }

    pub(crate) fn set_idle_duration(&mut self, duration_ms: u32) {
        self.idle_duration_ms = duration_ms;
    }
}
