//! Effect routine boundary.
//!
//! An effect routine is the opaque, externally supplied behavior of an
//! ability (damage formulas, healing, buffs). The core only knows its
//! contract: it receives the source and target through an [`EffectContext`]
//! and may mutate HP, SP and status of anything reachable from them.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::error::EffectError;
use crate::participant::{Participant, ParticipantId, Roster};
use crate::status::{StatusChange, StatusEffectKind, StatusScripts};
use crate::target::TargetDescriptor;

use super::{Ability, EffectKey};

// ============================================================================
// Effect Routine
// ============================================================================

pub trait EffectRoutine: Send + Sync {
    /// Runs the effect. Errors are caught by the executor; whether the action
    /// still counts as executed depends on [`EffectContext::is_mutated`].
    fn apply(&self, ctx: &mut EffectContext<'_>) -> Result<(), EffectError>;
}

impl<F> EffectRoutine for F
where
    F: Fn(&mut EffectContext<'_>) -> Result<(), EffectError> + Send + Sync,
{
    fn apply(&self, ctx: &mut EffectContext<'_>) -> Result<(), EffectError> {
        self(ctx)
    }
}

/// Maps effect keys to routines.
#[derive(Clone, Default)]
pub struct EffectRegistry {
    routines: HashMap<EffectKey, Arc<dyn EffectRoutine>>,
}

impl EffectRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, key: impl Into<EffectKey>, routine: impl EffectRoutine + 'static) {
        self.routines.insert(key.into(), Arc::new(routine));
    }

    pub fn with(mut self, key: impl Into<EffectKey>, routine: impl EffectRoutine + 'static) -> Self {
        self.register(key, routine);
        self
    }

    pub fn get(&self, key: &EffectKey) -> Option<Arc<dyn EffectRoutine>> {
        self.routines.get(key).cloned()
    }

    pub fn contains(&self, key: &EffectKey) -> bool {
        self.routines.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &EffectKey> {
        self.routines.keys()
    }
}

impl fmt::Debug for EffectRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<_> = self.routines.keys().map(EffectKey::as_str).collect();
        keys.sort_unstable();
        f.debug_struct("EffectRegistry").field("routines", &keys).finish()
    }
}

// ============================================================================
// Effect Context
// ============================================================================

/// Everything an effect routine may touch, plus bookkeeping of what it did.
///
/// Every mutating accessor flags the context as mutated, so a routine that
/// fails halfway can be told apart from one that failed before doing anything.
pub struct EffectContext<'a> {
    roster: &'a mut Roster,
    source: ParticipantId,
    target: TargetDescriptor,
    ability: &'a Ability,
    scripts: &'a dyn StatusScripts,
    default_duration_ms: u32,

    mutated: bool,
    status_changes: Vec<(ParticipantId, StatusChange)>,
}

impl<'a> EffectContext<'a> {
    pub fn new(
        roster: &'a mut Roster,
        source: ParticipantId,
        target: TargetDescriptor,
        ability: &'a Ability,
        scripts: &'a dyn StatusScripts,
        default_duration_ms: u32,
    ) -> Self {
        Self {
            roster,
            source,
            target,
            ability,
            scripts,
            default_duration_ms,
            mutated: false,
            status_changes: Vec::new(),
        }
    }

    pub fn source_id(&self) -> ParticipantId {
        self.source
    }

    pub fn target(&self) -> &TargetDescriptor {
        &self.target
    }

    pub fn ability(&self) -> &Ability {
        self.ability
    }

    pub fn participant(&self, id: ParticipantId) -> Option<&Participant> {
        self.roster.get(id)
    }

    pub fn source(&self) -> Option<&Participant> {
        self.roster.get(self.source)
    }

    /// Direct mutable access. Counts as a mutation.
    pub fn participant_mut(&mut self, id: ParticipantId) -> Option<&mut Participant> {
        let participant = self.roster.get_mut(id)?;
        self.mutated = true;
        Some(participant)
    }

    /// Living participants covered by the target descriptor.
    pub fn target_ids(&self) -> Vec<ParticipantId> {
        match self.target {
            TargetDescriptor::AttackPoint { actor, .. } | TargetDescriptor::Actor { actor } => {
                if self.roster.is_alive(actor) {
                    vec![actor]
                } else {
                    Vec::new()
                }
            }
            TargetDescriptor::Party { side } => self.roster.living(side).map(Participant::id).collect(),
        }
    }

    /// Attack point index of a point target, 0 otherwise.
    pub fn target_point(&self) -> usize {
        match self.target {
            TargetDescriptor::AttackPoint { point, .. } => point,
            _ => 0,
        }
    }

    /// Lowers HP, returning the damage actually dealt.
    pub fn damage(&mut self, id: ParticipantId, amount: u32) -> u32 {
        self.participant_mut(id).map_or(0, |p| p.take_damage(amount))
    }

    /// Raises HP, returning the amount actually healed.
    pub fn heal(&mut self, id: ParticipantId, amount: u32) -> u32 {
        self.participant_mut(id).map_or(0, |p| p.heal(amount))
    }

    pub fn restore_sp(&mut self, id: ParticipantId, amount: u32) -> u32 {
        self.participant_mut(id).map_or(0, |p| p.sp.restore(amount))
    }

    /// Changes a status effect using the configured default duration.
    pub fn change_status(&mut self, id: ParticipantId, kind: StatusEffectKind, delta: i8) -> StatusChange {
        self.change_status_for(id, kind, delta, self.default_duration_ms)
    }

    pub fn change_status_for(
        &mut self,
        id: ParticipantId,
        kind: StatusEffectKind,
        delta: i8,
        duration_ms: u32,
    ) -> StatusChange {
        let scripts = self.scripts;
        let Some(participant) = self.participant_mut(id) else {
            return StatusChange::Unchanged;
        };
        let change = participant.change_status(kind, delta, duration_ms, scripts);
        if change != StatusChange::Unchanged {
            self.status_changes.push((id, change));
        }
        change
    }

    pub fn is_mutated(&self) -> bool {
        self.mutated
    }

    pub(crate) fn into_status_changes(self) -> Vec<(ParticipantId, StatusChange)> {
        self.status_changes
    }
}
