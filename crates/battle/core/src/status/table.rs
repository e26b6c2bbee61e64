use arrayvec::ArrayVec;

use crate::config::BattleConfig;
use crate::timer::Timer;

use super::{Intensity, StatKind, StatusEffectKind};

/// A single active effect.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatusEntry {
    pub kind: StatusEffectKind,
    pub intensity: Intensity,
    pub timer: Timer,
}

/// Result of changing or decaying an entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StatusChange {
    /// A new entry was created.
    Applied {
        kind: StatusEffectKind,
        intensity: Intensity,
    },
    Strengthened {
        kind: StatusEffectKind,
        intensity: Intensity,
    },
    Weakened {
        kind: StatusEffectKind,
        intensity: Intensity,
    },
    /// The entry reached neutral and left the table.
    Removed { kind: StatusEffectKind },
    Unchanged,
}

impl StatusChange {
    /// Whether the "on-apply" script should run for this change.
    pub fn is_apply(&self) -> bool {
        matches!(
            self,
            StatusChange::Applied { .. } | StatusChange::Strengthened { .. }
        )
    }
}

/// Active status effects on a participant, at most one entry per kind.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StatusEffectTable {
    entries: ArrayVec<StatusEntry, { BattleConfig::MAX_STATUS_EFFECTS }>,
}

impl StatusEffectTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Strengthens (`delta > 0`) or weakens (`delta < 0`) an effect.
    ///
    /// The stored intensity always carries the kind's polarity; `delta` only
    /// moves its magnitude. `duration_ms` is the timer length for a created
    /// or strengthened entry; weakened entries restart with their previous
    /// duration.
    pub fn change_intensity(
        &mut self,
        kind: StatusEffectKind,
        delta: i8,
        duration_ms: u32,
    ) -> StatusChange {
        if delta == 0 {
            return StatusChange::Unchanged;
        }

        let sign = kind.polarity().sign();
        let step = delta.unsigned_abs();
        let index = self.entries.iter().position(|e| e.kind == kind);

        match (index, delta > 0) {
            // Removing something that is not there is not an error.
            (None, false) => StatusChange::Unchanged,

            (None, true) => {
                let magnitude = step.min(Intensity::MAX_MAGNITUDE) as i8;
                let intensity = Intensity::from_level(sign * magnitude);
                let mut timer = Timer::new(duration_ms);
                timer.run();
                // One slot per kind, so the table cannot be full here.
                self.entries.push(StatusEntry {
                    kind,
                    intensity,
                    timer,
                });
                StatusChange::Applied { kind, intensity }
            }

            (Some(i), false) => {
                let magnitude = self.entries[i].intensity.magnitude().saturating_sub(step);
                if magnitude == 0 {
                    self.entries.remove(i);
                    return StatusChange::Removed { kind };
                }
                let entry = &mut self.entries[i];
                entry.intensity = Intensity::from_level(sign * magnitude as i8);
                entry.timer.restart();
                StatusChange::Weakened {
                    kind,
                    intensity: entry.intensity,
                }
            }

            (Some(i), true) => {
                let entry = &mut self.entries[i];
                let magnitude = entry
                    .intensity
                    .magnitude()
                    .saturating_add(step)
                    .min(Intensity::MAX_MAGNITUDE);
                entry.intensity = Intensity::from_level(sign * magnitude as i8);
                entry.timer.initialize(duration_ms);
                entry.timer.run();
                StatusChange::Strengthened {
                    kind,
                    intensity: entry.intensity,
                }
            }
        }
    }

    /// Advances every entry timer. An expired entry decays one step toward
    /// neutral and is removed when it gets there.
    pub fn update(&mut self, dt_ms: u32) -> Vec<StatusChange> {
        let mut changes = Vec::new();
        for entry in self.entries.iter_mut() {
            if !entry.timer.update(dt_ms) {
                continue;
            }
            let magnitude = entry.intensity.magnitude() - 1;
            entry.intensity = Intensity::from_level(entry.kind.polarity().sign() * magnitude as i8);
            if entry.intensity.is_neutral() {
                changes.push(StatusChange::Removed { kind: entry.kind });
            } else {
                entry.timer.restart();
                changes.push(StatusChange::Weakened {
                    kind: entry.kind,
                    intensity: entry.intensity,
                });
            }
        }
        self.entries.retain(|e| !e.intensity.is_neutral());
        changes
    }

    /// Current intensity of `kind`, neutral when absent.
    pub fn intensity(&self, kind: StatusEffectKind) -> Intensity {
        self.get(kind).map_or(Intensity::Neutral, |e| e.intensity)
    }

    pub fn get(&self, kind: StatusEffectKind) -> Option<&StatusEntry> {
        self.entries.iter().find(|e| e.kind == kind)
    }

    pub fn contains(&self, kind: StatusEffectKind) -> bool {
        self.get(kind).is_some()
    }

    pub fn is_stunned(&self) -> bool {
        self.entries.iter().any(|e| e.kind.is_stun())
    }

    /// Combined modifier level for a stat, clamped to the ladder.
    pub fn stat_modifier(&self, stat: StatKind) -> Intensity {
        let level: i8 = self
            .entries
            .iter()
            .filter(|e| e.kind.modifies() == Some(stat))
            .map(|e| e.intensity.level())
            .sum();
        Intensity::from_level(level)
    }

    /// Removes every entry, returning the kinds that were present.
    pub fn clear(&mut self) -> Vec<StatusEffectKind> {
        self.entries.drain(..).map(|e| e.kind).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &StatusEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
