//! Status effect system for participants.
//!
//! Status effects are timed modifiers with an intensity on a symmetric
//! ladder. Each kind has a fixed polarity: buffs live on the positive half
//! of the ladder, debuffs on the negative half. An entry exists only while its
//! intensity is not neutral.
//!
//! Effects never mutate base stats. Stat-affecting kinds are folded into the
//! participant's effective stats on demand (see
//! [`Participant::effective`](crate::participant::Participant::effective)).

mod scripts;
mod table;

pub use scripts::{NoScripts, StatusScripts};
pub use table::{StatusChange, StatusEffectTable, StatusEntry};

/// Combat stat a status kind modifies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StatKind {
    Attack,
    Defense,
    Evasion,
    Agility,
}

/// Which half of the intensity ladder a kind lives on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Polarity {
    Positive,
    Negative,
}

impl Polarity {
    #[inline]
    pub const fn sign(self) -> i8 {
        match self {
            Polarity::Positive => 1,
            Polarity::Negative => -1,
        }
    }
}

/// Types of status effects.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumCount,
    strum::EnumIter,
    strum::EnumString,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StatusEffectKind {
    // ========================================================================
    // Stat modifiers
    // ========================================================================
    Empower,
    Enfeeble,
    Fortify,
    Expose,
    Blur,
    Blind,
    Haste,
    Slow,

    // ========================================================================
    // Scripted over time (behaviour lives in external status scripts)
    // ========================================================================
    Regen,
    Poison,

    // ========================================================================
    // Crowd control
    // ========================================================================
    /// Holds the owner's state timer for as long as it is present.
    Stun,
}

impl StatusEffectKind {
    pub const fn polarity(self) -> Polarity {
        use StatusEffectKind::*;
        match self {
            Empower | Fortify | Blur | Haste | Regen => Polarity::Positive,
            Enfeeble | Expose | Blind | Slow | Poison | Stun => Polarity::Negative,
        }
    }

    /// Stat this kind modifies, if any.
    pub const fn modifies(self) -> Option<StatKind> {
        use StatusEffectKind::*;
        match self {
            Empower | Enfeeble => Some(StatKind::Attack),
            Fortify | Expose => Some(StatKind::Defense),
            Blur | Blind => Some(StatKind::Evasion),
            Haste | Slow => Some(StatKind::Agility),
            Regen | Poison | Stun => None,
        }
    }

    #[inline]
    pub const fn is_stun(self) -> bool {
        matches!(self, StatusEffectKind::Stun)
    }
}

/// Symmetric intensity ladder.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(i8)]
pub enum Intensity {
    NegExtreme = -4,
    NegGreater = -3,
    NegModerate = -2,
    NegLesser = -1,
    #[default]
    Neutral = 0,
    PosLesser = 1,
    PosModerate = 2,
    PosGreater = 3,
    PosExtreme = 4,
}

impl Intensity {
    pub const MAX_MAGNITUDE: u8 = 4;

    /// Builds an intensity from a signed level, clamping to the ladder.
    pub const fn from_level(level: i8) -> Self {
        match level {
            i8::MIN..=-4 => Intensity::NegExtreme,
            -3 => Intensity::NegGreater,
            -2 => Intensity::NegModerate,
            -1 => Intensity::NegLesser,
            0 => Intensity::Neutral,
            1 => Intensity::PosLesser,
            2 => Intensity::PosModerate,
            3 => Intensity::PosGreater,
            4..=i8::MAX => Intensity::PosExtreme,
        }
    }

    #[inline]
    pub const fn level(self) -> i8 {
        self as i8
    }

    #[inline]
    pub const fn magnitude(self) -> u8 {
        (self as i8).unsigned_abs()
    }

    #[inline]
    pub const fn is_neutral(self) -> bool {
        matches!(self, Intensity::Neutral)
    }

    /// Stat multiplier in percent for a combined modifier level.
    pub const fn modifier_percent(self) -> u32 {
        match self {
            Intensity::NegExtreme => 40,
            Intensity::NegGreater => 55,
            Intensity::NegModerate => 70,
            Intensity::NegLesser => 85,
            Intensity::Neutral => 100,
            Intensity::PosLesser => 115,
            Intensity::PosModerate => 130,
            Intensity::PosGreater => 150,
            Intensity::PosExtreme => 175,
        }
    }
}
