//! Player command selection.
//!
//! A [`CommandSession`] walks one player participant through
//! `Category → AbilityList → Target` (with `Info` as a side trip from the
//! list) and produces an [`ActionRequest`](crate::action::ActionRequest).
//! Sessions are created lazily by the orchestrator and kept across turns so
//! the last category, per-category cursors and last target are remembered.

mod input;
mod session;

pub use input::InputState;
pub use session::{AbilityOption, CommandContext, CommandOutcome, CommandSession};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CommandPhase {
    #[default]
    Category,
    AbilityList,
    Target,
    /// Read-only details of the highlighted ability.
    Info,
}

/// Top-level command menu entries.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumCount,
    strum::EnumIter,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum CommandCategory {
    #[default]
    Attack,
    Defend,
    Support,
    Item,
}

impl CommandCategory {
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }
}
