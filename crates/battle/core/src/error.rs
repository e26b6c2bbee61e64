//! Common error infrastructure for battle-core.
//!
//! Every failure in the combat core degrades to a no-op plus a diagnostic:
//! nothing here is fatal to the process, and the simulation can always keep
//! ticking. Errors are classified so callers can decide whether to reject a
//! selection, log and continue, or investigate.
//!
//! # Taxonomy
//!
//! - [`BattleError::InvalidTransition`]: state already equals the requested one
//! - [`BattleError::ReferenceInvalid`]: missing participant, ability, routine or request
//! - [`BattleError::InsufficientResource`]: cost or item availability not met
//! - [`BattleError::NoValidTarget`]: no living target could be resolved
//! - [`BattleError::ExternalEffect`]: the scripted effect routine reported an error

use core::fmt;

use crate::action::{AbilityId, EffectKey};
use crate::participant::{ParticipantId, ParticipantState, Side};

/// Severity level of an error, used for categorization and recovery strategies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// Temporary condition; the same request may succeed later or with
    /// another choice (e.g. not enough SP yet).
    Recoverable,

    /// Invalid input that should be rejected without retry.
    Validation,

    /// Unexpected inconsistency, worth investigating.
    Internal,
}

impl ErrorSeverity {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
        }
    }

    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }
}

/// Common trait for all battle-core errors.
pub trait BattleFault: fmt::Display + fmt::Debug {
    fn severity(&self) -> ErrorSeverity;

    /// Static identifier for the error variant, for logs and tests.
    fn error_code(&self) -> &'static str;
}

/// What a [`BattleError::ReferenceInvalid`] failed to resolve.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Reference {
    Participant(ParticipantId),
    Ability(AbilityId),
    Effect(EffectKey),
    PendingAction(ParticipantId),
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reference::Participant(id) => write!(f, "participant {id}"),
            Reference::Ability(id) => write!(f, "ability {id}"),
            Reference::Effect(key) => write!(f, "effect routine '{key}'"),
            Reference::PendingAction(id) => write!(f, "pending action of {id}"),
        }
    }
}

/// Error reported by an external effect routine or status script.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct EffectError {
    pub message: String,
}

impl EffectError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Errors surfaced by the combat core.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum BattleError {
    #[error("participant {participant} is already {state}")]
    InvalidTransition {
        participant: ParticipantId,
        state: ParticipantState,
    },

    #[error("invalid reference: {0}")]
    ReferenceInvalid(Reference),

    #[error("insufficient resource: requires {required}, has {available}")]
    InsufficientResource { required: u32, available: u32 },

    #[error("no valid target")]
    NoValidTarget,

    #[error("effect routine failed: {0}")]
    ExternalEffect(EffectError),

    #[error("{side} roster is full")]
    CapacityExceeded { side: Side },
}

impl BattleError {
    pub fn participant(id: ParticipantId) -> Self {
        Self::ReferenceInvalid(Reference::Participant(id))
    }

    /// Coarse classification, stable enough to put in events.
    pub fn kind(&self) -> FailureKind {
        match self {
            BattleError::InvalidTransition { .. } => FailureKind::InvalidTransition,
            BattleError::ReferenceInvalid(_) | BattleError::CapacityExceeded { .. } => {
                FailureKind::ReferenceInvalid
            }
            BattleError::InsufficientResource { .. } => FailureKind::InsufficientResource,
            BattleError::NoValidTarget => FailureKind::NoValidTarget,
            BattleError::ExternalEffect(_) => FailureKind::ExternalEffect,
        }
    }
}

impl BattleFault for BattleError {
    fn severity(&self) -> ErrorSeverity {
        use BattleError::*;
        match self {
            InsufficientResource { .. } | NoValidTarget => ErrorSeverity::Recoverable,
            InvalidTransition { .. } | CapacityExceeded { .. } => ErrorSeverity::Validation,
            ReferenceInvalid(_) | ExternalEffect(_) => ErrorSeverity::Internal,
        }
    }

    fn error_code(&self) -> &'static str {
        use BattleError::*;
        match self {
            InvalidTransition { .. } => "BATTLE_INVALID_TRANSITION",
            ReferenceInvalid(_) => "BATTLE_REFERENCE_INVALID",
            InsufficientResource { .. } => "BATTLE_INSUFFICIENT_RESOURCE",
            NoValidTarget => "BATTLE_NO_VALID_TARGET",
            ExternalEffect(_) => "BATTLE_EXTERNAL_EFFECT",
            CapacityExceeded { .. } => "BATTLE_CAPACITY_EXCEEDED",
        }
    }
}

/// Payload-free mirror of [`BattleError`] used in events and outcomes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FailureKind {
    InvalidTransition,
    ReferenceInvalid,
    InsufficientResource,
    NoValidTarget,
    ExternalEffect,
}
