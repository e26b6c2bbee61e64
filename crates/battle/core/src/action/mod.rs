//! Action domain.
//!
//! - [`Ability`]: data-driven description of a skill or item use
//! - [`ActionRequest`]: a participant's commitment to one ability and target
//! - [`EffectRoutine`]: the opaque, externally supplied effect of an ability
//! - [`ActionExecutor`]: validates a request and runs its routine
//!
//! Requests hold participant handles and an `Arc` of their ability, so they
//! are cheap to clone and never dangle.

pub(crate) mod ability;
mod effect;
mod executor;
mod request;

pub use ability::{Ability, AbilityCatalog, AbilityId, AbilityKind, AbilityRef, EffectKey, SkillCategory};
pub use effect::{EffectContext, EffectRegistry, EffectRoutine};
pub use executor::{ActionExecutor, Execution, ExecutionContext, Outcome};
pub use request::{ActionRequest, RequestStatus};
