//! Data-driven encounter content and loaders.
//!
//! This crate reads the static data an encounter is assembled from:
//! - Ability catalogs (RON)
//! - Participant templates (RON)
//! - Party inventory (RON)
//! - Encounter line-ups (RON)
//! - Battle configuration (TOML)
//!
//! Loaders deserialize battle-core types directly through its `serde` feature.

#[cfg(feature = "loaders")]
pub mod loaders;

#[cfg(feature = "loaders")]
pub use loaders::{
    AbilityLoader, ConfigLoader, ContentFactory, EncounterLoader, EncounterDef, InventoryLoader,
    LoadResult, ParticipantLoader,
};
