//! Real-time-with-pause combat core.
//!
//! `battle-core` holds the rules of an encounter and nothing else: no I/O, no
//! rendering, no clock. A driver feeds frame deltas and player input into
//! [`engine::BattleOrchestrator::update`] and reads back events and views.
//!
//! Effect routines, status scripts, hostile decisions and the party's item
//! store are supplied from outside through the traits re-exported here.
pub mod action;
pub mod command;
pub mod config;
pub mod engine;
pub mod error;
pub mod participant;
pub mod status;
pub mod store;
pub mod target;
pub mod timer;

pub use action::{
    Ability, AbilityCatalog, AbilityId, AbilityKind, AbilityRef, ActionExecutor, ActionRequest,
    EffectContext, EffectKey, EffectRegistry, EffectRoutine, Execution, ExecutionContext, Outcome,
    RequestStatus, SkillCategory,
};
pub use command::{
    AbilityOption, CommandCategory, CommandContext, CommandOutcome, CommandPhase, CommandSession,
    InputState,
};
pub use config::{BattleConfig, BattleSpeed};
pub use engine::{
    BattleEvent, BattleOrchestrator, BattlePhase, BattleView, CommandView, HostileAi,
    OptionView, ParticipantView, TurnQueue, TurnScheduler,
};
pub use error::{BattleError, BattleFault, EffectError, ErrorSeverity, FailureKind};
pub use participant::{
    AttackPoint, BaseStats, Participant, ParticipantId, ParticipantKind, ParticipantState,
    ParticipantTemplate, ResourceMeter, Roster, Side,
};
pub use status::{
    Intensity, NoScripts, StatKind, StatusChange, StatusEffectKind, StatusEffectTable,
    StatusScripts,
};
pub use store::{Inventory, ItemId, Loot, PartyStore};
pub use target::{Direction, TargetDescriptor, TargetResolver, TargetScope, TargetType};
pub use timer::{Timer, TimerState};
