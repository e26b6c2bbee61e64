//! Driver configuration read from the environment.
use std::env;
use std::path::PathBuf;

use battle_core::{BattleConfig, BattleSpeed};

/// Settings of one headless run.
///
/// Battle pacing comes from the content's `config.toml`; `speed` and
/// `wait_mode` override it when set.
#[derive(Clone, Debug)]
pub struct SimConfig {
    pub content_dir: PathBuf,
    pub encounter: String,
    pub speed: Option<BattleSpeed>,
    pub wait_mode: Option<bool>,
    pub max_ticks: u64,
    pub frame_ms: u32,
    pub log_dir: Option<PathBuf>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            content_dir: PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../battle/content/data"),
            encounter: "forest_ambush".to_string(),
            speed: None,
            wait_mode: None,
            max_ticks: 20_000,
            frame_ms: 16,
            log_dir: None,
        }
    }
}

impl SimConfig {
    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `BATTLE_CONTENT_DIR` - Content data directory (default: bundled data)
    /// - `BATTLE_ENCOUNTER` - Encounter file name without extension (default: forest_ambush)
    /// - `BATTLE_SPEED` - `slow`, `normal` or `fast` (default: from config.toml)
    /// - `BATTLE_WAIT_MODE` - Stop timers while choosing commands (default: from config.toml)
    /// - `BATTLE_MAX_TICKS` - Frames to run before giving up (default: 20000)
    /// - `BATTLE_FRAME_MS` - Frame length in milliseconds (default: 16)
    /// - `BATTLE_LOG_DIR` - Also write logs to `battle.log` in this directory
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        let read = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(dir) = read("BATTLE_CONTENT_DIR") {
            config.content_dir = PathBuf::from(dir);
        }
        if let Some(encounter) = read("BATTLE_ENCOUNTER") {
            config.encounter = encounter;
        }
        config.speed = read("BATTLE_SPEED").and_then(|v| v.trim().parse().ok());
        config.wait_mode = read("BATTLE_WAIT_MODE").and_then(|v| parse_flag(&v));
        if let Some(ticks) = read("BATTLE_MAX_TICKS").and_then(|v| v.trim().parse::<u64>().ok()) {
            config.max_ticks = ticks.max(1);
        }
        if let Some(frame) = read("BATTLE_FRAME_MS").and_then(|v| v.trim().parse::<u32>().ok()) {
            config.frame_ms = frame.max(1);
        }
        config.log_dir = read("BATTLE_LOG_DIR").map(PathBuf::from);

        config
    }

    /// Applies the environment overrides to a loaded battle config.
    pub fn apply(&self, mut battle: BattleConfig) -> BattleConfig {
        if let Some(speed) = self.speed {
            battle = battle.with_speed(speed);
        }
        if let Some(wait) = self.wait_mode {
            battle = battle.with_wait_during_command(wait);
        }
        battle
    }
}

/// Accepts `true/false`, `1/0`, `yes/no`, `on/off`.
fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
