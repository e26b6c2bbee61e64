/// Global pacing of an encounter.
///
/// The multiplier scales every participant duration (idle, warm-up,
/// cool-down). Values are percentages so timer math stays integral.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(ascii_case_insensitive)]
pub enum BattleSpeed {
    Slow,
    #[default]
    Normal,
    Fast,
}

impl BattleSpeed {
    /// Duration multiplier in percent (100 = unchanged).
    pub const fn multiplier_percent(self) -> u32 {
        match self {
            BattleSpeed::Slow => 150,
            BattleSpeed::Normal => 100,
            BattleSpeed::Fast => 50,
        }
    }

    /// Scales a duration in milliseconds by this speed setting.
    pub const fn scale(self, duration_ms: u32) -> u32 {
        ((duration_ms as u64 * self.multiplier_percent() as u64) / 100) as u32
    }
}

/// Battle configuration constants and tunable parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BattleConfig {
    /// Idle time of the slowest participant before speed scaling.
    pub base_idle_time_ms: u32,

    pub speed: BattleSpeed,

    /// Length of the entrance sequence played in the `Initial` phase.
    pub entrance_duration_ms: u32,

    /// Duration used when an effect routine applies a status without
    /// naming one.
    pub default_effect_duration_ms: u32,

    /// Wait mode: participant timers stand still while a player is choosing
    /// a command.
    pub wait_during_command: bool,
}

impl BattleConfig {
    // ===== compile-time constants used as type parameters =====
    pub const MAX_PARTICIPANTS_PER_SIDE: usize = 8;
    pub const MAX_ATTACK_POINTS: usize = 6;
    pub const MAX_STATUS_EFFECTS: usize = <crate::status::StatusEffectKind as strum::EnumCount>::COUNT;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_BASE_IDLE_TIME_MS: u32 = 3_000;
    pub const DEFAULT_ENTRANCE_DURATION_MS: u32 = 1_000;
    pub const DEFAULT_EFFECT_DURATION_MS: u32 = 10_000;

    pub fn new() -> Self {
        Self {
            base_idle_time_ms: Self::DEFAULT_BASE_IDLE_TIME_MS,
            speed: BattleSpeed::Normal,
            entrance_duration_ms: Self::DEFAULT_ENTRANCE_DURATION_MS,
            default_effect_duration_ms: Self::DEFAULT_EFFECT_DURATION_MS,
            wait_during_command: false,
        }
    }

    pub fn with_base_idle_time(mut self, base_idle_time_ms: u32) -> Self {
        self.base_idle_time_ms = base_idle_time_ms;
        self
    }

    pub fn with_speed(mut self, speed: BattleSpeed) -> Self {
        self.speed = speed;
        self
    }

    pub fn with_entrance_duration(mut self, entrance_duration_ms: u32) -> Self {
        self.entrance_duration_ms = entrance_duration_ms;
        self
    }

    pub fn with_wait_during_command(mut self, wait: bool) -> Self {
        self.wait_during_command = wait;
        self
    }

    /// Scales a participant duration by the configured speed.
    #[inline]
    pub fn scaled(&self, duration_ms: u32) -> u32 {
        self.speed.scale(duration_ms)
    }
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self::new()
    }
}
