//! Game balance and difficulty presets
//!
//! Every wave-scaled number the simulation uses lives here so a host can ship
//! its own balance as JSON without touching the sim.

use serde::{Deserialize, Serialize};

use crate::sim::EnemyKind;

/// Difficulty presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Difficulty {
    Easy,
    #[default]
    Arcade,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Arcade => "Arcade",
            Difficulty::Hard => "Hard",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "arcade" | "normal" => Some(Difficulty::Arcade),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }
}

/// Errors raised while loading tuning data
#[derive(Debug, thiserror::Error)]
pub enum TuningError {
    #[error("Failed to read tuning file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Tuning parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid tuning value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Balance parameters (fields missing from JSON fall back to Arcade values)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub difficulty: Difficulty,

    // === Dive schedule ===
    /// Seconds between dive attempts on wave 1 (before jitter)
    pub dive_interval_base: f32,
    /// Interval reduction per wave
    pub dive_interval_decay: f32,
    /// Shortest interval regardless of wave
    pub dive_interval_floor: f32,
    /// Random extra delay added after each attempt, in [0, jitter)
    pub dive_interval_jitter: f32,
    /// Dive flight time on wave 1
    pub dive_duration_base: f32,
    pub dive_duration_decay: f32,
    pub dive_duration_floor: f32,
    /// Extra dive probability per wave, capped at `dive_boost_max`
    pub dive_boost_per_wave: f32,
    pub dive_boost_max: f32,
    /// Start lag between a boss and each of its escorts (seconds)
    pub escort_lag: f32,

    // === Enemy fire ===
    pub enemy_fire_chance: f32,
    pub enemy_fire_boost_per_wave: f32,
    pub enemy_fire_boost_max: f32,
    pub enemy_bullet_speed: f32,
    pub enemy_bullet_speed_per_wave: f32,

    // === Scoring ===
    /// Boss shot after both escorts went down
    pub escort_bonus_all: u64,
    /// Boss shot after at least one escort went down
    pub escort_bonus_some: u64,
    /// Boss shot with its escorts still flying
    pub escort_bonus_none: u64,

    // === Power-ups ===
    pub powerup_drop_chance: f32,

    // === Player / session ===
    pub player_speed: f32,
    pub starting_lives: u8,
    pub life_cap: u8,
    /// Delay between a death and the respawn/game-over decision
    pub respawn_delay: f32,
    pub respawn_invuln: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::Arcade,

            dive_interval_base: 1.1,
            dive_interval_decay: 0.07,
            dive_interval_floor: 0.45,
            dive_interval_jitter: 0.4,
            dive_duration_base: 1.9,
            dive_duration_decay: 0.06,
            dive_duration_floor: 1.1,
            dive_boost_per_wave: 0.02,
            dive_boost_max: 0.2,
            escort_lag: 0.12,

            enemy_fire_chance: 0.85,
            enemy_fire_boost_per_wave: 0.02,
            enemy_fire_boost_max: 0.1,
            enemy_bullet_speed: 220.0,
            enemy_bullet_speed_per_wave: 10.0,

            escort_bonus_all: 800,
            escort_bonus_some: 300,
            escort_bonus_none: 200,

            powerup_drop_chance: 0.12,

            player_speed: 210.0,
            starting_lives: 3,
            life_cap: 4,
            respawn_delay: 0.8,
            respawn_invuln: 1.2,
        }
    }
}

impl Tuning {
    /// Create tuning from a difficulty preset
    pub fn from_preset(preset: Difficulty) -> Self {
        let mut tuning = Self::default();
        tuning.apply_preset(preset);
        tuning
    }

    /// Apply a difficulty preset on top of the current values
    pub fn apply_preset(&mut self, preset: Difficulty) {
        self.difficulty = preset;

        match preset {
            Difficulty::Easy => {
                self.dive_interval_base = 1.4;
                self.dive_interval_floor = 0.6;
                self.dive_duration_base = 2.2;
                self.dive_duration_floor = 1.4;
                self.enemy_fire_chance = 0.7;
                self.enemy_bullet_speed = 190.0;
                self.powerup_drop_chance = 0.18;
                self.starting_lives = 4;
                self.life_cap = 5;
            }
            Difficulty::Arcade => {}
            Difficulty::Hard => {
                self.dive_interval_base = 0.9;
                self.dive_interval_floor = 0.35;
                self.dive_duration_base = 1.6;
                self.dive_duration_floor = 0.9;
                self.enemy_fire_chance = 0.9;
                self.enemy_bullet_speed = 250.0;
                self.powerup_drop_chance = 0.08;
                self.life_cap = 3;
            }
        }
    }

    /// Parse and validate tuning from JSON
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        log::info!("Loaded {} tuning", tuning.difficulty.as_str());
        Ok(tuning)
    }

    /// Read tuning from a JSON file
    #[cfg(not(target_arch = "wasm32"))]
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, TuningError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn to_json(&self) -> Result<String, TuningError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject values the sim cannot run with
    pub fn validate(&self) -> Result<(), TuningError> {
        let probabilities = [
            ("enemy_fire_chance", self.enemy_fire_chance),
            ("enemy_fire_boost_max", self.enemy_fire_boost_max),
            ("dive_boost_max", self.dive_boost_max),
            ("powerup_drop_chance", self.powerup_drop_chance),
        ];
        for (field, value) in probabilities {
            if !(0.0..=1.0).contains(&value) {
                return Err(TuningError::Invalid {
                    field,
                    reason: format!("{value} is not a probability"),
                });
            }
        }

        let positive = [
            ("dive_interval_floor", self.dive_interval_floor),
            ("dive_duration_floor", self.dive_duration_floor),
            ("player_speed", self.player_speed),
            ("enemy_bullet_speed", self.enemy_bullet_speed),
        ];
        for (field, value) in positive {
            if !(value > 0.0) {
                return Err(TuningError::Invalid {
                    field,
                    reason: format!("{value} must be positive"),
                });
            }
        }

        let non_negative = [
            ("dive_interval_jitter", self.dive_interval_jitter),
            ("escort_lag", self.escort_lag),
            ("respawn_delay", self.respawn_delay),
            ("respawn_invuln", self.respawn_invuln),
        ];
        for (field, value) in non_negative {
            if !(value >= 0.0) {
                return Err(TuningError::Invalid {
                    field,
                    reason: format!("{value} must not be negative"),
                });
            }
        }

        if self.dive_interval_floor > self.dive_interval_base {
            return Err(TuningError::Invalid {
                field: "dive_interval_floor",
                reason: "floor exceeds base interval".to_string(),
            });
        }
        if self.dive_duration_floor > self.dive_duration_base {
            return Err(TuningError::Invalid {
                field: "dive_duration_floor",
                reason: "floor exceeds base duration".to_string(),
            });
        }
        let plain_boss = EnemyKind::Boss.diving_value();
        if self.escort_bonus_none <= plain_boss {
            return Err(TuningError::Invalid {
                field: "escort_bonus_none",
                reason: format!("{} does not beat the plain boss value {}", self.escort_bonus_none, plain_boss),
            });
        }
        if self.escort_bonus_some < self.escort_bonus_none {
            return Err(TuningError::Invalid {
                field: "escort_bonus_some",
                reason: format!("{} is below escort_bonus_none {}", self.escort_bonus_some, self.escort_bonus_none),
            });
        }
        if self.escort_bonus_all <= self.escort_bonus_none {
            return Err(TuningError::Invalid {
                field: "escort_bonus_all",
                reason: format!("{} does not beat escort_bonus_none {}", self.escort_bonus_all, self.escort_bonus_none),
            });
        }
        if self.starting_lives == 0 {
            return Err(TuningError::Invalid {
                field: "starting_lives",
                reason: "a game needs at least one life".to_string(),
            });
        }
        if self.life_cap < self.starting_lives {
            return Err(TuningError::Invalid {
                field: "life_cap",
                reason: format!("cap {} is below starting lives {}", self.life_cap, self.starting_lives),
            });
        }
        Ok(())
    }

    /// Waves completed before `wave` (wave numbers start at 1)
    #[inline]
    fn waves_in(wave: u32) -> f32 {
        wave.saturating_sub(1) as f32
    }

    /// Dive countdown for `wave`, before jitter
    pub fn dive_interval(&self, wave: u32) -> f32 {
        (self.dive_interval_base - Self::waves_in(wave) * self.dive_interval_decay)
            .clamp(self.dive_interval_floor, self.dive_interval_base)
    }

    /// Flight time of a single dive on `wave`
    pub fn dive_duration(&self, wave: u32) -> f32 {
        (self.dive_duration_base - Self::waves_in(wave) * self.dive_duration_decay)
            .clamp(self.dive_duration_floor, self.dive_duration_base)
    }

    /// Added to each row's dive chance on `wave`
    pub fn dive_boost(&self, wave: u32) -> f32 {
        (Self::waves_in(wave) * self.dive_boost_per_wave).min(self.dive_boost_max)
    }

    pub fn enemy_fire_chance(&self, wave: u32) -> f32 {
        let boost = (Self::waves_in(wave) * self.enemy_fire_boost_per_wave).min(self.enemy_fire_boost_max);
        (self.enemy_fire_chance + boost).min(1.0)
    }

    pub fn enemy_bullet_speed(&self, wave: u32) -> f32 {
        self.enemy_bullet_speed + Self::waves_in(wave) * self.enemy_bullet_speed_per_wave
    }
}
