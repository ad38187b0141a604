//! Galaxy Raid - simulation core for a formation arcade shooter
//!
//! Core modules:
//! - `sim`: Deterministic simulation (formation, dives, collisions, session state)
//! - `platform`: Host-side frame clock and demo autopilot
//! - `tuning`: Data-driven game balance

pub mod platform;
pub mod sim;
pub mod tuning;

pub use tuning::{Difficulty, Tuning, TuningError};

/// Game configuration constants
pub mod consts {
    /// Largest time step a single tick may advance (seconds)
    pub const MAX_FRAME_DT: f32 = 0.02;

    /// Playfield dimensions
    pub const SCREEN_WIDTH: f32 = 480.0;
    pub const SCREEN_HEIGHT: f32 = 640.0;

    /// Player defaults
    pub const PLAYER_Y: f32 = SCREEN_HEIGHT - 70.0;
    pub const PLAYER_MARGIN: f32 = 30.0;

    /// Enemy hitbox
    pub const ENEMY_WIDTH: f32 = 32.0;
    pub const ENEMY_HEIGHT: f32 = 32.0;

    /// Formation layout
    pub const FORMATION_TOP: f32 = 100.0;
    pub const ROW_SPACING: f32 = 32.0;
    pub const COLUMN_SPACING: f32 = 36.0;

    /// Formation sway (triangle-wave phase, sine-shaped offset)
    pub const SWAY_SPEED: f32 = 0.9;
    pub const SWAY_LIMIT: f32 = 1.6;
    pub const MAX_SWAY_OFFSET: f32 = 70.0;
    pub const BOB_AMPLITUDE: f32 = 3.0;

    /// Dive kinematics
    pub const DIVE_DEPTH: f32 = 360.0;
    pub const DIVE_CURVE_MIN: f32 = 70.0;
    pub const DIVE_CURVE_MAX: f32 = 110.0;
    pub const ZIG_DAMPING: f32 = 0.6;
    /// Fraction of the dive after which a diver takes its shot
    pub const DIVE_SHOT_AT: f32 = 0.35;

    /// Landing clamp after a dive
    pub const LANDING_MARGIN_X: f32 = 80.0;
    pub const LANDING_TOP: f32 = 120.0;
    pub const LANDING_BOTTOM: f32 = 320.0;
    pub const LANDING_ROW_STEP: f32 = 40.0;

    /// Bullets
    pub const BULLET_RADIUS: f32 = 2.0;
    pub const PLAYER_BULLET_SPEED: f32 = 360.0;
    pub const SPREAD_BULLET_SPEED: f32 = 340.0;
    pub const SPREAD_BULLET_VX: f32 = 120.0;
    /// Off-stage parking spots for bullets disabled by a hit
    pub const SPENT_PLAYER_BULLET_Y: f32 = -999.0;
    pub const SPENT_ENEMY_BULLET_Y: f32 = SCREEN_HEIGHT + 40.0;

    /// Player vs enemy bullet proximity (absolute pixels)
    pub const PLAYER_HIT_DX: f32 = 10.0;
    pub const PLAYER_HIT_DY: f32 = 12.0;

    /// Power-ups
    pub const POWERUP_FALL_SPEED: f32 = 60.0;
    pub const POWERUP_LIFETIME: f32 = 7.0;
    pub const POWERUP_PICKUP_RANGE: f32 = 14.0;

    /// Session
    pub const MAX_CREDITS: u32 = 99;
}

/// Playfield center column, where the player spawns
#[inline]
pub fn center_x() -> f32 {
    consts::SCREEN_WIDTH * 0.5
}
