//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Clamped timestep only
//! - Seeded RNG only
//! - Stable iteration order (by enemy ID)
//! - No rendering, audio or platform dependencies

pub mod collision;
pub mod dive;
pub mod formation;
pub mod session;
pub mod state;
pub mod tick;

pub use collision::{bullet_hits_enemy, bullet_hits_player, escort_bonus};
pub use dive::{landing_position, launch_dive, try_spawn_dive};
pub use formation::{formation_size, generate_formation};
pub use state::{
    Bullet, Dive, DivePattern, Enemy, EnemyId, EnemyKind, EscortGroup, GameEvent, GameMode, GameState, Intent,
    Player, PowerUp, PowerUpKind,
};
pub use tick::tick;
