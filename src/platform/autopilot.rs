//! Demo autopilot
//!
//! Plays the game for attract loops and headless runs: sidesteps enemy
//! bullets that are about to land, otherwise lines up under the nearest
//! enemy, and keeps the trigger held.

use crate::sim::{GameMode, GameState, Intent};

/// Steering parameters for the demo player
#[derive(Debug, Clone)]
pub struct Autopilot {
    /// Enemy bullets closer than this horizontally count as a threat
    pub danger_dx: f32,
    /// Only bullets within this height above the ship are considered
    pub danger_dy: f32,
    /// Horizontal slack before the ship bothers to move
    pub deadband: f32,
}

impl Default for Autopilot {
    fn default() -> Self {
        Self {
            danger_dx: 22.0,
            danger_dy: 140.0,
            deadband: 4.0,
        }
    }
}

impl Autopilot {
    /// Intents for this frame; empty outside play or while the ship is down
    pub fn intents(&self, state: &GameState) -> Vec<Intent> {
        if state.mode != GameMode::Play || !state.player.alive {
            return Vec::new();
        }
        let ship = state.player.pos;

        // Nearest incoming bullet that would hit if we stayed put
        let threat = state
            .enemy_bullets
            .iter()
            .filter(|b| {
                let dy = ship.y - b.pos.y;
                dy > 0.0 && dy < self.danger_dy && (b.pos.x - ship.x).abs() < self.danger_dx
            })
            .min_by(|a, b| {
                (ship.y - a.pos.y)
                    .partial_cmp(&(ship.y - b.pos.y))
                    .unwrap_or(std::cmp::Ordering::Equal)
            });

        let steer = if let Some(bullet) = threat {
            // Step away from the bullet, towards the open side near the walls
            let away = if bullet.pos.x >= ship.x { -1.0 } else { 1.0 };
            let room_left = ship.x - crate::consts::PLAYER_MARGIN;
            let room_right = crate::consts::SCREEN_WIDTH - crate::consts::PLAYER_MARGIN - ship.x;
            if away < 0.0 && room_left < self.danger_dx {
                1.0
            } else if away > 0.0 && room_right < self.danger_dx {
                -1.0
            } else {
                away
            }
        } else {
            let target = state
                .enemies
                .iter()
                .filter(|e| e.alive)
                .min_by(|a, b| {
                    (a.pos.x - ship.x)
                        .abs()
                        .partial_cmp(&(b.pos.x - ship.x).abs())
                        .unwrap_or(std::cmp::Ordering::Equal)
                });
            match target {
                Some(enemy) if enemy.pos.x < ship.x - self.deadband => -1.0,
                Some(enemy) if enemy.pos.x > ship.x + self.deadband => 1.0,
                _ => 0.0,
            }
        };

        vec![
            Intent::MoveLeft(steer < 0.0),
            Intent::MoveRight(steer > 0.0),
            Intent::Fire(true),
        ]
    }

    /// Apply this frame's intents directly
    pub fn drive(&self, state: &mut GameState) {
        for intent in self.intents(state) {
            state.apply_intent(intent);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::Bullet;
    use crate::sim::tick;
    use glam::Vec2;

    fn play_state(seed: u64) -> GameState {
        let mut state = GameState::new(seed);
        state.insert_coin();
        state.start_game();
        state
    }

    #[test]
    fn test_idle_outside_play() {
        let state = GameState::new(1);
        assert!(Autopilot::default().intents(&state).is_empty());
    }

    #[test]
    fn test_tracks_nearest_enemy() {
        let mut state = play_state(2);
        for enemy in state.enemies.iter_mut().skip(1) {
            enemy.alive = false;
        }
        state.enemies[0].pos.x = 100.0;
        state.player.pos.x = 300.0;

        let intents = Autopilot::default().intents(&state);
        assert_eq!(
            intents,
            vec![Intent::MoveLeft(true), Intent::MoveRight(false), Intent::Fire(true)]
        );
    }

    #[test]
    fn test_sidesteps_incoming_bullet() {
        let mut state = play_state(3);
        state.player.pos.x = 240.0;
        state
            .enemy_bullets
            .push(Bullet::new(Vec2::new(245.0, state.player.pos.y - 60.0), Vec2::new(0.0, 220.0)));

        let intents = Autopilot::default().intents(&state);
        assert!(intents.contains(&Intent::MoveLeft(true)));
        assert!(intents.contains(&Intent::MoveRight(false)));
    }

    #[test]
    fn test_dodges_inward_near_wall() {
        let mut state = play_state(4);
        state.player.pos.x = crate::consts::PLAYER_MARGIN + 2.0;
        state.enemy_bullets.push(Bullet::new(
            Vec2::new(state.player.pos.x + 3.0, state.player.pos.y - 40.0),
            Vec2::new(0.0, 220.0),
        ));

        let intents = Autopilot::default().intents(&state);
        assert!(intents.contains(&Intent::MoveRight(true)));
    }

    #[test]
    fn test_demo_run_scores() {
        let mut state = play_state(5);
        let pilot = Autopilot::default();
        for _ in 0..1500 {
            pilot.drive(&mut state);
            tick(&mut state, crate::consts::MAX_FRAME_DT);
        }
        assert!(state.score > 0);
    }
}
