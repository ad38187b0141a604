//! Formation layout and sway
//!
//! Parked enemies never integrate velocity: every tick their position is
//! recomputed from the anchor, the shared sway offset and their own bob phase,
//! so the formation cannot drift.

use glam::Vec2;
use rand::Rng;

use super::state::{Enemy, EnemyId, EnemyKind, Formation, GameState};
use crate::consts::*;

/// One row of the formation layout
struct RowLayout {
    count: usize,
    kind: EnemyKind,
}

/// Top row to bottom row
const ROWS: [RowLayout; 5] = [
    RowLayout { count: 2, kind: EnemyKind::Boss },
    RowLayout { count: 6, kind: EnemyKind::Red },
    RowLayout { count: 8, kind: EnemyKind::Purple },
    RowLayout { count: 10, kind: EnemyKind::Blue },
    RowLayout { count: 10, kind: EnemyKind::Blue },
];

/// Red-row slots the bosses sit above
const BOSS_COLUMNS: [usize; 2] = [1, 4];

/// Number of enemies in a full formation
pub fn formation_size() -> usize {
    ROWS.iter().map(|r| r.count).sum()
}

impl Formation {
    /// Advance the sway oscillator
    ///
    /// The phase runs as a triangle wave between ±SWAY_LIMIT; the offset is its
    /// sine, which gives the eased side-to-side sweep.
    pub fn advance(&mut self, dt: f32) {
        self.sway += SWAY_SPEED * dt * self.dir;
        if self.sway > SWAY_LIMIT {
            self.dir = -1.0;
        } else if self.sway < -SWAY_LIMIT {
            self.dir = 1.0;
        }
        self.offset_x = self.sway.sin() * MAX_SWAY_OFFSET;
    }

    /// Vertical bob for a given phase
    #[inline]
    pub fn bob(&self, phase: f32) -> f32 {
        (self.sway + phase).sin() * BOB_AMPLITUDE
    }

    /// Position of a parked enemy
    pub fn slot_position(&self, enemy: &Enemy) -> Vec2 {
        Vec2::new(enemy.base.x + self.offset_x, enemy.base.y + self.bob(enemy.phase))
    }

    /// Snap every alive, non-diving enemy onto its slot
    pub fn arrange(&self, enemies: &mut [Enemy]) {
        for enemy in enemies.iter_mut().filter(|e| e.alive && !e.diving) {
            enemy.pos = self.slot_position(enemy);
        }
    }
}

/// Advance the sway and re-place parked enemies
pub fn update_formation(state: &mut GameState, dt: f32) {
    state.formation.advance(dt);
    state.formation.arrange(&mut state.enemies);
}

/// Build a fresh formation for the current wave
///
/// Clears dives and escort groups: they reference the old arena.
pub fn generate_formation(state: &mut GameState) {
    use std::f32::consts::TAU;

    state.enemies.clear();
    state.dives.clear();
    state.escort_groups.clear();

    let center = crate::center_x();
    let red_count = ROWS[1].count;
    let red_start = center - (red_count - 1) as f32 * COLUMN_SPACING / 2.0;

    let mut y = FORMATION_TOP;
    for (row, layout) in ROWS.iter().enumerate() {
        let start_x = center - (layout.count - 1) as f32 * COLUMN_SPACING / 2.0;

        for i in 0..layout.count {
            let x = match layout.kind {
                EnemyKind::Boss => red_start + BOSS_COLUMNS[i % BOSS_COLUMNS.len()] as f32 * COLUMN_SPACING,
                _ => start_x + i as f32 * COLUMN_SPACING,
            };
            let id = EnemyId(state.enemies.len() as u32);
            let phase = state.rng.random::<f32>() * TAU;
            let mut enemy = Enemy::new(id, row as u8, layout.kind, Vec2::new(x, y), phase);

            match layout.kind {
                EnemyKind::Boss => enemy.boss_slot = Some(i as u8),
                // Left half of the red row escorts boss 0, right half boss 1
                EnemyKind::Red => enemy.escort_for = Some((i * BOSS_COLUMNS.len() / red_count) as u8),
                _ => {}
            }

            state.enemies.push(enemy);
        }
        y += ROW_SPACING;
    }

    state.formation = Formation::default();
    state.formation.arrange(&mut state.enemies);
    state.next_dive = state.tuning.dive_interval_base;

    log::info!("Wave {}: formation of {} enemies", state.wave, state.enemies.len());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_formation_layout() {
        let state = GameState::new(3);
        assert_eq!(state.enemies.len(), formation_size());
        assert_eq!(formation_size(), 36);

        let bosses: Vec<_> = state.enemies.iter().filter(|e| e.kind == EnemyKind::Boss).collect();
        assert_eq!(bosses.len(), 2);
        let reds: Vec<_> = state.enemies.iter().filter(|e| e.kind == EnemyKind::Red).collect();

        // Bosses sit above red slots 1 and 4
        assert!((bosses[0].base.x - reds[1].base.x).abs() < 1e-4);
        assert!((bosses[1].base.x - reds[4].base.x).abs() < 1e-4);
        assert_eq!(bosses[0].boss_slot, Some(0));
        assert_eq!(bosses[1].boss_slot, Some(1));

        // Three reds per boss
        assert_eq!(reds.iter().filter(|r| r.escort_for == Some(0)).count(), 3);
        assert_eq!(reds.iter().filter(|r| r.escort_for == Some(1)).count(), 3);

        // Rows stack downward
        assert_eq!(state.enemies[0].base.y, FORMATION_TOP);
        assert_eq!(state.enemies[35].base.y, FORMATION_TOP + 4.0 * ROW_SPACING);
    }

    #[test]
    fn test_sway_reverses_at_limit() {
        let mut formation = Formation::default();
        let mut max_sway: f32 = 0.0;
        let mut reversed = false;
        for _ in 0..200 {
            formation.advance(0.02);
            max_sway = max_sway.max(formation.sway.abs());
            if formation.dir < 0.0 {
                reversed = true;
            }
        }
        assert!(reversed);
        // Never more than one step past the limit
        assert!(max_sway <= SWAY_LIMIT + SWAY_SPEED * 0.02 + 1e-5);
        assert!(formation.offset_x.abs() <= MAX_SWAY_OFFSET);
    }

    #[test]
    fn test_zero_dt_is_idempotent() {
        let mut state = GameState::new(11);
        update_formation(&mut state, 0.013);
        let before: Vec<_> = state.enemies.iter().map(|e| e.pos).collect();
        for _ in 0..50 {
            update_formation(&mut state, 0.0);
        }
        let after: Vec<_> = state.enemies.iter().map(|e| e.pos).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_diving_and_dead_enemies_are_not_moved() {
        let mut state = GameState::new(5);
        let parked = Vec2::new(-50.0, -50.0);
        state.enemies[3].diving = true;
        state.enemies[3].pos = parked;
        state.enemies[4].alive = false;
        state.enemies[4].pos = parked;
        update_formation(&mut state, 0.02);
        assert_eq!(state.enemies[3].pos, parked);
        assert_eq!(state.enemies[4].pos, parked);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn parked_enemies_sit_exactly_on_slot(
                seed in any::<u64>(),
                steps in prop::collection::vec(0.0f32..=MAX_FRAME_DT, 1..300),
            ) {
                let mut state = GameState::new(seed);
                for dt in steps {
                    update_formation(&mut state, dt);
                    let offset = state.formation.sway.sin() * MAX_SWAY_OFFSET;
                    for enemy in state.enemies.iter().filter(|e| e.alive && !e.diving) {
                        let bob = (state.formation.sway + enemy.phase).sin() * BOB_AMPLITUDE;
                        prop_assert_eq!(enemy.pos.x, enemy.base.x + offset);
                        prop_assert_eq!(enemy.pos.y, enemy.base.y + bob);
                    }
                }
            }
        }
    }
}
