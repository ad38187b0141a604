//! Dive attacks
//!
//! A dive detaches one enemy from the formation and flies it along a
//! parametric path: vertical travel is linear in normalized time, lateral
//! travel follows the pattern's sine shape. When the flight ends the enemy
//! re-anchors wherever it landed.

use glam::Vec2;
use rand::Rng;

use super::state::{Bullet, Dive, DivePattern, EnemyId, EnemyKind, EscortGroup, GameEvent, GameMode, GameState};
use crate::consts::*;

/// Escorts pulled into a boss dive
pub const MAX_ESCORTS: usize = 2;

/// Anchor an enemy re-joins the formation at after a dive
pub fn landing_position(pos: Vec2, row: u8) -> Vec2 {
    Vec2::new(
        pos.x.clamp(LANDING_MARGIN_X, SCREEN_WIDTH - LANDING_MARGIN_X),
        (LANDING_TOP + row as f32 * LANDING_ROW_STEP).clamp(LANDING_TOP, LANDING_BOTTOM),
    )
}

/// Count down to the next attack and run it when due
///
/// One candidate is drawn per attempt; it may dive, and it may fire, both
/// rolled independently.
pub fn schedule_attacks(state: &mut GameState, dt: f32) {
    if state.enemies.is_empty() {
        return;
    }
    state.next_dive -= dt;
    if state.next_dive > 0.0 {
        return;
    }

    if let Some(pick) = pick_candidate(state) {
        try_spawn_dive(state, pick);

        let fire_chance = state.tuning.enemy_fire_chance(state.wave).clamp(0.0, 1.0) as f64;
        if state.rng.random_bool(fire_chance) {
            if let Some(pos) = state.enemy(pick).map(|e| e.pos) {
                fire_enemy_bullet(state, pos);
            }
        }
    }

    let jitter = state.rng.random::<f32>() * state.tuning.dive_interval_jitter;
    state.next_dive = state.tuning.dive_interval(state.wave) + jitter;
}

/// Uniformly pick an alive, parked, non-scattering enemy
pub fn pick_candidate(state: &mut GameState) -> Option<EnemyId> {
    let candidates: Vec<EnemyId> = state
        .enemies
        .iter()
        .filter(|e| e.is_dive_candidate())
        .map(|e| e.id)
        .collect();
    if candidates.is_empty() {
        return None;
    }
    let index = state.rng.random_range(0..candidates.len());
    Some(candidates[index])
}

/// Roll the candidate's dive chance and launch the dive on success
pub fn try_spawn_dive(state: &mut GameState, id: EnemyId) -> bool {
    let Some(enemy) = state.enemy(id) else {
        return false;
    };
    if !enemy.is_dive_candidate() {
        return false;
    }
    let chance = (enemy.dive_chance + state.tuning.dive_boost(state.wave)).clamp(0.0, 1.0) as f64;
    if !state.rng.random_bool(chance) {
        return false;
    }
    launch_dive(state, id)
}

/// Detach an enemy from the formation with a random path
///
/// A boss brings its escorts along. Returns false if the enemy cannot dive.
pub fn launch_dive(state: &mut GameState, id: EnemyId) -> bool {
    let duration = state.tuning.dive_duration(state.wave);
    let sign = if state.rng.random_bool(0.5) { 1.0 } else { -1.0 };
    let curve = sign * state.rng.random_range(DIVE_CURVE_MIN..DIVE_CURVE_MAX);
    let pattern = DivePattern::ALL[state.rng.random_range(0..DivePattern::ALL.len())];

    let Some(enemy) = state.enemy_mut(id) else {
        return false;
    };
    if !enemy.is_dive_candidate() {
        return false;
    }
    enemy.diving = true;
    let start = enemy.pos;
    let kind = enemy.kind;

    state.dives.push(Dive {
        enemy: id,
        elapsed: 0.0,
        duration,
        start,
        curve,
        pattern,
        done: false,
        shots: 1,
    });
    log::debug!("{:?} {:?} dives ({:?}, curve {:.0})", id, kind, pattern, curve);

    if kind == EnemyKind::Boss {
        recruit_escorts(state, id, pattern, duration, curve);
    }
    true
}

/// Pull up to two tagged reds into a boss's dive and link them in a group
fn recruit_escorts(state: &mut GameState, boss: EnemyId, pattern: DivePattern, duration: f32, curve: f32) {
    let Some(boss_enemy) = state.enemy(boss) else {
        return;
    };
    let Some(slot) = boss_enemy.boss_slot else {
        return;
    };
    let boss_x = boss_enemy.base.x;

    let mut escorts: Vec<(EnemyId, f32)> = state
        .enemies
        .iter()
        .filter(|e| e.kind == EnemyKind::Red && e.escort_for == Some(slot))
        .filter(|e| e.is_dive_candidate() && e.escort_group.is_none())
        .map(|e| (e.id, (e.base.x - boss_x).abs()))
        .collect();
    if escorts.is_empty() {
        return;
    }
    // Closest wingmen first, ties broken by id
    escorts.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
    escorts.truncate(MAX_ESCORTS);

    let group_id = state.next_group_id();
    let lag = state.tuning.escort_lag;

    for (i, &(escort, _)) in escorts.iter().enumerate() {
        let Some(enemy) = state.enemy_mut(escort) else {
            continue;
        };
        enemy.diving = true;
        enemy.escort_group = Some(group_id);
        let start = enemy.pos;
        // First wingman flanks on the boss's side, second mirrors it
        let flank = if i == 0 { 1.0 } else { -1.0 };

        state.dives.push(Dive {
            enemy: escort,
            elapsed: -lag * (i + 1) as f32,
            duration,
            start,
            curve: curve * flank,
            pattern,
            done: false,
            shots: 1,
        });
    }

    if let Some(enemy) = state.enemy_mut(boss) {
        enemy.escort_group = Some(group_id);
    }
    state.escort_groups.push(EscortGroup {
        id: group_id,
        boss,
        escorts: escorts.iter().map(|&(id, _)| id).collect(),
    });
    log::debug!("Boss {:?} dives with {} escort(s)", boss, escorts.len());
}

/// Advance every active dive
pub fn update_dives(state: &mut GameState, dt: f32) {
    state.dives.retain(|d| !d.done);

    let allow_fire = state.mode == GameMode::Play;
    let mut shots: Vec<Vec2> = Vec::new();
    let mut landed_groups: Vec<u32> = Vec::new();

    for dive in state.dives.iter_mut() {
        dive.elapsed += dt;

        let Some(enemy) = state.enemies.get_mut(dive.enemy.index()) else {
            dive.done = true;
            continue;
        };
        if !enemy.alive {
            dive.done = true;
            enemy.diving = false;
            continue;
        }

        let u = dive.progress();
        enemy.pos = dive.position_at(u);

        if allow_fire && dive.shots > 0 && u >= DIVE_SHOT_AT && !enemy.scattering {
            dive.shots -= 1;
            shots.push(enemy.pos);
        }

        if dive.is_complete() {
            enemy.base = landing_position(enemy.pos, enemy.row);
            enemy.pos = enemy.base;
            enemy.diving = false;
            dive.done = true;
            if enemy.boss_slot.is_some() {
                if let Some(group) = enemy.escort_group {
                    landed_groups.push(group);
                }
            }
        }
    }

    for group in landed_groups {
        dissolve_group(state, group);
    }
    for pos in shots {
        fire_enemy_bullet(state, pos);
    }
}

/// Drop an escort group and unlink its members
pub fn dissolve_group(state: &mut GameState, group_id: u32) {
    let Some(index) = state.escort_groups.iter().position(|g| g.id == group_id) else {
        return;
    };
    let group = state.escort_groups.swap_remove(index);
    for id in std::iter::once(group.boss).chain(group.escorts) {
        if let Some(enemy) = state.enemy_mut(id) {
            if enemy.escort_group == Some(group_id) {
                enemy.escort_group = None;
            }
        }
    }
}

/// Retire the active dive owned by `id`, if any
pub fn retire_dive(state: &mut GameState, id: EnemyId) {
    for dive in state.dives.iter_mut().filter(|d| d.enemy == id && !d.done) {
        dive.done = true;
    }
}

/// Drop a bullet straight down from `pos`
pub fn fire_enemy_bullet(state: &mut GameState, pos: Vec2) {
    let speed = state.tuning.enemy_bullet_speed(state.wave);
    state
        .enemy_bullets
        .push(Bullet::new(pos + Vec2::new(0.0, 10.0), Vec2::new(0.0, speed)));
    state.emit(GameEvent::EnemyShoot);
}
