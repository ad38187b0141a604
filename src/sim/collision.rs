//! Collision detection and kill scoring
//!
//! Hits never splice a collection mid-iteration: a spent bullet is parked
//! off-stage and filtered on the next bullet pass, so it cannot score twice.

use glam::Vec2;
use rand::Rng;

use super::dive::{dissolve_group, retire_dive};
use super::state::{BonusText, Bullet, Enemy, EnemyId, EnemyKind, GameEvent, GameMode, GameState, PowerUp, PowerUpKind};
use crate::consts::*;
use crate::tuning::Tuning;

/// Box/point overlap between an enemy hitbox and a bullet
#[inline]
pub fn bullet_hits_enemy(enemy: &Enemy, bullet: &Bullet) -> bool {
    (enemy.pos.x - bullet.pos.x).abs() < (ENEMY_WIDTH + bullet.radius) * 0.5
        && (enemy.pos.y - bullet.pos.y).abs() < (ENEMY_HEIGHT + bullet.radius) * 0.5
}

/// Fixed-distance check for enemy bullets against the player ship
#[inline]
pub fn bullet_hits_player(player_pos: Vec2, bullet: &Bullet) -> bool {
    (player_pos.x - bullet.pos.x).abs() < PLAYER_HIT_DX && (player_pos.y - bullet.pos.y).abs() < PLAYER_HIT_DY
}

/// Points for shooting a diving boss, given how many of its escorts were already down
///
/// Three tiers only; a single-escort group whose escort died lands in the
/// middle tier.
pub fn escort_bonus(tuning: &Tuning, escorts_dead: usize) -> u64 {
    match escorts_dead {
        0 => tuning.escort_bonus_none,
        1 => tuning.escort_bonus_some,
        _ => tuning.escort_bonus_all,
    }
}

/// Player bullets against enemies
pub fn resolve_hits(state: &mut GameState) {
    for b in 0..state.bullets.len() {
        for e in 0..state.enemies.len() {
            if !state.enemies[e].alive {
                continue;
            }
            if !bullet_hits_enemy(&state.enemies[e], &state.bullets[b]) {
                continue;
            }
            state.bullets[b].pos.y = SPENT_PLAYER_BULLET_Y;
            destroy_enemy(state, EnemyId(e as u32));
        }
    }
}

/// Kill an enemy, score it and spawn its effects
pub fn destroy_enemy(state: &mut GameState, id: EnemyId) {
    let Some(enemy) = state.enemy_mut(id) else {
        return;
    };
    if !enemy.alive {
        return;
    }
    let was_diving = enemy.diving;
    let base_points = enemy.kill_value();
    let kind = enemy.kind;
    let pos = enemy.pos;
    let group = enemy.escort_group;
    enemy.alive = false;
    enemy.diving = false;

    retire_dive(state, id);

    let bonus_group = match (kind, group) {
        (EnemyKind::Boss, Some(group)) if was_diving => Some(group),
        _ => None,
    };

    let points = match bonus_group {
        Some(group_id) => {
            let points = boss_bonus(state, group_id);
            state.bonus_texts.push(BonusText {
                pos,
                value: points,
                life: 1.0,
            });
            log::debug!("Boss {:?} down with escort bonus {}", id, points);
            dissolve_group(state, group_id);
            points
        }
        None => base_points,
    };

    state.add_score(points);
    state.spawn_explosion(pos, 0.35, 4.0);
    state.emit(GameEvent::EnemyHit { kind, points });

    if state.mode == GameMode::Play {
        let chance = state.tuning.powerup_drop_chance.clamp(0.0, 1.0) as f64;
        if state.rng.random_bool(chance) {
            spawn_powerup(state, pos);
        }
    }
}

/// Score a boss kill against its escort group and scatter the survivors
fn boss_bonus(state: &mut GameState, group_id: u32) -> u64 {
    let Some(group) = state.escort_groups.iter().find(|g| g.id == group_id) else {
        return 0;
    };
    let escorts = group.escorts.clone();

    let escorts_dead = escorts
        .iter()
        .filter(|&&id| state.enemy(id).is_some_and(|e| !e.alive))
        .count();

    for id in escorts {
        if let Some(escort) = state.enemy_mut(id) {
            if escort.alive {
                escort.scattering = true;
            }
        }
    }

    escort_bonus(&state.tuning, escorts_dead)
}

/// Enemy bullets against the player; at most one hit per tick
pub fn resolve_player_hits(state: &mut GameState) {
    if !state.player.alive || state.player.invuln > 0.0 {
        return;
    }

    let player_pos = state.player.pos;
    let Some(bullet) = state
        .enemy_bullets
        .iter_mut()
        .find(|b| bullet_hits_player(player_pos, b))
    else {
        return;
    };
    bullet.pos.y = SPENT_ENEMY_BULLET_Y;

    if state.player.power == Some(PowerUpKind::Shield) {
        state.player.clear_power();
        state.emit(GameEvent::ShieldBlock);
    } else {
        super::session::kill_player(state);
    }
}

/// Drop a random power-up capsule at `pos`
pub fn spawn_powerup(state: &mut GameState, pos: Vec2) {
    let kind = PowerUpKind::ALL[state.rng.random_range(0..PowerUpKind::ALL.len())];
    state.powerups.push(PowerUp {
        kind,
        pos,
        vy: POWERUP_FALL_SPEED,
        life: POWERUP_LIFETIME,
    });
}

/// Player collects the first capsule in reach
pub fn check_powerup_pickup(state: &mut GameState) {
    if !state.player.alive {
        return;
    }
    let player_pos = state.player.pos;
    let Some(powerup) = state.powerups.iter_mut().find(|p| {
        (player_pos.x - p.pos.x).abs() < POWERUP_PICKUP_RANGE && (player_pos.y - p.pos.y).abs() < POWERUP_PICKUP_RANGE
    }) else {
        return;
    };
    powerup.life = 0.0;
    let kind = powerup.kind;

    state.player.power = Some(kind);
    state.player.power_timer = kind.duration();
    state.emit(GameEvent::PowerupPickup { kind });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::dive::launch_dive;

    fn play_state(seed: u64) -> GameState {
        let mut state = GameState::new(seed);
        state.mode = GameMode::Play;
        state.tuning.powerup_drop_chance = 0.0;
        state
    }

    fn shoot_at(state: &mut GameState, id: EnemyId) {
        let pos = state.enemies[id.index()].pos;
        state.bullets.push(Bullet::new(pos, Vec2::new(0.0, -PLAYER_BULLET_SPEED)));
        resolve_hits(state);
    }

    /// Launch boss 0's dive and return (boss, escorts)
    fn boss_dive(state: &mut GameState) -> (EnemyId, Vec<EnemyId>) {
        let boss = state.enemies.iter().find(|e| e.boss_slot == Some(0)).unwrap().id;
        assert!(launch_dive(state, boss));
        let escorts = state.escort_groups[0].escorts.clone();
        assert_eq!(escorts.len(), 2);
        (boss, escorts)
    }

    #[test]
    fn test_bullet_hitbox() {
        let enemy = Enemy::new(EnemyId(0), 2, EnemyKind::Purple, Vec2::new(100.0, 100.0), 0.0);
        let at = |x, y| Bullet::new(Vec2::new(x, y), Vec2::ZERO);
        assert!(bullet_hits_enemy(&enemy, &at(100.0, 100.0)));
        assert!(bullet_hits_enemy(&enemy, &at(116.5, 100.0)));
        assert!(!bullet_hits_enemy(&enemy, &at(117.0, 100.0)));
        assert!(!bullet_hits_enemy(&enemy, &at(100.0, 83.0)));
    }

    #[test]
    fn test_player_proximity() {
        let player = Vec2::new(240.0, 570.0);
        assert!(bullet_hits_player(player, &Bullet::new(Vec2::new(249.0, 559.0), Vec2::ZERO)));
        assert!(!bullet_hits_player(player, &Bullet::new(Vec2::new(250.0, 570.0), Vec2::ZERO)));
        assert!(!bullet_hits_player(player, &Bullet::new(Vec2::new(240.0, 582.0), Vec2::ZERO)));
    }

    #[test]
    fn test_formation_kill_scores_formation_value() {
        let mut state = play_state(1);
        let id = EnemyId(30);
        shoot_at(&mut state, id);
        assert!(!state.enemies[30].alive);
        assert_eq!(state.score, EnemyKind::Blue.formation_value());
        assert_eq!(state.bullets[0].pos.y, SPENT_PLAYER_BULLET_Y);
        assert_eq!(state.explosions.len(), 1);
        assert!(state.events.contains(&GameEvent::EnemyHit { kind: EnemyKind::Blue, points: 30 }));
    }

    #[test]
    fn test_diving_kill_scores_diving_value_and_retires_dive() {
        let mut state = play_state(2);
        let id = EnemyId(10);
        launch_dive(&mut state, id);
        shoot_at(&mut state, id);
        assert_eq!(state.score, EnemyKind::Purple.diving_value());
        assert!(!state.enemies[10].diving);
        assert!(state.dives.iter().all(|d| d.done));
    }

    #[test]
    fn test_spent_bullet_cannot_score_twice() {
        let mut state = play_state(3);
        // Park two enemies on top of each other
        let pos = state.enemies[20].pos;
        state.enemies[21].pos = pos;
        state.bullets.push(Bullet::new(pos, Vec2::ZERO));
        resolve_hits(&mut state);
        assert_eq!(state.alive_enemy_count(), 35);
        assert_eq!(state.score, 30);
        // Second pass with the spent bullet changes nothing
        resolve_hits(&mut state);
        assert_eq!(state.alive_enemy_count(), 35);
    }

    #[test]
    fn test_escort_bonus_tiers() {
        let tuning = Tuning::default();
        assert_eq!(escort_bonus(&tuning, 0), 200);
        assert_eq!(escort_bonus(&tuning, 1), 300);
        assert_eq!(escort_bonus(&tuning, 2), 800);
    }

    #[test]
    fn test_escorts_first_pays_top_tier() {
        let mut state = play_state(40);
        let (boss, escorts) = boss_dive(&mut state);
        for &escort in &escorts {
            shoot_at(&mut state, escort);
        }
        let before = state.score;
        shoot_at(&mut state, boss);
        assert_eq!(state.score - before, 800);
        assert!(state.escort_groups.is_empty());
        assert_eq!(state.bonus_texts.len(), 1);
    }

    #[test]
    fn test_boss_first_pays_bottom_tier_and_scatters() {
        let mut state = play_state(41);
        let (boss, escorts) = boss_dive(&mut state);
        shoot_at(&mut state, boss);
        assert_eq!(state.score, 200);
        assert!(state.escort_groups.is_empty());

        for &escort in &escorts {
            let enemy = &state.enemies[escort.index()];
            assert!(enemy.alive);
            assert!(enemy.scattering);
            assert!(enemy.diving);
            assert!(!enemy.is_dive_candidate());
            assert_eq!(enemy.escort_group, None);
        }
    }

    #[test]
    fn test_one_escort_down_pays_middle_tier() {
        let mut state = play_state(42);
        let (boss, escorts) = boss_dive(&mut state);
        shoot_at(&mut state, escorts[1]);
        let before = state.score;
        shoot_at(&mut state, boss);
        assert_eq!(state.score - before, 300);
        assert!(state.enemies[escorts[0].index()].scattering);
        assert!(!state.enemies[escorts[1].index()].scattering);
    }

    #[test]
    fn test_bonus_tiers_beat_plain_diving_value() {
        let tuning = Tuning::default();
        let plain = EnemyKind::Boss.diving_value();
        assert!(escort_bonus(&tuning, 2) > escort_bonus(&tuning, 0));
        assert!(escort_bonus(&tuning, 0) > plain);
    }

    #[test]
    fn test_lone_diving_boss_scores_plain_value() {
        let mut state = play_state(43);
        for enemy in state.enemies.iter_mut().filter(|e| e.kind == EnemyKind::Red) {
            enemy.alive = false;
        }
        let boss = state.enemies[0].id;
        launch_dive(&mut state, boss);
        shoot_at(&mut state, boss);
        assert_eq!(state.score, EnemyKind::Boss.diving_value());
        assert!(state.bonus_texts.is_empty());
    }

    #[test]
    fn test_parked_boss_ignores_escorts() {
        let mut state = play_state(44);
        shoot_at(&mut state, EnemyId(1));
        assert_eq!(state.score, EnemyKind::Boss.formation_value());
        assert!(state.enemies.iter().all(|e| !e.scattering));
    }

    #[test]
    fn test_shield_absorbs_hit() {
        let mut state = play_state(5);
        state.player.power = Some(PowerUpKind::Shield);
        state.player.power_timer = 3.0;
        let pos = state.player.pos;
        state.enemy_bullets.push(Bullet::new(pos, Vec2::ZERO));
        resolve_player_hits(&mut state);

        assert!(state.player.alive);
        assert_eq!(state.player.power, None);
        assert_eq!(state.lives, 3);
        assert_eq!(state.enemy_bullets[0].pos.y, SPENT_ENEMY_BULLET_Y);
        assert!(state.events.contains(&GameEvent::ShieldBlock));
    }

    #[test]
    fn test_invulnerable_player_is_not_hit() {
        let mut state = play_state(6);
        state.player.invuln = 0.5;
        let pos = state.player.pos;
        state.enemy_bullets.push(Bullet::new(pos, Vec2::ZERO));
        resolve_player_hits(&mut state);
        assert!(state.player.alive);
        assert_eq!(state.enemy_bullets[0].pos, pos);
    }

    #[test]
    fn test_bullet_kills_player() {
        let mut state = play_state(7);
        let pos = state.player.pos;
        state.enemy_bullets.push(Bullet::new(pos, Vec2::ZERO));
        state.enemy_bullets.push(Bullet::new(pos, Vec2::ZERO));
        resolve_player_hits(&mut state);
        assert!(!state.player.alive);
        assert_eq!(state.lives, 2);
        // Only the first bullet is spent
        assert_eq!(state.enemy_bullets[1].pos, pos);
        assert!(state.events.contains(&GameEvent::PlayerDeath));
    }

    #[test]
    fn test_powerup_drop_only_in_play() {
        let mut state = GameState::new(8);
        state.tuning.powerup_drop_chance = 1.0;
        shoot_at(&mut state, EnemyId(20));
        assert!(state.powerups.is_empty());

        state.mode = GameMode::Play;
        shoot_at(&mut state, EnemyId(21));
        assert_eq!(state.powerups.len(), 1);
    }

    #[test]
    fn test_powerup_pickup() {
        let mut state = play_state(9);
        let pos = state.player.pos + Vec2::new(5.0, -5.0);
        state.powerups.push(PowerUp {
            kind: PowerUpKind::Spread,
            pos,
            vy: POWERUP_FALL_SPEED,
            life: POWERUP_LIFETIME,
        });
        check_powerup_pickup(&mut state);
        assert_eq!(state.player.power, Some(PowerUpKind::Spread));
        assert_eq!(state.player.power_timer, PowerUpKind::Spread.duration());
        assert_eq!(state.powerups[0].life, 0.0);
        assert!(state.events.contains(&GameEvent::PowerupPickup { kind: PowerUpKind::Spread }));
    }
}
