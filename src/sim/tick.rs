//! Per-frame simulation tick
//!
//! Advances the game state by one clamped time step. Order within a play
//! tick: player, formation, dives, bullets, power-ups, enemy attacks,
//! collisions, pickups, wave check, timed actions.

use glam::Vec2;

use super::collision::{check_powerup_pickup, resolve_hits, resolve_player_hits};
use super::dive::{schedule_attacks, update_dives};
use super::formation::update_formation;
use super::session::{check_wave_clear, run_timers};
use super::state::{Bullet, GameEvent, GameMode, GameState, PowerUpKind};
use crate::consts::*;

/// Advance the game state by `dt` seconds (clamped to `MAX_FRAME_DT`)
pub fn tick(state: &mut GameState, dt: f32) {
    let dt = if dt.is_finite() { dt.clamp(0.0, MAX_FRAME_DT) } else { 0.0 };

    state.time += dt as f64;
    state.anim.advance(dt);
    update_explosions(state, dt);
    update_bonus_texts(state, dt);

    match state.mode {
        // Frozen apart from effects
        GameMode::GameOver => {}
        GameMode::Attract => {
            update_formation(state, dt);
            update_dives(state, dt);
            update_powerups(state, dt);
        }
        GameMode::Play => {
            update_player(state, dt);
            update_formation(state, dt);
            update_dives(state, dt);
            update_bullets(state, dt);
            update_powerups(state, dt);
            schedule_attacks(state, dt);
            resolve_hits(state);
            resolve_player_hits(state);
            check_powerup_pickup(state);
            check_wave_clear(state);
            run_timers(state);
        }
    }
}

/// Move, cool down and fire
fn update_player(state: &mut GameState, dt: f32) {
    let controls = state.controls;
    let player = &mut state.player;
    if !player.alive {
        return;
    }

    if controls.left {
        player.pos.x -= player.speed * dt;
    }
    if controls.right {
        player.pos.x += player.speed * dt;
    }
    player.pos.x = player.pos.x.clamp(PLAYER_MARGIN, SCREEN_WIDTH - PLAYER_MARGIN);

    player.cooldown = (player.cooldown - dt).max(0.0);
    player.invuln = (player.invuln - dt).max(0.0);
    if player.power_timer > 0.0 {
        player.power_timer = (player.power_timer - dt).max(0.0);
        if player.power_timer == 0.0 {
            player.clear_power();
        }
    }

    if !controls.fire || player.cooldown > 0.0 {
        return;
    }
    player.cooldown = player.fire_cooldown();
    let muzzle = player.pos - Vec2::new(0.0, 12.0);

    if player.power == Some(PowerUpKind::Spread) {
        for vx in [-SPREAD_BULLET_VX, 0.0, SPREAD_BULLET_VX] {
            state
                .bullets
                .push(Bullet::new(muzzle, Vec2::new(vx, -SPREAD_BULLET_SPEED)));
        }
    } else {
        state
            .bullets
            .push(Bullet::new(muzzle, Vec2::new(0.0, -PLAYER_BULLET_SPEED)));
    }
    state.emit(GameEvent::Shoot);
}

/// Drop off-stage bullets, then move the rest
fn update_bullets(state: &mut GameState, dt: f32) {
    state
        .bullets
        .retain(|b| b.pos.y > -10.0 && b.pos.x > -10.0 && b.pos.x < SCREEN_WIDTH + 10.0);
    state.enemy_bullets.retain(|b| b.pos.y < SCREEN_HEIGHT + 20.0);

    for bullet in state.bullets.iter_mut().chain(state.enemy_bullets.iter_mut()) {
        bullet.pos += bullet.vel * dt;
    }
}

fn update_powerups(state: &mut GameState, dt: f32) {
    state
        .powerups
        .retain(|p| p.pos.y < SCREEN_HEIGHT + 20.0 && p.life > 0.0);
    for powerup in state.powerups.iter_mut() {
        powerup.pos.y += powerup.vy * dt;
        powerup.life -= dt;
    }
}

fn update_explosions(state: &mut GameState, dt: f32) {
    state.explosions.retain(|e| e.life > 0.0);
    for explosion in state.explosions.iter_mut() {
        explosion.life -= dt;
        explosion.radius += dt * 60.0;
    }
}

fn update_bonus_texts(state: &mut GameState, dt: f32) {
    state.bonus_texts.retain(|t| t.life > 0.0);
    for text in state.bonus_texts.iter_mut() {
        text.pos.y -= 30.0 * dt;
        text.life -= dt;
    }
}
