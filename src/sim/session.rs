//! Session flow: credits, game start, deaths, waves
//!
//! Mode machine: Attract -> Play -> GameOver -> Play (with a credit).
//! Delayed decisions go through the timed-action queue on the simulation
//! clock; an action scheduled in an earlier session epoch is dropped.

use super::formation::generate_formation;
use super::state::{Controls, GameEvent, GameMode, GameState, Intent, Player, ScheduledAction, TimedAction};
use crate::consts::*;

impl GameState {
    /// Feed one input intent into the simulation
    ///
    /// Movement and fire are ignored outside play; start is ignored during play.
    pub fn apply_intent(&mut self, intent: Intent) {
        match intent {
            Intent::MoveLeft(active) => {
                if self.mode == GameMode::Play {
                    self.controls.left = active;
                }
            }
            Intent::MoveRight(active) => {
                if self.mode == GameMode::Play {
                    self.controls.right = active;
                }
            }
            Intent::Fire(active) => {
                if self.mode == GameMode::Play {
                    self.controls.fire = active;
                }
            }
            Intent::InsertCoin => self.insert_coin(),
            Intent::StartOrContinue => {
                if self.mode != GameMode::Play {
                    self.start_game();
                }
            }
        }
    }

    pub fn insert_coin(&mut self) {
        self.credits = (self.credits + 1).min(MAX_CREDITS);
        self.emit(GameEvent::CoinInsert);
    }

    /// Spend a credit and begin a fresh run
    ///
    /// Returns false (and changes nothing) without credits.
    pub fn start_game(&mut self) -> bool {
        if self.credits == 0 {
            return false;
        }
        self.credits -= 1;
        self.score = 0;
        self.lives = self.tuning.starting_lives;
        self.wave = 1;
        self.player = Player::new(self.tuning.player_speed);
        self.controls = Controls::default();

        self.bullets.clear();
        self.enemy_bullets.clear();
        self.powerups.clear();
        self.bonus_texts.clear();
        self.timers.clear();
        self.epoch = self.epoch.wrapping_add(1);

        self.mode = GameMode::Play;
        generate_formation(self);
        self.emit(GameEvent::GameStart);
        log::info!("Game started ({} credits left)", self.credits);
        true
    }

    /// Queue an action `delay` seconds from now in the current epoch
    pub fn schedule(&mut self, delay: f32, action: TimedAction) {
        self.timers.push(ScheduledAction {
            due: self.time + delay as f64,
            epoch: self.epoch,
            action,
        });
    }
}

/// Lose a life and schedule the respawn/game-over decision
pub fn kill_player(state: &mut GameState) {
    if !state.player.alive {
        return;
    }
    state.lives = state.lives.saturating_sub(1);
    state.player.alive = false;
    state.player.invuln = state.tuning.respawn_invuln;
    let pos = state.player.pos;
    state.spawn_explosion(pos, 0.5, 6.0);
    state.emit(GameEvent::PlayerDeath);
    log::debug!("Player down, {} lives left", state.lives);

    let delay = state.tuning.respawn_delay;
    state.schedule(delay, TimedAction::ResolveDeath);
}

/// Fire every due action; stale ones are dropped
pub fn run_timers(state: &mut GameState) {
    let now = state.time;
    let (due, pending): (Vec<_>, Vec<_>) = state.timers.drain(..).partition(|t| t.due <= now);
    state.timers = pending;

    for scheduled in due {
        if scheduled.epoch != state.epoch || state.mode != GameMode::Play {
            log::debug!("Dropping stale {:?}", scheduled.action);
            continue;
        }
        match scheduled.action {
            TimedAction::ResolveDeath => resolve_death(state),
        }
    }
}

/// Respawn at the centre, or end the run when no lives remain
fn resolve_death(state: &mut GameState) {
    if state.lives == 0 {
        state.mode = GameMode::GameOver;
        state.controls = Controls::default();
        state.emit(GameEvent::GameOver);
        log::info!("Game over on wave {} with {} points", state.wave, state.score);
        return;
    }
    state.player.alive = true;
    state.player.pos.x = crate::center_x();
    state.player.invuln = state.tuning.respawn_invuln;
}

/// Advance to the next wave once every enemy is down
pub fn check_wave_clear(state: &mut GameState) {
    if state.mode != GameMode::Play || state.alive_enemy_count() > 0 {
        return;
    }
    state.wave += 1;
    if state.lives < state.tuning.life_cap {
        state.lives += 1;
        state.emit(GameEvent::ExtraLife);
    }
    state.emit(GameEvent::WaveClear { wave: state.wave });
    generate_formation(state);
}
