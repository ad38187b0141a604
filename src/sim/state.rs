//! Game state and core simulation types
//!
//! `GameState` is the whole simulation context: every subsystem takes it by
//! `&mut` and nothing lives in globals, so tests can run any number of games
//! side by side and a renderer can snapshot it with `Clone` or serde.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::tuning::Tuning;

/// Session mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum GameMode {
    /// Demo loop waiting for credits
    #[default]
    Attract,
    /// Active game
    Play,
    /// Run ended, simulation frozen
    GameOver,
}

/// Enemy types, top row to bottom
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnemyKind {
    Boss,
    Red,
    Purple,
    Blue,
}

impl EnemyKind {
    /// Points for a kill while parked in formation
    pub fn formation_value(&self) -> u64 {
        match self {
            EnemyKind::Boss => 60,
            EnemyKind::Red => 50,
            EnemyKind::Purple => 40,
            EnemyKind::Blue => 30,
        }
    }

    /// Points for a kill mid-dive (no escort bonus)
    pub fn diving_value(&self) -> u64 {
        match self {
            EnemyKind::Boss => 150,
            EnemyKind::Red => 100,
            EnemyKind::Purple => 80,
            EnemyKind::Blue => 60,
        }
    }

    /// Base chance that a selected enemy of this kind actually dives
    pub fn dive_chance(&self) -> f32 {
        match self {
            EnemyKind::Boss => 0.42,
            EnemyKind::Red => 0.36,
            EnemyKind::Purple => 0.32,
            EnemyKind::Blue => 0.28,
        }
    }
}

/// Stable index of an enemy in the wave's arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EnemyId(pub u32);

impl EnemyId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// An enemy entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub id: EnemyId,
    pub row: u8,
    pub kind: EnemyKind,
    /// Formation anchor (before sway and bob)
    pub base: Vec2,
    pub pos: Vec2,
    pub alive: bool,
    pub diving: bool,
    /// Escort whose boss was shot: keeps flying but never fires or dives again
    pub scattering: bool,
    /// Bob phase offset (radians)
    pub phase: f32,
    pub formation_value: u64,
    pub diving_value: u64,
    pub dive_chance: f32,
    /// Escort group this enemy currently belongs to
    pub escort_group: Option<u32>,
    /// Boss slot this enemy is paired with as an escort
    pub escort_for: Option<u8>,
    /// Boss slot of a boss enemy
    pub boss_slot: Option<u8>,
}

impl Enemy {
    pub fn new(id: EnemyId, row: u8, kind: EnemyKind, base: Vec2, phase: f32) -> Self {
        Self {
            id,
            row,
            kind,
            base,
            pos: base,
            alive: true,
            diving: false,
            scattering: false,
            phase,
            formation_value: kind.formation_value(),
            diving_value: kind.diving_value(),
            dive_chance: kind.dive_chance(),
            escort_group: None,
            escort_for: None,
            boss_slot: None,
        }
    }

    /// Eligible for dive selection and formation fire
    pub fn is_dive_candidate(&self) -> bool {
        self.alive && !self.diving && !self.scattering
    }

    /// Points for killing this enemy right now, ignoring escort bonuses
    pub fn kill_value(&self) -> u64 {
        if self.diving {
            self.diving_value
        } else {
            self.formation_value
        }
    }
}

/// Dive path shapes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DivePattern {
    /// Single half-sine sweep
    Swoop,
    /// Full sine cycle (S-curve)
    Loop,
    /// Triple-frequency sine with damped amplitude
    Zig,
}

impl DivePattern {
    pub const ALL: [DivePattern; 3] = [DivePattern::Swoop, DivePattern::Loop, DivePattern::Zig];

    /// Lateral displacement as a fraction of the dive's curve at progress `u`
    ///
    /// Every shape starts and ends on the dive's centre line.
    pub fn lateral(&self, u: f32) -> f32 {
        use std::f32::consts::PI;
        if u <= 0.0 || u >= 1.0 {
            return 0.0;
        }
        match self {
            DivePattern::Swoop => (u * PI).sin(),
            DivePattern::Loop => (u * PI * 2.0).sin(),
            DivePattern::Zig => (u * PI * 3.0).sin() * ZIG_DAMPING,
        }
    }
}

/// A flight path owned by one diving enemy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dive {
    pub enemy: EnemyId,
    /// Seconds since launch; escorts start negative and hold position until 0
    pub elapsed: f32,
    pub duration: f32,
    pub start: Vec2,
    /// Signed lateral amplitude
    pub curve: f32,
    pub pattern: DivePattern,
    pub done: bool,
    /// Shots the diver still gets to fire on the way down
    pub shots: u8,
}

impl Dive {
    /// Normalized progress in [0, 1]
    pub fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        (self.elapsed / self.duration).clamp(0.0, 1.0)
    }

    /// Path position at normalized progress `u`
    pub fn position_at(&self, u: f32) -> Vec2 {
        let u = u.clamp(0.0, 1.0);
        Vec2::new(
            self.start.x + self.pattern.lateral(u) * self.curve,
            self.start.y + u * DIVE_DEPTH,
        )
    }

    pub fn is_complete(&self) -> bool {
        self.elapsed > self.duration
    }
}

/// A diving boss and the escorts pulled along with it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EscortGroup {
    pub id: u32,
    pub boss: EnemyId,
    pub escorts: Vec<EnemyId>,
}

/// A player or enemy bullet
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bullet {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
}

impl Bullet {
    pub fn new(pos: Vec2, vel: Vec2) -> Self {
        Self {
            pos,
            vel,
            radius: BULLET_RADIUS,
        }
    }
}

/// Power-up types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PowerUpKind {
    /// Shorter fire cooldown
    Rapid,
    /// Three-way shot
    Spread,
    /// Absorbs one enemy bullet
    Shield,
}

impl PowerUpKind {
    pub const ALL: [PowerUpKind; 3] = [PowerUpKind::Rapid, PowerUpKind::Spread, PowerUpKind::Shield];

    /// Seconds the power-up stays active once collected
    pub fn duration(&self) -> f32 {
        match self {
            PowerUpKind::Rapid => 7.0,
            PowerUpKind::Spread => 8.0,
            PowerUpKind::Shield => 6.0,
        }
    }
}

/// A falling power-up capsule
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerUp {
    pub kind: PowerUpKind,
    pub pos: Vec2,
    pub vy: f32,
    pub life: f32,
}

/// The player's ship
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    pub speed: f32,
    pub cooldown: f32,
    pub invuln: f32,
    pub alive: bool,
    pub power: Option<PowerUpKind>,
    pub power_timer: f32,
}

impl Player {
    pub fn new(speed: f32) -> Self {
        Self {
            pos: Vec2::new(crate::center_x(), PLAYER_Y),
            speed,
            cooldown: 0.0,
            invuln: 0.0,
            alive: true,
            power: None,
            power_timer: 0.0,
        }
    }

    /// Seconds between shots with the current power-up
    pub fn fire_cooldown(&self) -> f32 {
        match self.power {
            Some(PowerUpKind::Rapid) => 0.15,
            Some(PowerUpKind::Spread) => 0.35,
            _ => 0.3,
        }
    }

    pub fn clear_power(&mut self) {
        self.power = None;
        self.power_timer = 0.0;
    }
}

/// Expanding explosion ring (visual only)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Explosion {
    pub pos: Vec2,
    pub life: f32,
    pub radius: f32,
}

/// Floating score text for escort bonuses (visual only)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BonusText {
    pub pos: Vec2,
    pub value: u64,
    pub life: f32,
}

/// Shared sway oscillator driving every parked enemy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Formation {
    /// Triangle-wave phase in [-SWAY_LIMIT, SWAY_LIMIT] (plus one step of overshoot)
    pub sway: f32,
    /// +1.0 or -1.0
    pub dir: f32,
    /// Horizontal offset applied to all anchors
    pub offset_x: f32,
}

impl Default for Formation {
    fn default() -> Self {
        Self {
            sway: 0.0,
            dir: 1.0,
            offset_x: 0.0,
        }
    }
}

/// Held input intents
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Controls {
    pub left: bool,
    pub right: bool,
    pub fire: bool,
}

/// Discrete input intents from the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    MoveLeft(bool),
    MoveRight(bool),
    Fire(bool),
    InsertCoin,
    StartOrContinue,
}

/// One-shot signals for the audio/effects collaborators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    Shoot,
    EnemyShoot,
    EnemyHit { kind: EnemyKind, points: u64 },
    PlayerDeath,
    ShieldBlock,
    WaveClear { wave: u32 },
    ExtraLife,
    PowerupPickup { kind: PowerUpKind },
    CoinInsert,
    GameStart,
    GameOver,
}

/// Deferred session actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimedAction {
    /// Respawn the player, or end the run if no lives remain
    ResolveDeath,
}

/// An action due at a point on the simulation clock
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduledAction {
    pub due: f64,
    /// Session epoch the action was scheduled in; stale epochs are dropped
    pub epoch: u32,
    pub action: TimedAction,
}

/// Sprite animation timers for the renderer
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnimClock {
    /// Cycles 0..1 for blinking prompts
    pub blink: f32,
    /// Wing-flap frame (0 or 1)
    pub frame: u8,
    timer: f32,
}

impl AnimClock {
    pub fn advance(&mut self, dt: f32) {
        self.blink += dt;
        if self.blink > 1.0 {
            self.blink = 0.0;
        }
        self.timer += dt;
        if self.timer > 0.3 {
            self.timer = 0.0;
            self.frame = (self.frame + 1) % 2;
        }
    }
}

/// Complete game state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Seed the RNG was created from
    pub seed: u64,
    /// Serialized with its stream position
    pub rng: Pcg32,
    pub tuning: Tuning,
    /// Simulation clock (seconds)
    pub time: f64,

    // === Session ===
    pub mode: GameMode,
    pub score: u64,
    pub high_score: u64,
    pub lives: u8,
    /// Current wave (1-based)
    pub wave: u32,
    pub credits: u32,
    /// Seconds until the next dive/fire attempt
    pub next_dive: f32,
    /// Bumped on every game start; invalidates pending timed actions
    pub epoch: u32,
    pub timers: Vec<ScheduledAction>,

    // === Entities ===
    pub formation: Formation,
    pub player: Player,
    pub controls: Controls,
    /// Enemy arena, indexed by `EnemyId`
    pub enemies: Vec<Enemy>,
    pub dives: Vec<Dive>,
    pub escort_groups: Vec<EscortGroup>,
    pub bullets: Vec<Bullet>,
    pub enemy_bullets: Vec<Bullet>,
    pub powerups: Vec<PowerUp>,
    pub explosions: Vec<Explosion>,
    pub bonus_texts: Vec<BonusText>,
    pub anim: AnimClock,

    /// Events since the last drain
    #[serde(skip)]
    pub events: Vec<GameEvent>,
    next_group_id: u32,
}

impl GameState {
    /// Create a new game in attract mode with default tuning
    pub fn new(seed: u64) -> Self {
        Self::with_tuning(seed, Tuning::default())
    }

    pub fn with_tuning(seed: u64, tuning: Tuning) -> Self {
        let mut state = Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            time: 0.0,
            mode: GameMode::Attract,
            score: 0,
            high_score: 0,
            lives: tuning.starting_lives,
            wave: 1,
            credits: 0,
            next_dive: tuning.dive_interval_base,
            epoch: 0,
            timers: Vec::new(),
            formation: Formation::default(),
            player: Player::new(tuning.player_speed),
            controls: Controls::default(),
            enemies: Vec::new(),
            dives: Vec::new(),
            escort_groups: Vec::new(),
            bullets: Vec::new(),
            enemy_bullets: Vec::new(),
            powerups: Vec::new(),
            explosions: Vec::new(),
            bonus_texts: Vec::new(),
            anim: AnimClock::default(),
            events: Vec::new(),
            next_group_id: 1,
            tuning,
        };

        // Attract mode shows a parked formation
        super::formation::generate_formation(&mut state);

        state
    }

    pub fn enemy(&self, id: EnemyId) -> Option<&Enemy> {
        self.enemies.get(id.index())
    }

    pub fn enemy_mut(&mut self, id: EnemyId) -> Option<&mut Enemy> {
        self.enemies.get_mut(id.index())
    }

    pub fn alive_enemy_count(&self) -> usize {
        self.enemies.iter().filter(|e| e.alive).count()
    }

    /// Allocate a new escort group ID
    pub fn next_group_id(&mut self) -> u32 {
        let id = self.next_group_id;
        self.next_group_id += 1;
        id
    }

    pub fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Hand queued events to the audio/effects collaborator
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Award points and track the high score
    pub fn add_score(&mut self, points: u64) {
        self.score += points;
        if self.score > self.high_score {
            self.high_score = self.score;
        }
    }

    pub fn spawn_explosion(&mut self, pos: Vec2, life: f32, radius: f32) {
        self.explosions.push(Explosion { pos, life, radius });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_is_attract_with_full_formation() {
        let state = GameState::new(7);
        assert_eq!(state.mode, GameMode::Attract);
        assert_eq!(state.enemies.len(), 36);
        assert_eq!(state.alive_enemy_count(), 36);
        assert_eq!(state.credits, 0);
        assert!(state.dives.is_empty());
        // Arena ids match slots
        for (i, enemy) in state.enemies.iter().enumerate() {
            assert_eq!(enemy.id.index(), i);
        }
    }

    #[test]
    fn test_kill_value_depends_on_diving() {
        let mut enemy = Enemy::new(EnemyId(0), 1, EnemyKind::Red, Vec2::new(100.0, 100.0), 0.0);
        assert_eq!(enemy.kill_value(), 50);
        enemy.diving = true;
        assert_eq!(enemy.kill_value(), 100);
    }

    #[test]
    fn test_dive_candidate_excludes_scattering() {
        let mut enemy = Enemy::new(EnemyId(0), 1, EnemyKind::Red, Vec2::ZERO, 0.0);
        assert!(enemy.is_dive_candidate());
        enemy.scattering = true;
        assert!(!enemy.is_dive_candidate());
        enemy.scattering = false;
        enemy.alive = false;
        assert!(!enemy.is_dive_candidate());
    }

    #[test]
    fn test_high_score_tracks_score() {
        let mut state = GameState::new(1);
        state.add_score(120);
        assert_eq!(state.high_score, 120);
        state.score = 0;
        state.add_score(50);
        assert_eq!(state.high_score, 120);
    }

    #[test]
    fn test_drain_events_empties_queue() {
        let mut state = GameState::new(1);
        state.emit(GameEvent::Shoot);
        state.emit(GameEvent::CoinInsert);
        assert_eq!(state.drain_events(), vec![GameEvent::Shoot, GameEvent::CoinInsert]);
        assert!(state.drain_events().is_empty());
    }

    #[test]
    fn test_snapshot_restore_replays_identically() {
        use crate::sim::tick::tick;

        let mut original = GameState::new(4242);
        original.insert_coin();
        original.start_game();
        original.apply_intent(Intent::Fire(true));
        for _ in 0..200 {
            tick(&mut original, MAX_FRAME_DT);
        }

        let snapshot = serde_json::to_string(&original).expect("serialize");
        let mut restored: GameState = serde_json::from_str(&snapshot).expect("deserialize");
        for _ in 0..600 {
            tick(&mut original, MAX_FRAME_DT);
            tick(&mut restored, MAX_FRAME_DT);
        }

        assert_eq!(original.score, restored.score);
        assert_eq!(
            serde_json::to_string(&original).expect("serialize"),
            serde_json::to_string(&restored).expect("serialize")
        );
    }

    #[test]
    fn test_player_cooldown_by_power() {
        let mut player = Player::new(210.0);
        assert_eq!(player.fire_cooldown(), 0.3);
        player.power = Some(PowerUpKind::Rapid);
        assert_eq!(player.fire_cooldown(), 0.15);
        player.power = Some(PowerUpKind::Spread);
        assert_eq!(player.fire_cooldown(), 0.35);
    }
}
