//! Frame timing
//!
//! Converts the host's frame timestamps (milliseconds, as handed out by a
//! display-refresh callback) into one clamped simulation step per frame.

use crate::consts::MAX_FRAME_DT;
use crate::sim::{GameEvent, GameState, Intent, tick};

/// Tracks the previous frame timestamp
#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    last_ms: Option<f64>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seconds to simulate for a frame stamped `timestamp_ms`
    ///
    /// The first frame, a non-finite stamp and a backwards jump all yield 0.
    pub fn delta(&mut self, timestamp_ms: f64) -> f32 {
        if !timestamp_ms.is_finite() {
            return 0.0;
        }
        let Some(last) = self.last_ms.replace(timestamp_ms) else {
            return 0.0;
        };
        let gap = (timestamp_ms - last) / 1000.0;
        if !gap.is_finite() || gap < 0.0 {
            return 0.0;
        }
        (gap as f32).min(MAX_FRAME_DT)
    }

    /// Forget the previous frame (e.g. after the host was suspended)
    pub fn reset(&mut self) {
        self.last_ms = None;
    }
}

/// Game state plus its frame clock: one tick per rendered frame
#[derive(Debug, Clone)]
pub struct FrameDriver {
    pub state: GameState,
    clock: FrameClock,
}

impl FrameDriver {
    pub fn new(state: GameState) -> Self {
        Self {
            state,
            clock: FrameClock::new(),
        }
    }

    pub fn apply(&mut self, intent: Intent) {
        self.state.apply_intent(intent);
    }

    /// Run the tick for one frame and hand back the events it raised
    pub fn frame(&mut self, timestamp_ms: f64) -> Vec<GameEvent> {
        let dt = self.clock.delta(timestamp_ms);
        tick(&mut self.state, dt);
        self.state.drain_events()
    }
}
