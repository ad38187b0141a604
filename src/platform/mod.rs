//! Platform abstraction layer
//!
//! Host-side pieces that sit between a frame source and the simulation:
//! - Frame timestamps to clamped time steps
//! - Demo autopilot producing input intents

pub mod autopilot;
pub mod clock;

pub use autopilot::Autopilot;
pub use clock::{FrameClock, FrameDriver};
