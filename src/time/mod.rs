//! Frame timing.
//!
//! One [`FrameClock`] per scheduler; `tick()` once per presented frame
//! produces a clamped delta-time snapshot.

mod frame_clock;

pub use frame_clock::{FrameClock, FrameTime};
