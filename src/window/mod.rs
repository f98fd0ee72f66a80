//! Window + runtime loop.
//!
//! Owns the `winit` EventLoop and Window, wires them to the GPU layer, and
//! drives the frame scheduler from `RedrawRequested` events.

mod runtime;

pub use runtime::{Runtime, RuntimeConfig};
