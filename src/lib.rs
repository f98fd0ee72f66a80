//! hedron: minimal real-time 3D rendering demo engine.
//!
//! Core pieces:
//! - [`object::RenderableObject`] owns GPU vertex/index buffers and a
//!   transform, and executes the bind → draw → unbind protocol against a
//!   [`device::GraphicsDevice`].
//! - [`scheduler::FrameScheduler`] advances animation state and renders the
//!   object collection once per display refresh, with an explicit
//!   start/stop lifecycle.
//!
//! The production device is wgpu-backed ([`device::WgpuDevice`]); the
//! [`window`] runtime wires it to a winit event loop. See `src/main.rs` for
//! the spinning-cube demo.

pub mod device;
pub mod error;
pub mod geometry;
pub mod logging;
pub mod object;
pub mod scheduler;
pub mod solids;
pub mod time;
pub mod transform;
pub mod window;
