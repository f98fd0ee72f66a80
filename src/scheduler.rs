//! Frame scheduler: owns the renderable collection, the animation clock, and
//! the run/stop lifecycle.
//!
//! The scheduler does not register callbacks with the host itself; the
//! windowing runtime calls [`FrameScheduler::tick`] once per display refresh
//! and re-requests a redraw while [`FrameScheduler::is_running`] holds. That
//! keeps cancellation observable: once `stop()` returns, a tick performs no
//! work, because scheduling and execution share the event-loop thread.

use crate::device::GraphicsDevice;
use crate::object::RenderableObject;
use crate::time::FrameClock;
use crate::transform::Transform;

/// Recomputes an object's transform from the accumulated animation time.
pub type Animator = Box<dyn FnMut(f32) -> Transform>;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum State {
    Stopped,
    Running,
}

/// Outcome of one tick.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct TickReport {
    /// Objects rendered this tick.
    pub rendered: usize,
    /// Objects whose render failed and was skipped for this tick only.
    pub skipped: usize,
}

struct Entry {
    object: RenderableObject,
    animate: Option<Animator>,
}

/// Drives repeated rendering of a flat collection of objects.
pub struct FrameScheduler {
    entries: Vec<Entry>,
    clock: FrameClock,
    elapsed: f32,
    state: State,
}

impl FrameScheduler {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            clock: FrameClock::new(),
            elapsed: 0.0,
            state: State::Stopped,
        }
    }

    /// Adds an object with a fixed transform.
    pub fn add(&mut self, object: RenderableObject) {
        self.entries.push(Entry {
            object,
            animate: None,
        });
    }

    /// Adds an object whose transform is recomputed every tick.
    pub fn add_animated(
        &mut self,
        object: RenderableObject,
        animate: impl FnMut(f32) -> Transform + 'static,
    ) {
        self.entries.push(Entry {
            object,
            animate: Some(Box::new(animate)),
        });
    }

    pub fn object_count(&self) -> usize {
        self.entries.len()
    }

    /// Seconds of animation time accumulated while running.
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn is_running(&self) -> bool {
        self.state == State::Running
    }

    /// Transitions `Stopped → Running`. Returns `false` (benign state
    /// mismatch, logged) when already running.
    pub fn start(&mut self) -> bool {
        if self.state == State::Running {
            log::warn!("start() while already running; ignored");
            return false;
        }
        self.state = State::Running;
        self.clock.reset();
        log::debug!("scheduler started with {} object(s)", self.entries.len());
        true
    }

    /// Transitions `Running → Stopped`. Once this returns, no further tick
    /// performs any work. Returns `false` (benign, logged) when already
    /// stopped.
    pub fn stop(&mut self) -> bool {
        if self.state == State::Stopped {
            log::warn!("stop() while already stopped; ignored");
            return false;
        }
        self.state = State::Stopped;
        log::debug!("scheduler stopped after {:.2}s", self.elapsed);
        true
    }

    /// Runs one display-refresh tick: clear, advance time, animate, render.
    ///
    /// A render failure is logged and skips that object for this tick only;
    /// the remaining objects still render and the loop continues. On a
    /// stopped scheduler this is a no-op returning an empty report.
    pub fn tick<D: GraphicsDevice + ?Sized>(&mut self, device: &mut D) -> TickReport {
        if self.state != State::Running {
            return TickReport::default();
        }

        let mut report = TickReport::default();

        if let Err(err) = device.clear_frame() {
            // A failed clear leaves stale pixels but the tick can proceed.
            log::error!("framebuffer clear failed: {err}");
        }

        let ft = self.clock.tick();
        self.elapsed += ft.dt;

        for entry in &mut self.entries {
            if let Some(animate) = &mut entry.animate {
                *entry.object.transform_mut() = animate(self.elapsed);
            }
            match entry.object.render(device) {
                Ok(()) => report.rendered += 1,
                Err(err) => {
                    log::error!("render failed, skipping object for this tick: {err}");
                    report.skipped += 1;
                }
            }
        }

        report
    }
}

impl Default for FrameScheduler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::recording::RecordingDevice;
    use crate::device::ShaderSources;
    use crate::solids;

    fn sources() -> ShaderSources<'static> {
        ShaderSources {
            vertex: "@vertex fn vs_main() {}",
            fragment: "@fragment fn fs_main() {}",
        }
    }

    fn cube(device: &mut RecordingDevice) -> RenderableObject {
        RenderableObject::create(device, &sources(), &solids::CUBE_POSITIONS, &solids::CUBE_INDICES)
            .unwrap()
    }

    #[test]
    fn tick_clears_then_renders_each_object() {
        let mut device = RecordingDevice::new();
        let mut scheduler = FrameScheduler::new();
        scheduler.add(cube(&mut device));
        scheduler.add(cube(&mut device));
        assert!(scheduler.start());
        device.clear_ops();

        let report = scheduler.tick(&mut device);
        assert_eq!(report, TickReport { rendered: 2, skipped: 0 });
        assert_eq!(device.clear_count(), 1);
        assert_eq!(device.draw_count(), 2);
        assert!(device.bindings_clear());
    }

    #[test]
    fn tick_before_start_does_nothing() {
        let mut device = RecordingDevice::new();
        let mut scheduler = FrameScheduler::new();
        scheduler.add(cube(&mut device));
        device.clear_ops();

        let report = scheduler.tick(&mut device);
        assert_eq!(report, TickReport::default());
        assert!(device.ops().is_empty());
    }

    #[test]
    fn no_tick_does_work_after_stop() {
        let mut device = RecordingDevice::new();
        let mut scheduler = FrameScheduler::new();
        scheduler.add(cube(&mut device));
        assert!(scheduler.start());
        scheduler.tick(&mut device);
        assert!(scheduler.stop());
        device.clear_ops();

        let report = scheduler.tick(&mut device);
        assert_eq!(report, TickReport::default());
        assert_eq!(device.draw_count(), 0);
        assert!(device.ops().is_empty());
    }

    #[test]
    fn redundant_start_and_stop_are_benign() {
        let mut scheduler = FrameScheduler::new();
        assert!(!scheduler.stop());
        assert!(scheduler.start());
        assert!(!scheduler.start());
        assert!(scheduler.is_running());
        assert!(scheduler.stop());
        assert!(!scheduler.stop());
        assert!(!scheduler.is_running());
    }

    #[test]
    fn one_failing_object_does_not_halt_the_tick() {
        let mut device = RecordingDevice::new();
        let mut scheduler = FrameScheduler::new();
        scheduler.add(cube(&mut device));
        scheduler.add(cube(&mut device));
        scheduler.start();

        device.fail_next_draw("transient device error");
        let report = scheduler.tick(&mut device);
        assert_eq!(report, TickReport { rendered: 1, skipped: 1 });
        assert!(device.bindings_clear());

        // Next tick: the failure was for one tick only.
        let report = scheduler.tick(&mut device);
        assert_eq!(report, TickReport { rendered: 2, skipped: 0 });
    }

    #[test]
    fn animator_drives_the_transform() {
        let mut device = RecordingDevice::new();
        let mut scheduler = FrameScheduler::new();
        let object = cube(&mut device);
        scheduler.add_animated(object, |t| {
            Transform::new(
                glam::Mat4::IDENTITY,
                glam::Mat4::from_translation(glam::Vec3::new(t, 0.0, 0.0)),
            )
        });
        scheduler.start();

        scheduler.tick(&mut device);
        let elapsed = scheduler.elapsed();
        assert!(elapsed > 0.0);
    }

    #[test]
    fn elapsed_accumulates_across_ticks() {
        let mut device = RecordingDevice::new();
        let mut scheduler = FrameScheduler::new();
        scheduler.start();
        scheduler.tick(&mut device);
        let first = scheduler.elapsed();
        scheduler.tick(&mut device);
        assert!(scheduler.elapsed() > first);
    }
}
