use anyhow::{Context, Result};
use ouroboros::self_referencing;

use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::device::{GpuInit, SurfaceErrorAction, WgpuDevice};
use crate::scheduler::FrameScheduler;

/// Window/runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "hedron".to_string(),
            initial_size: LogicalSize::new(1280.0, 720.0),
        }
    }
}

/// Builds the scene once the window and device exist.
type SceneBuilder = Box<dyn FnOnce(&mut WgpuDevice<'_>) -> Result<FrameScheduler>>;

/// Entry point for the runtime.
///
/// Creates the window and GPU device, invokes the scene builder, starts the
/// returned scheduler, and ticks it once per `RedrawRequested` until it stops
/// or the window closes.
pub struct Runtime;

impl Runtime {
    pub fn run<F>(config: RuntimeConfig, gpu_init: GpuInit, build: F) -> Result<()>
    where
        F: FnOnce(&mut WgpuDevice<'_>) -> Result<FrameScheduler> + 'static,
    {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut state = AppState {
            config,
            gpu_init,
            build: Some(Box::new(build)),
            entry: None,
            scheduler: None,
        };

        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        Ok(())
    }
}

#[self_referencing]
struct WindowEntry {
    window: Window,

    #[borrows(window)]
    #[covariant]
    device: WgpuDevice<'this>,
}

struct AppState {
    config: RuntimeConfig,
    gpu_init: GpuInit,
    build: Option<SceneBuilder>,

    entry: Option<WindowEntry>,
    scheduler: Option<FrameScheduler>,
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.entry.is_some() {
            return;
        }

        event_loop.set_control_flow(ControlFlow::Wait);

        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(self.config.initial_size);

        let window = match event_loop.create_window(attrs) {
            Ok(w) => w,
            Err(e) => {
                log::error!("failed to create window: {e}");
                event_loop.exit();
                return;
            }
        };

        let gpu_init = self.gpu_init.clone();
        let entry = WindowEntryBuilder {
            window,
            device_builder: |w| {
                pollster::block_on(WgpuDevice::new(w, gpu_init))
                    .expect("GPU initialization failed for window")
            },
        }
        .build();
        self.entry = Some(entry);

        // Build the scene against the live device, then start ticking.
        let build = self.build.take();
        let entry = self.entry.as_mut().expect("entry was just created");
        if let Some(build) = build {
            match entry.with_device_mut(|device| build(device)) {
                Ok(mut scheduler) => {
                    scheduler.start();
                    self.scheduler = Some(scheduler);
                }
                Err(e) => {
                    log::error!("scene setup failed: {e:#}");
                    event_loop.exit();
                    return;
                }
            }
        }

        entry.with_window(|w| w.request_redraw());
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(entry) = self.entry.as_mut() else {
            return;
        };

        match event {
            WindowEvent::CloseRequested => {
                if let Some(scheduler) = self.scheduler.as_mut()
                    && scheduler.is_running()
                {
                    scheduler.stop();
                }
                event_loop.exit();
            }

            WindowEvent::Resized(new_size) => {
                entry.with_device_mut(|device| device.resize(new_size));
                entry.with_window(|w| w.request_redraw());
            }

            WindowEvent::ScaleFactorChanged { .. } => {
                let new_size = entry.with_window(|w| w.inner_size());
                entry.with_device_mut(|device| device.resize(new_size));
                entry.with_window(|w| w.request_redraw());
            }

            WindowEvent::RedrawRequested => {
                let Some(scheduler) = self.scheduler.as_mut() else {
                    return;
                };

                let mut fatal = false;
                entry.with_device_mut(|device| match device.begin_frame() {
                    Ok(()) => {
                        let report = scheduler.tick(device);
                        if report.skipped > 0 {
                            log::warn!("{} object(s) skipped this frame", report.skipped);
                        }
                        device.end_frame();
                    }
                    Err(err) => match device.handle_surface_error(err) {
                        SurfaceErrorAction::Fatal => {
                            log::error!("fatal surface error; shutting down");
                            fatal = true;
                        }
                        SurfaceErrorAction::Reconfigured | SurfaceErrorAction::SkipFrame => {}
                    },
                });

                if fatal {
                    scheduler.stop();
                    event_loop.exit();
                    return;
                }

                // The scheduler owns the stop condition; the host only
                // re-requests ticks while it reports itself running.
                if scheduler.is_running() {
                    entry.with_window(|w| w.request_redraw());
                } else {
                    event_loop.exit();
                }
            }

            _ => {}
        }
    }
}
