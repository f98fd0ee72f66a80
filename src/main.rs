//! Spinning-cube demo.

use anyhow::Result;
use glam::{Mat4, Vec3};

use hedron::device::{DeviceFeature, GpuInit, GraphicsDevice, ShaderSources};
use hedron::logging::{LoggingConfig, init_logging};
use hedron::object::RenderableObject;
use hedron::scheduler::FrameScheduler;
use hedron::solids;
use hedron::transform::Transform;
use hedron::window::{Runtime, RuntimeConfig};

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let config = RuntimeConfig {
        title: "hedron cube".to_string(),
        ..Default::default()
    };

    Runtime::run(config, GpuInit::default(), |device| {
        device.set_clear_color([0.0, 0.0, 0.0, 1.0]);
        device.enable_feature(DeviceFeature::DepthTest);

        let cube = RenderableObject::create(
            device,
            &ShaderSources {
                vertex: include_str!("shaders/solid_vs.wgsl"),
                fragment: include_str!("shaders/solid_fs.wgsl"),
            },
            &solids::CUBE_POSITIONS,
            &solids::CUBE_INDICES,
        )?;

        let aspect = device.aspect_ratio();
        let mut scheduler = FrameScheduler::new();
        scheduler.add_animated(cube, move |t| {
            Transform::new(
                Mat4::perspective_rh_gl(60.0_f32.to_radians(), aspect, 0.1, 10.0),
                // Spin around the cube's own center, pushed back from the eye.
                Mat4::from_translation(Vec3::new(0.0, 0.0, -3.0))
                    * Mat4::from_rotation_y(t)
                    * Mat4::from_translation(Vec3::new(-0.5, -0.5, 0.5)),
            )
        });

        Ok(scheduler)
    })
}
