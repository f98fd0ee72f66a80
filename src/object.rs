//! Renderable solid: shader program + geometry + indices + transform.

use crate::device::{GraphicsDevice, PrimitiveTopology, ProgramId, ShaderSources, TransformId};
use crate::error::{ConstructionError, DrawError};
use crate::geometry::{GeometryBuffer, IndexBuffer};
use crate::transform::Transform;

/// A single renderable solid.
///
/// Owns its geometry and index buffers and its [`Transform`]; shares (does
/// not own) the compiled shader program. Construction fails if the shaders do
/// not compile or the buffer invariants do not hold, so a live object is
/// always drawable.
#[derive(Debug)]
pub struct RenderableObject {
    program: ProgramId,
    geometry: GeometryBuffer,
    index: IndexBuffer,
    transform_slot: TransformId,
    transform: Transform,
    topology: PrimitiveTopology,
}

impl RenderableObject {
    /// Compiles the program and uploads position/index data.
    ///
    /// Positions are consumed as `vec3` components feeding the `position`
    /// attribute; indices are validated against the resulting vertex count.
    pub fn create<D: GraphicsDevice + ?Sized>(
        device: &mut D,
        shaders: &ShaderSources<'_>,
        vertex_positions: &[f32],
        indices: &[u32],
    ) -> Result<Self, ConstructionError> {
        let program = device.compile_program(shaders)?;
        let geometry = GeometryBuffer::create(device, vertex_positions, "position", 3)?;
        let index = IndexBuffer::create(device, indices, geometry.vertex_count())?;
        let transform_slot = device.create_transform_slot()?;

        Ok(Self {
            program,
            geometry,
            index,
            transform_slot,
            transform: Transform::IDENTITY,
            topology: PrimitiveTopology::default(),
        })
    }

    /// Draws the solid: activate program, upload transform, bind geometry and
    /// index buffers, issue one indexed draw, release both bindings.
    ///
    /// Bindings are released on every exit path, including a rejected draw
    /// call, so global binding state is unbound when this returns regardless
    /// of the outcome. A failed draw leaves the buffers intact for a retry.
    pub fn render<D: GraphicsDevice + ?Sized>(&self, device: &mut D) -> Result<(), DrawError> {
        device.use_program(self.program)?;
        device.write_transform(self.transform_slot, &self.transform)?;

        let index = &self.index;
        let topology = self.topology;
        self.geometry.bound(device, |device| {
            index.bound(device, |device| device.draw_indexed(topology, index.len()))
        })
    }

    pub fn index_count(&self) -> u32 {
        self.index.len()
    }

    pub fn topology(&self) -> PrimitiveTopology {
        self.topology
    }

    pub fn set_topology(&mut self, topology: PrimitiveTopology) {
        self.topology = topology;
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn transform_mut(&mut self) -> &mut Transform {
        &mut self.transform
    }
}
