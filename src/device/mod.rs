//! Graphics device seam.
//!
//! [`GraphicsDevice`] is the capability set the core renders against:
//! resource creation, the transient bind/unbind protocol, and draw
//! submission. Resources are addressed by opaque `Copy` handles so that the
//! core never holds backend objects directly.
//!
//! The production backend is [`WgpuDevice`]; tests use a recording
//! implementation that replays the protocol against an in-memory state
//! machine.

mod gpu;

#[cfg(test)]
pub(crate) mod recording;

pub use gpu::{GpuInit, SurfaceErrorAction, WgpuDevice};

use crate::error::{ConstructionError, DrawError, GpuStateError, ShaderCompileError};
use crate::transform::Transform;

/// Handle to a device-owned vertex or index buffer.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct BufferId(pub(crate) u32);

/// Handle to a compiled shader program.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct ProgramId(pub(crate) u32);

/// Handle to a per-object transform uniform slot.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct TransformId(pub(crate) u32);

/// WGSL source pair for one program.
///
/// Entry points follow the `vs_main` / `fs_main` convention.
#[derive(Debug, Copy, Clone)]
pub struct ShaderSources<'a> {
    pub vertex: &'a str,
    pub fragment: &'a str,
}

/// Layout of the single vertex attribute a geometry buffer feeds.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct VertexAttribute {
    /// Shader-facing attribute name (diagnostic only under wgpu, which
    /// addresses attributes by location).
    pub name: String,
    /// Components per vertex.
    pub components: u32,
}

/// How consecutive indices are grouped into primitives.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum PrimitiveTopology {
    PointList,
    LineList,
    TriangleList,
}

impl Default for PrimitiveTopology {
    fn default() -> Self {
        Self::TriangleList
    }
}

/// Integer width of an index buffer.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum IndexWidth {
    U16,
    U32,
}

/// Index contents at their storage width.
#[derive(Debug, Copy, Clone)]
pub enum IndexData<'a> {
    U16(&'a [u16]),
    U32(&'a [u32]),
}

impl IndexData<'_> {
    pub fn width(&self) -> IndexWidth {
        match self {
            Self::U16(_) => IndexWidth::U16,
            Self::U32(_) => IndexWidth::U32,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::U16(v) => v.len(),
            Self::U32(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Raw bytes for upload.
    pub fn bytes(&self) -> &[u8] {
        match self {
            Self::U16(v) => bytemuck::cast_slice(v),
            Self::U32(v) => bytemuck::cast_slice(v),
        }
    }
}

/// Optional device features toggled at scene setup.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum DeviceFeature {
    DepthTest,
}

/// Capability set the rendering core is written against.
///
/// Binding state is global to the device and transient: every successful
/// `bind_*` must be matched by the corresponding `unbind_*` before the slot
/// may be bound again. Implementations enforce this and report violations as
/// [`GpuStateError`] rather than continuing with leaked state.
pub trait GraphicsDevice {
    /// Compiles and links a shader program from WGSL sources.
    fn compile_program(
        &mut self,
        sources: &ShaderSources<'_>,
    ) -> Result<ProgramId, ShaderCompileError>;

    /// Creates an immutable vertex buffer and registers its attribute layout.
    fn create_vertex_buffer(
        &mut self,
        values: &[f32],
        attribute: &VertexAttribute,
    ) -> Result<BufferId, ConstructionError>;

    /// Creates an immutable index buffer at the given storage width.
    fn create_index_buffer(&mut self, data: IndexData<'_>) -> Result<BufferId, ConstructionError>;

    /// Allocates a per-object uniform slot for a [`Transform`] pair.
    fn create_transform_slot(&mut self) -> Result<TransformId, ConstructionError>;

    /// Uploads `transform` to `slot` and makes it current for the next draw.
    fn write_transform(
        &mut self,
        slot: TransformId,
        transform: &Transform,
    ) -> Result<(), GpuStateError>;

    /// Activates a program. Unlike buffer binds, activation is not paired;
    /// the active program simply changes.
    fn use_program(&mut self, program: ProgramId) -> Result<(), GpuStateError>;

    /// Binds `buffer` to the vertex-attribute slot.
    fn bind_vertex_buffer(&mut self, buffer: BufferId) -> Result<(), GpuStateError>;

    /// Releases the vertex-attribute binding held by `buffer`.
    fn unbind_vertex_buffer(&mut self, buffer: BufferId) -> Result<(), GpuStateError>;

    /// Binds `buffer` to the index slot at `width`.
    fn bind_index_buffer(&mut self, buffer: BufferId, width: IndexWidth)
    -> Result<(), GpuStateError>;

    /// Releases the index binding held by `buffer`.
    fn unbind_index_buffer(&mut self, buffer: BufferId) -> Result<(), GpuStateError>;

    /// Issues one indexed draw over the currently bound buffers.
    fn draw_indexed(
        &mut self,
        topology: PrimitiveTopology,
        index_count: u32,
    ) -> Result<(), DrawError>;

    /// Sets the color used by [`clear_frame`](Self::clear_frame).
    fn set_clear_color(&mut self, color: [f32; 4]);

    /// Enables an optional device feature.
    fn enable_feature(&mut self, feature: DeviceFeature);

    /// Clears the framebuffer: color, plus depth when depth testing is
    /// enabled.
    fn clear_frame(&mut self) -> Result<(), DrawError>;
}
