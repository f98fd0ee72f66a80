//! Protocol-recording device for tests.
//!
//! Implements [`GraphicsDevice`] against an in-memory state machine with the
//! same binding discipline as the wgpu backend, records every operation in
//! order, and can inject compile and draw failures.

use super::{
    BufferId, DeviceFeature, GraphicsDevice, IndexData, IndexWidth, PrimitiveTopology, ProgramId,
    ShaderSources, TransformId, VertexAttribute,
};
use crate::error::{BindSlot, ConstructionError, DrawError, GpuStateError, ShaderCompileError};
use crate::transform::Transform;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Op {
    CompileProgram(ProgramId),
    CreateVertex(BufferId),
    CreateIndex(BufferId, IndexWidth),
    CreateTransformSlot(TransformId),
    UseProgram(ProgramId),
    WriteTransform(TransformId),
    BindVertex(BufferId),
    UnbindVertex(BufferId),
    BindIndex(BufferId, IndexWidth),
    UnbindIndex(BufferId),
    Draw {
        topology: PrimitiveTopology,
        index_count: u32,
    },
    SetClearColor([f32; 4]),
    EnableFeature(DeviceFeature),
    Clear,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum BufferKind {
    Vertex,
    Index,
}

#[derive(Debug, Default)]
pub(crate) struct RecordingDevice {
    ops: Vec<Op>,
    buffers: Vec<BufferKind>,
    attributes: Vec<VertexAttribute>,
    programs: u32,
    transforms: u32,
    active_program: Option<ProgramId>,
    bound_vertex: Option<BufferId>,
    bound_index: Option<BufferId>,
    current_transform: Option<TransformId>,
    fail_compile: Option<String>,
    fail_next_draw: Option<String>,
}

impl RecordingDevice {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn ops(&self) -> &[Op] {
        &self.ops
    }

    pub(crate) fn clear_ops(&mut self) {
        self.ops.clear();
    }

    pub(crate) fn draw_count(&self) -> usize {
        self.ops
            .iter()
            .filter(|op| matches!(op, Op::Draw { .. }))
            .count()
    }

    pub(crate) fn clear_count(&self) -> usize {
        self.ops.iter().filter(|op| matches!(op, Op::Clear)).count()
    }

    /// True when no buffer binding is held.
    pub(crate) fn bindings_clear(&self) -> bool {
        self.bound_vertex.is_none() && self.bound_index.is_none()
    }

    /// Last attribute layout registered with a vertex buffer.
    pub(crate) fn last_attribute(&self) -> Option<&VertexAttribute> {
        self.attributes.last()
    }

    /// Makes every subsequent compilation fail with `diagnostic`.
    pub(crate) fn fail_compile(&mut self, diagnostic: &str) {
        self.fail_compile = Some(diagnostic.to_string());
    }

    /// Makes the next draw call fail with `reason`.
    pub(crate) fn fail_next_draw(&mut self, reason: &str) {
        self.fail_next_draw = Some(reason.to_string());
    }

    fn check_buffer(&self, id: BufferId, kind: BufferKind, slot: BindSlot) -> Result<(), GpuStateError> {
        match self.buffers.get(id.0 as usize) {
            None => Err(GpuStateError::UnknownHandle),
            Some(k) if *k != kind => Err(GpuStateError::KindMismatch { slot }),
            Some(_) => Ok(()),
        }
    }
}

impl GraphicsDevice for RecordingDevice {
    fn compile_program(
        &mut self,
        _sources: &ShaderSources<'_>,
    ) -> Result<ProgramId, ShaderCompileError> {
        if let Some(diagnostic) = &self.fail_compile {
            return Err(ShaderCompileError {
                diagnostic: diagnostic.clone(),
            });
        }
        let id = ProgramId(self.programs);
        self.programs += 1;
        self.ops.push(Op::CompileProgram(id));
        Ok(id)
    }

    fn create_vertex_buffer(
        &mut self,
        _values: &[f32],
        attribute: &VertexAttribute,
    ) -> Result<BufferId, ConstructionError> {
        let id = BufferId(self.buffers.len() as u32);
        self.buffers.push(BufferKind::Vertex);
        self.attributes.push(attribute.clone());
        self.ops.push(Op::CreateVertex(id));
        Ok(id)
    }

    fn create_index_buffer(&mut self, data: IndexData<'_>) -> Result<BufferId, ConstructionError> {
        let id = BufferId(self.buffers.len() as u32);
        self.buffers.push(BufferKind::Index);
        self.ops.push(Op::CreateIndex(id, data.width()));
        Ok(id)
    }

    fn create_transform_slot(&mut self) -> Result<TransformId, ConstructionError> {
        let id = TransformId(self.transforms);
        self.transforms += 1;
        self.ops.push(Op::CreateTransformSlot(id));
        Ok(id)
    }

    fn write_transform(
        &mut self,
        slot: TransformId,
        _transform: &Transform,
    ) -> Result<(), GpuStateError> {
        if slot.0 >= self.transforms {
            return Err(GpuStateError::UnknownHandle);
        }
        self.current_transform = Some(slot);
        self.ops.push(Op::WriteTransform(slot));
        Ok(())
    }

    fn use_program(&mut self, program: ProgramId) -> Result<(), GpuStateError> {
        if program.0 >= self.programs {
            return Err(GpuStateError::UnknownHandle);
        }
        self.active_program = Some(program);
        self.ops.push(Op::UseProgram(program));
        Ok(())
    }

    fn bind_vertex_buffer(&mut self, buffer: BufferId) -> Result<(), GpuStateError> {
        self.check_buffer(buffer, BufferKind::Vertex, BindSlot::VertexAttribute)?;
        if self.bound_vertex.is_some() {
            return Err(GpuStateError::AlreadyBound {
                slot: BindSlot::VertexAttribute,
            });
        }
        self.bound_vertex = Some(buffer);
        self.ops.push(Op::BindVertex(buffer));
        Ok(())
    }

    fn unbind_vertex_buffer(&mut self, buffer: BufferId) -> Result<(), GpuStateError> {
        match self.bound_vertex {
            None => Err(GpuStateError::NotBound {
                slot: BindSlot::VertexAttribute,
            }),
            Some(bound) if bound != buffer => Err(GpuStateError::BindingMismatch {
                slot: BindSlot::VertexAttribute,
            }),
            Some(_) => {
                self.bound_vertex = None;
                self.ops.push(Op::UnbindVertex(buffer));
                Ok(())
            }
        }
    }

    fn bind_index_buffer(
        &mut self,
        buffer: BufferId,
        width: IndexWidth,
    ) -> Result<(), GpuStateError> {
        self.check_buffer(buffer, BufferKind::Index, BindSlot::Index)?;
        if self.bound_index.is_some() {
            return Err(GpuStateError::AlreadyBound {
                slot: BindSlot::Index,
            });
        }
        self.bound_index = Some(buffer);
        self.ops.push(Op::BindIndex(buffer, width));
        Ok(())
    }

    fn unbind_index_buffer(&mut self, buffer: BufferId) -> Result<(), GpuStateError> {
        match self.bound_index {
            None => Err(GpuStateError::NotBound {
                slot: BindSlot::Index,
            }),
            Some(bound) if bound != buffer => Err(GpuStateError::BindingMismatch {
                slot: BindSlot::Index,
            }),
            Some(_) => {
                self.bound_index = None;
                self.ops.push(Op::UnbindIndex(buffer));
                Ok(())
            }
        }
    }

    fn draw_indexed(
        &mut self,
        topology: PrimitiveTopology,
        index_count: u32,
    ) -> Result<(), DrawError> {
        if self.active_program.is_none() {
            return Err(GpuStateError::NoProgram.into());
        }
        if self.bound_vertex.is_none() {
            return Err(GpuStateError::NotBound {
                slot: BindSlot::VertexAttribute,
            }
            .into());
        }
        if self.bound_index.is_none() {
            return Err(GpuStateError::NotBound {
                slot: BindSlot::Index,
            }
            .into());
        }
        if let Some(reason) = self.fail_next_draw.take() {
            return Err(DrawError::Rejected(reason));
        }
        self.ops.push(Op::Draw {
            topology,
            index_count,
        });
        Ok(())
    }

    fn set_clear_color(&mut self, color: [f32; 4]) {
        self.ops.push(Op::SetClearColor(color));
    }

    fn enable_feature(&mut self, feature: DeviceFeature) {
        self.ops.push(Op::EnableFeature(feature));
    }

    fn clear_frame(&mut self) -> Result<(), DrawError> {
        self.ops.push(Op::Clear);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draw_without_program_fails() {
        let mut device = RecordingDevice::new();
        let err = device
            .draw_indexed(PrimitiveTopology::TriangleList, 3)
            .unwrap_err();
        assert!(matches!(err, DrawError::State(GpuStateError::NoProgram)));
    }

    #[test]
    fn unbind_without_bind_fails() {
        let mut device = RecordingDevice::new();
        let id = device
            .create_vertex_buffer(&[0.0; 3], &VertexAttribute {
                name: "position".to_string(),
                components: 3,
            })
            .unwrap();
        let err = device.unbind_vertex_buffer(id).unwrap_err();
        assert!(matches!(err, GpuStateError::NotBound { .. }));
    }

    #[test]
    fn vertex_buffer_cannot_bind_as_index() {
        let mut device = RecordingDevice::new();
        let id = device
            .create_vertex_buffer(&[0.0; 3], &VertexAttribute {
                name: "position".to_string(),
                components: 3,
            })
            .unwrap();
        let err = device.bind_index_buffer(id, IndexWidth::U16).unwrap_err();
        assert!(matches!(
            err,
            GpuStateError::KindMismatch {
                slot: BindSlot::Index
            }
        ));
    }
}
