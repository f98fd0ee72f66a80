//! GPU-resident geometry: vertex attribute storage and primitive indices.
//!
//! Both buffer types validate their invariants on the CPU before any device
//! call, upload once at construction, and are immutable afterwards. Binding
//! is transient: the `bound` helpers guarantee that every enable is matched
//! by a disable on all exit paths of a draw, including draw failure.

use crate::device::{BufferId, GraphicsDevice, IndexData, IndexWidth, VertexAttribute};
use crate::error::{ConstructionError, DrawError, GpuStateError};

/// Immutable vertex attribute storage.
///
/// Holds flattened `f32` components; the component count is always an exact
/// multiple of the arity, so `vertex_count` is well defined.
#[derive(Debug)]
pub struct GeometryBuffer {
    buffer: BufferId,
    attribute: VertexAttribute,
    vertex_count: u32,
}

impl GeometryBuffer {
    /// Validates and uploads `values` as vertices of `components_per_vertex`
    /// components feeding the named attribute.
    pub fn create<D: GraphicsDevice + ?Sized>(
        device: &mut D,
        values: &[f32],
        attribute_name: impl Into<String>,
        components_per_vertex: u32,
    ) -> Result<Self, ConstructionError> {
        if values.is_empty() {
            return Err(ConstructionError::EmptyVertexData);
        }
        if components_per_vertex == 0 {
            return Err(ConstructionError::ZeroArity);
        }
        if values.len() % components_per_vertex as usize != 0 {
            return Err(ConstructionError::RaggedVertexData {
                len: values.len(),
                arity: components_per_vertex,
            });
        }

        let attribute = VertexAttribute {
            name: attribute_name.into(),
            components: components_per_vertex,
        };
        let buffer = device.create_vertex_buffer(values, &attribute)?;

        Ok(Self {
            buffer,
            attribute,
            vertex_count: (values.len() / components_per_vertex as usize) as u32,
        })
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    pub fn attribute(&self) -> &VertexAttribute {
        &self.attribute
    }

    /// Binds the buffer to the vertex-attribute slot.
    pub fn enable<D: GraphicsDevice + ?Sized>(&self, device: &mut D) -> Result<(), GpuStateError> {
        device.bind_vertex_buffer(self.buffer)
    }

    /// Releases the vertex-attribute binding.
    pub fn disable<D: GraphicsDevice + ?Sized>(&self, device: &mut D) -> Result<(), GpuStateError> {
        device.unbind_vertex_buffer(self.buffer)
    }

    /// Runs `f` with the buffer bound, releasing the binding on every exit
    /// path. An error from `f` takes precedence over a failed release.
    pub fn bound<D, T>(
        &self,
        device: &mut D,
        f: impl FnOnce(&mut D) -> Result<T, DrawError>,
    ) -> Result<T, DrawError>
    where
        D: GraphicsDevice + ?Sized,
    {
        self.enable(device)?;
        let outcome = f(device);
        let released = self.disable(device);
        match (outcome, released) {
            (Ok(value), Ok(())) => Ok(value),
            (Err(err), _) => Err(err),
            (Ok(_), Err(err)) => Err(err.into()),
        }
    }
}

/// Immutable primitive index storage.
///
/// Picks the narrowest adequate integer width from the maximum index: 16-bit
/// when every index fits below 65536, 32-bit otherwise.
#[derive(Debug)]
pub struct IndexBuffer {
    buffer: BufferId,
    width: IndexWidth,
    len: u32,
}

impl IndexBuffer {
    /// Validates `indices` against the paired geometry's `vertex_count` and
    /// uploads them at the narrowest adequate width.
    pub fn create<D: GraphicsDevice + ?Sized>(
        device: &mut D,
        indices: &[u32],
        vertex_count: u32,
    ) -> Result<Self, ConstructionError> {
        for (position, &index) in indices.iter().enumerate() {
            if index >= vertex_count {
                return Err(ConstructionError::IndexOutOfRange {
                    index,
                    position,
                    vertex_count,
                });
            }
        }

        let max = indices.iter().copied().max().unwrap_or(0);
        let (buffer, width) = if max < 65536 {
            let narrowed: Vec<u16> = indices.iter().map(|&i| i as u16).collect();
            let id = device.create_index_buffer(IndexData::U16(&narrowed))?;
            (id, IndexWidth::U16)
        } else {
            let id = device.create_index_buffer(IndexData::U32(indices))?;
            (id, IndexWidth::U32)
        };

        Ok(Self {
            buffer,
            width,
            len: indices.len() as u32,
        })
    }

    /// Number of indices.
    pub fn len(&self) -> u32 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn width(&self) -> IndexWidth {
        self.width
    }

    /// Binds the buffer to the index slot.
    pub fn enable<D: GraphicsDevice + ?Sized>(&self, device: &mut D) -> Result<(), GpuStateError> {
        device.bind_index_buffer(self.buffer, self.width)
    }

    /// Releases the index binding.
    pub fn disable<D: GraphicsDevice + ?Sized>(&self, device: &mut D) -> Result<(), GpuStateError> {
        device.unbind_index_buffer(self.buffer)
    }

    /// Runs `f` with the buffer bound, releasing the binding on every exit
    /// path. An error from `f` takes precedence over a failed release.
    pub fn bound<D, T>(
        &self,
        device: &mut D,
        f: impl FnOnce(&mut D) -> Result<T, DrawError>,
    ) -> Result<T, DrawError>
    where
        D: GraphicsDevice + ?Sized,
    {
        self.enable(device)?;
        let outcome = f(device);
        let released = self.disable(device);
        match (outcome, released) {
            (Ok(value), Ok(())) => Ok(value),
            (Err(err), _) => Err(err),
            (Ok(_), Err(err)) => Err(err.into()),
        }
    }
}
