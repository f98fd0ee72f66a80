//! Error taxonomy.
//!
//! Three layers, matching where a failure can occur:
//! - [`ConstructionError`]: object/buffer creation failed; nothing usable is
//!   produced.
//! - [`GpuStateError`]: the bind/unbind protocol was violated; a programmer
//!   error that surfaces loudly instead of corrupting shared binding state.
//! - [`DrawError`]: a draw call was rejected; the object's buffers remain
//!   valid for a retry.

use thiserror::Error;

/// Failure while constructing a buffer or renderable object.
///
/// Fatal to the specific object: no handle is produced, so an "unusable
/// object" state cannot be observed afterwards.
#[derive(Debug, Error)]
pub enum ConstructionError {
    /// Vertex data contained no components at all.
    #[error("vertex data is empty")]
    EmptyVertexData,

    /// `components_per_vertex` was zero.
    #[error("components per vertex must be non-zero")]
    ZeroArity,

    /// Component count does not divide evenly into whole vertices.
    #[error("{len} vertex components do not divide into vertices of {arity} components")]
    RaggedVertexData { len: usize, arity: u32 },

    /// An index referenced a vertex past the end of the paired geometry.
    #[error("index {index} (position {position}) out of range for {vertex_count} vertices")]
    IndexOutOfRange {
        index: u32,
        position: usize,
        vertex_count: u32,
    },

    /// Shader compilation or linking failed.
    #[error(transparent)]
    ShaderCompile(#[from] ShaderCompileError),

    /// The device refused to allocate the resource.
    #[error("graphics device rejected the resource: {0}")]
    Device(String),
}

/// Shader compile/link failure, carrying the front-end diagnostic text.
#[derive(Debug, Error)]
#[error("shader compilation failed: {diagnostic}")]
pub struct ShaderCompileError {
    pub diagnostic: String,
}

/// Binding slot named in protocol errors.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum BindSlot {
    VertexAttribute,
    Index,
}

impl std::fmt::Display for BindSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::VertexAttribute => f.write_str("vertex attribute"),
            Self::Index => f.write_str("index"),
        }
    }
}

/// Violation of the bind/unbind discipline.
///
/// Under correct usage of the scoped-bind helpers these never occur; they
/// exist so that a protocol bug fails loudly rather than leaking bindings
/// between objects.
#[derive(Debug, Error)]
pub enum GpuStateError {
    /// A bind was issued while the slot was already held.
    #[error("{slot} binding is already held")]
    AlreadyBound { slot: BindSlot },

    /// An unbind was issued while the slot was empty.
    #[error("{slot} binding is not held")]
    NotBound { slot: BindSlot },

    /// An unbind named a different resource than the one currently bound.
    #[error("{slot} unbind does not match the bound resource")]
    BindingMismatch { slot: BindSlot },

    /// A handle did not name a live resource on this device.
    #[error("unknown resource handle")]
    UnknownHandle,

    /// A handle named a resource of the wrong kind for the slot.
    #[error("resource kind does not match the {slot} slot")]
    KindMismatch { slot: BindSlot },

    /// A draw was issued with no program activated.
    #[error("no shader program is active")]
    NoProgram,

    /// A draw was issued before any transform was staged.
    #[error("no transform is staged for drawing")]
    NoTransform,
}

/// Failure of a single draw call.
#[derive(Debug, Error)]
pub enum DrawError {
    /// The binding protocol was violated on the way to the draw.
    #[error(transparent)]
    State(#[from] GpuStateError),

    /// No frame is currently being recorded.
    #[error("no frame is being recorded")]
    NoActiveFrame,

    /// The device rejected the draw call itself.
    #[error("draw call rejected by the device: {0}")]
    Rejected(String),
}
