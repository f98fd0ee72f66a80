//! Per-object transform state.

use bytemuck::{Pod, Zeroable};
use glam::Mat4;

/// Projection and model-view matrix pair for one renderable object.
///
/// Both default to identity. The struct is `repr(C)` and `Pod` so it uploads
/// directly as the vertex-stage uniform without an intermediate staging type.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct Transform {
    pub projection: Mat4,
    pub model_view: Mat4,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Self = Self {
        projection: Mat4::IDENTITY,
        model_view: Mat4::IDENTITY,
    };

    pub const fn new(projection: Mat4, model_view: Mat4) -> Self {
        Self {
            projection,
            model_view,
        }
    }
}
