//! Canonical solid geometry for the demo.

/// Unit cube spanning (0,0,0)..(1,1,-1): 8 vertices, 3 components each.
pub const CUBE_POSITIONS: [f32; 24] = [
    0.0, 0.0, 0.0, // 0
    0.0, 1.0, 0.0, // 1
    1.0, 1.0, 0.0, // 2
    1.0, 0.0, 0.0, // 3
    0.0, 0.0, -1.0, // 4
    0.0, 1.0, -1.0, // 5
    1.0, 1.0, -1.0, // 6
    1.0, 0.0, -1.0, // 7
];

/// Triangle-list indices for the cube faces, two triangles per face.
pub const CUBE_INDICES: [u32; 36] = [
    1, 0, 2, //
    0, 3, 2, //
    2, 3, 6, //
    3, 7, 6, //
    6, 7, 5, //
    7, 4, 5, //
    5, 4, 1, //
    4, 0, 1, //
    5, 1, 6, //
    1, 2, 6, //
    0, 4, 3, //
    4, 7, 3,
];
