//! Interleaved vertex format for uploading chunk meshes.
//!
//! Meshes are built as parallel attribute streams; the finalizer packs them into this
//! layout once, right before upload.

use bytemuck::{Pod, Zeroable};

/// A vertex ready for upload.
///
/// # Memory Layout
/// - Position: 3x f32 (12 bytes)
/// - Normal: 3x f32 (12 bytes)
/// - Texture Coordinates: [f32; 2] (8 bytes)
/// - Tile Offset: [f32; 2] (8 bytes)
///
/// Total size: 40 bytes
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    /// Position in world space
    pub position: [f32; 3],
    /// Flat face normal
    pub normal: [f32; 3],
    /// Tiling coordinates, one unit per voxel
    pub tex_coords: [f32; 2],
    /// Atlas offset of the face's tile; zero for water
    pub tile_offset: [f32; 2],
}

impl Vertex {
    /// Size of one vertex in bytes.
    pub const STRIDE: usize = std::mem::size_of::<Vertex>();
}
