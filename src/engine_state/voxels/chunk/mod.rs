//! # Chunk Module
//!
//! This module provides the `Chunk` struct: a 32x32x32 block of packed voxels plus the
//! lifecycle flags the pipeline uses to decide which stage a chunk needs next.
//!
//! ## Memory Layout
//!
//! Voxels are stored in one flat buffer of `CHUNK_SIZE` entries, x fastest, then z,
//! then y:
//!
//! ```text
//! index = x + z * CHUNK_DIMENSION + y * CHUNK_PLANE_SIZE
//! ```
//!
//! Terrain generation, both meshers and the water simulation all index through
//! [`Chunk::index`], so there is exactly one layout in the crate. Keeping y slowest
//! means one horizontal layer is a contiguous run of `CHUNK_PLANE_SIZE` voxels, which
//! is what the water simulation copies when it snapshots a chunk's top layer.
//!
//! ## Lifecycle
//!
//! 1. Created zeroed (all Air) by the streamer
//! 2. Filled exactly once by a terrain job (`has_voxel_data`)
//! 3. Mutated in place by the water simulation (`dirty`)
//! 4. Meshed whenever dirty and inside render range (`has_mesh`)
//! 5. Dropped when the streamer no longer needs it

use cgmath::Point3;

use crate::engine_state::rendering::meshing::ChunkMeshBuffers;

use super::voxel::Voxel;

pub mod neighborhood;

/// The dimension (width, height, depth) of a chunk in voxels.
pub const CHUNK_DIMENSION: i32 = 32;
/// The number of voxels in a single horizontal layer of a chunk (CHUNK_DIMENSION²).
pub const CHUNK_PLANE_SIZE: i32 = CHUNK_DIMENSION * CHUNK_DIMENSION;
/// The total number of voxels in a chunk (CHUNK_DIMENSION³).
pub const CHUNK_SIZE: i32 = CHUNK_PLANE_SIZE * CHUNK_DIMENSION;

/// Transient per-chunk flags.
///
/// These are plain booleans rather than a state enum because several can hold at once:
/// a chunk can have a mesh, be dirty again, and be queued for re-meshing.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ChunkState {
    /// The voxel buffer has been filled by terrain generation.
    pub has_voxel_data: bool,
    /// A terrain job for this chunk is in flight.
    pub terrain_generating: bool,
    /// A mesh job for this chunk is in flight or its buffers await the finalizer.
    pub mesh_generating: bool,
    /// The finalizer currently holds a mesh for this chunk.
    pub has_mesh: bool,
    /// The voxel buffer changed since the last mesh was built.
    pub dirty: bool,
    /// The chunk lies inside render range and should be meshed.
    pub generate_mesh: bool,
}

/// A 32x32x32 block of voxels at a fixed chunk coordinate.
pub struct Chunk {
    /// The position of this chunk in chunk coordinates (not voxel coordinates).
    pub position: Point3<i32>,
    /// Lifecycle flags.
    pub state: ChunkState,
    voxels: Vec<Voxel>,
    pending_mesh: Option<ChunkMeshBuffers>,
}

impl Chunk {
    /// Creates an all-Air chunk with no voxel data yet.
    pub fn new(position: Point3<i32>) -> Self {
        Self {
            position,
            state: ChunkState::default(),
            voxels: vec![Voxel::AIR; CHUNK_SIZE as usize],
            pending_mesh: None,
        }
    }

    /// Flat buffer index of a chunk-local coordinate.
    ///
    /// # Panics
    /// Debug builds assert the coordinate lies inside the chunk.
    #[inline]
    pub fn index(x: i32, y: i32, z: i32) -> usize {
        debug_assert!(Self::contains_local(x, y, z), "({x}, {y}, {z}) outside chunk");
        (x + z * CHUNK_DIMENSION + y * CHUNK_PLANE_SIZE) as usize
    }

    /// Inverse of [`Chunk::index`].
    #[inline]
    pub fn coords_of(index: usize) -> (i32, i32, i32) {
        let index = index as i32;
        (
            index % CHUNK_DIMENSION,
            index / CHUNK_PLANE_SIZE,
            (index / CHUNK_DIMENSION) % CHUNK_DIMENSION,
        )
    }

    #[inline]
    pub fn contains_local(x: i32, y: i32, z: i32) -> bool {
        (0..CHUNK_DIMENSION).contains(&x)
            && (0..CHUNK_DIMENSION).contains(&y)
            && (0..CHUNK_DIMENSION).contains(&z)
    }

    /// World-space voxel coordinate of this chunk's (0, 0, 0) corner.
    pub fn world_origin(&self) -> Point3<i32> {
        chunk_origin(self.position)
    }

    pub fn voxels(&self) -> &[Voxel] {
        &self.voxels
    }

    pub fn voxels_mut(&mut self) -> &mut [Voxel] {
        &mut self.voxels
    }

    #[inline]
    pub fn voxel_at(&self, x: i32, y: i32, z: i32) -> Voxel {
        self.voxels[Self::index(x, y, z)]
    }

    #[inline]
    pub fn set_voxel_at(&mut self, x: i32, y: i32, z: i32, voxel: Voxel) {
        self.voxels[Self::index(x, y, z)] = voxel;
    }

    /// Replaces the voxel buffer with generated content and marks the chunk as having
    /// voxel data.
    ///
    /// # Panics
    /// Panics if `voxels` is not exactly `CHUNK_SIZE` long.
    pub fn install_voxels(&mut self, voxels: Vec<Voxel>) {
        assert_eq!(voxels.len(), CHUNK_SIZE as usize, "voxel buffer has wrong size");
        self.voxels = voxels;
        self.state.has_voxel_data = true;
        self.state.terrain_generating = false;
        self.state.dirty = true;
    }

    /// Copy of one horizontal layer, `CHUNK_PLANE_SIZE` voxels in x-then-z order.
    pub fn layer(&self, y: i32) -> Box<[Voxel]> {
        let start = (y * CHUNK_PLANE_SIZE) as usize;
        self.voxels[start..start + CHUNK_PLANE_SIZE as usize].into()
    }

    /// Sum of all water levels in the chunk.
    pub fn total_water(&self) -> u64 {
        self.voxels.iter().map(|voxel| voxel.water_level() as u64).sum()
    }

    /// Stores freshly built mesh buffers until the finalizer collects them.
    pub fn set_pending_mesh(&mut self, buffers: ChunkMeshBuffers) {
        self.pending_mesh = Some(buffers);
    }

    /// Takes the pending mesh buffers. Each set is handed out exactly once.
    pub fn take_pending_mesh(&mut self) -> Option<ChunkMeshBuffers> {
        self.pending_mesh.take()
    }

    pub fn has_pending_mesh(&self) -> bool {
        self.pending_mesh.is_some()
    }
}

/// World-space voxel coordinate of a chunk's (0, 0, 0) corner.
pub fn chunk_origin(position: Point3<i32>) -> Point3<i32> {
    Point3::new(
        position.x * CHUNK_DIMENSION,
        position.y * CHUNK_DIMENSION,
        position.z * CHUNK_DIMENSION,
    )
}

/// Chunk coordinate containing a world-space point. Uses floor division so negative
/// coordinates land in the chunk that actually contains them.
pub fn world_to_chunk_position(position: Point3<f32>) -> Point3<i32> {
    let edge = CHUNK_DIMENSION as f32;
    Point3::new(
        (position.x / edge).floor() as i32,
        (position.y / edge).floor() as i32,
        (position.z / edge).floor() as i32,
    )
}

/// Chunk coordinate containing a world-space voxel.
pub fn voxel_to_chunk_position(voxel: Point3<i32>) -> Point3<i32> {
    Point3::new(
        voxel.x.div_euclid(CHUNK_DIMENSION),
        voxel.y.div_euclid(CHUNK_DIMENSION),
        voxel.z.div_euclid(CHUNK_DIMENSION),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_layout_is_x_then_z_then_y() {
        assert_eq!(Chunk::index(1, 0, 0), 1);
        assert_eq!(Chunk::index(0, 0, 1), CHUNK_DIMENSION as usize);
        assert_eq!(Chunk::index(0, 1, 0), CHUNK_PLANE_SIZE as usize);
        for index in [0, 1, 33, 1025, 4000, CHUNK_SIZE as usize - 1] {
            let (x, y, z) = Chunk::coords_of(index);
            assert_eq!(Chunk::index(x, y, z), index);
        }
    }

    #[test]
    fn test_world_to_chunk_uses_floor() {
        assert_eq!(world_to_chunk_position(Point3::new(0.0, 31.9, 32.0)), Point3::new(0, 0, 1));
        assert_eq!(world_to_chunk_position(Point3::new(-0.1, -32.0, -32.1)), Point3::new(-1, -1, -2));
        assert_eq!(voxel_to_chunk_position(Point3::new(-1, 31, 64)), Point3::new(-1, 0, 2));
    }

    #[test]
    fn test_layer_and_water_totals() {
        let mut chunk = Chunk::new(Point3::new(0, 0, 0));
        chunk.set_voxel_at(3, 31, 4, Voxel::AIR.with_water_level(5));
        chunk.set_voxel_at(0, 0, 0, Voxel::AIR.with_water_level(2));
        assert_eq!(chunk.total_water(), 7);

        let top = chunk.layer(31);
        assert_eq!(top.len(), CHUNK_PLANE_SIZE as usize);
        assert_eq!(top[(3 + 4 * CHUNK_DIMENSION) as usize].water_level(), 5);
    }

    #[test]
    fn test_install_marks_voxel_data() {
        let mut chunk = Chunk::new(Point3::new(1, 2, 3));
        chunk.state.terrain_generating = true;
        chunk.install_voxels(vec![Voxel::new(1); CHUNK_SIZE as usize]);
        assert!(chunk.state.has_voxel_data);
        assert!(chunk.state.dirty);
        assert!(!chunk.state.terrain_generating);
        assert_eq!(chunk.world_origin(), Point3::new(32, 64, 96));
    }
}
