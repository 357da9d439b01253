//! # World Module
//!
//! This module provides the `World` struct, the authoritative index from chunk
//! coordinate to chunk record.
//!
//! ## Architecture
//!
//! The world is a sparse map: only chunks the streamer currently requires exist. Chunks
//! never hold references to each other; every neighbor access is a coordinate lookup
//! here, done on the coordinating thread before a job is dispatched.
//!
//! Records are stored as `MtResource<Chunk>` handles. A job clones the handles it needs
//! and locks them itself, so the map is never locked while jobs run. Only the streamer
//! inserts or removes entries, and only between stages.
//!
//! ## Performance Considerations
//!
//! - Chunk lookup is O(1) using a hash map
//! - Iteration order is unspecified; callers that need determinism sort positions

use std::collections::HashMap;

use cgmath::Point3;

use crate::core::MtResource;

use super::block::block_side::BlockSide;
use super::chunk::{voxel_to_chunk_position, Chunk, CHUNK_DIMENSION};
use super::voxel::Voxel;

/// Sparse 3D grid of chunks.
#[derive(Default)]
pub struct World {
    chunks: HashMap<Point3<i32>, MtResource<Chunk>>,
}

impl World {
    /// Creates a new, empty world.
    pub fn new() -> Self {
        World {
            chunks: HashMap::new(),
        }
    }

    /// Inserts an empty chunk at `position` unless one is already there.
    ///
    /// # Returns
    /// The handle of the chunk now at `position`, and whether it was newly created.
    pub fn add_chunk_at(&mut self, position: Point3<i32>) -> (MtResource<Chunk>, bool) {
        if let Some(existing) = self.chunks.get(&position) {
            return (existing.clone(), false);
        }
        let chunk = MtResource::new(Chunk::new(position));
        self.chunks.insert(position, chunk.clone());
        (chunk, true)
    }

    /// Removes the chunk at `position` and returns its handle.
    ///
    /// The voxel buffer is freed once the last handle is dropped, so a caller still
    /// holding a clone keeps reading valid data.
    pub fn remove_chunk_at(&mut self, position: Point3<i32>) -> Option<MtResource<Chunk>> {
        self.chunks.remove(&position)
    }

    /// Retrieves the chunk at the specified chunk coordinates.
    pub fn get_chunk_at(&self, position: Point3<i32>) -> Option<MtResource<Chunk>> {
        self.chunks.get(&position).cloned()
    }

    pub fn contains(&self, position: Point3<i32>) -> bool {
        self.chunks.contains_key(&position)
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// All loaded chunk coordinates, in unspecified order.
    pub fn positions(&self) -> impl Iterator<Item = Point3<i32>> + '_ {
        self.chunks.keys().copied()
    }

    /// All loaded chunk coordinates, sorted by (x, y, z).
    pub fn sorted_positions(&self) -> Vec<Point3<i32>> {
        let mut positions: Vec<_> = self.positions().collect();
        positions.sort_by_key(|p| (p.x, p.y, p.z));
        positions
    }

    pub fn chunks(&self) -> impl Iterator<Item = (&Point3<i32>, &MtResource<Chunk>)> {
        self.chunks.iter()
    }

    /// Neighbor handles indexed by `BlockSide as usize`.
    ///
    /// Neighbors that are loaded but not generated yet are returned as `None`, since
    /// their buffers hold no meaningful content.
    pub fn generated_neighbors_of(&self, position: Point3<i32>) -> [Option<MtResource<Chunk>>; 6] {
        BlockSide::all().map(|side| {
            self.get_chunk_at(position + side.offset())
                .filter(|chunk| chunk.get().state.has_voxel_data)
        })
    }

    /// Reads a voxel by world-space coordinate. Unloaded space reads as Air.
    pub fn voxel_at(&self, world: Point3<i32>) -> Voxel {
        let position = voxel_to_chunk_position(world);
        match self.chunks.get(&position) {
            Some(chunk) => chunk.get().voxel_at(
                world.x.rem_euclid(CHUNK_DIMENSION),
                world.y.rem_euclid(CHUNK_DIMENSION),
                world.z.rem_euclid(CHUNK_DIMENSION),
            ),
            None => Voxel::AIR,
        }
    }

    /// Writes a voxel by world-space coordinate and marks its chunk dirty.
    ///
    /// # Returns
    /// `false` if the containing chunk is not loaded.
    pub fn set_voxel_at(&self, world: Point3<i32>, voxel: Voxel) -> bool {
        let position = voxel_to_chunk_position(world);
        let Some(chunk) = self.chunks.get(&position) else {
            return false;
        };
        let mut chunk = chunk.get_mut();
        chunk.set_voxel_at(
            world.x.rem_euclid(CHUNK_DIMENSION),
            world.y.rem_euclid(CHUNK_DIMENSION),
            world.z.rem_euclid(CHUNK_DIMENSION),
            voxel,
        );
        chunk.state.dirty = true;
        true
    }

    /// Marks a chunk dirty if it is loaded and has voxel data.
    pub fn mark_dirty(&self, position: Point3<i32>) {
        if let Some(chunk) = self.chunks.get(&position) {
            let mut chunk = chunk.get_mut();
            if chunk.state.has_voxel_data {
                chunk.state.dirty = true;
            }
        }
    }

    /// Marks the six face neighbors of a chunk dirty, so faces along the shared
    /// boundaries are rebuilt against the chunk's new contents.
    pub fn mark_neighbors_dirty(&self, position: Point3<i32>) {
        for side in BlockSide::all() {
            self.mark_dirty(position + side.offset());
        }
    }

    /// Sum of water levels across every loaded chunk.
    pub fn total_water(&self) -> u64 {
        self.chunks.values().map(|chunk| chunk.get().total_water()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_is_idempotent() {
        let mut world = World::new();
        let (first, created) = world.add_chunk_at(Point3::new(0, 0, 0));
        assert!(created);
        let (second, created) = world.add_chunk_at(Point3::new(0, 0, 0));
        assert!(!created);
        assert!(first.ptr_eq(&second));
        assert_eq!(world.len(), 1);
    }

    #[test]
    fn test_removed_chunk_outlives_store_entry() {
        let mut world = World::new();
        let (chunk, _) = world.add_chunk_at(Point3::new(1, 0, 0));
        let removed = world.remove_chunk_at(Point3::new(1, 0, 0)).unwrap();
        assert!(world.is_empty());
        assert!(removed.ptr_eq(&chunk));
        assert_eq!(chunk.get().position, Point3::new(1, 0, 0));
    }

    #[test]
    fn test_world_space_voxel_access() {
        let mut world = World::new();
        world.add_chunk_at(Point3::new(-1, 0, 0));
        assert!(world.set_voxel_at(Point3::new(-1, 3, 4), Voxel::new(2)));
        assert_eq!(world.voxel_at(Point3::new(-1, 3, 4)).block_id(), 2);
        let chunk = world.get_chunk_at(Point3::new(-1, 0, 0)).unwrap();
        assert_eq!(chunk.get().voxel_at(31, 3, 4).block_id(), 2);
        assert!(!world.set_voxel_at(Point3::new(100, 0, 0), Voxel::new(2)));
    }

    #[test]
    fn test_neighbors_skip_ungenerated_chunks() {
        let mut world = World::new();
        world.add_chunk_at(Point3::new(0, 0, 0));
        let (above, _) = world.add_chunk_at(Point3::new(0, 1, 0));
        world.add_chunk_at(Point3::new(1, 0, 0));
        above.get_mut().state.has_voxel_data = true;

        let neighbors = world.generated_neighbors_of(Point3::new(0, 0, 0));
        assert!(neighbors[BlockSide::TOP as usize].is_some());
        assert!(neighbors[BlockSide::RIGHT as usize].is_none());
        assert!(neighbors[BlockSide::LEFT as usize].is_none());
    }
}
