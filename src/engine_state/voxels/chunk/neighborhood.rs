//! A chunk together with its six face-adjacent neighbors.
//!
//! Meshing needs to look one voxel past every boundary. Rather than holding references
//! between chunks, a job locks the chunks it needs for the duration of the job and
//! builds a `ChunkNeighborhood` over the borrowed buffers. A missing neighbor (not
//! loaded, or not generated yet) reads as Air, so faces on the streaming frontier are
//! always drawn.

use bitvec::prelude::BitVec;

use crate::engine_state::voxels::block::block_side::BlockSide;
use crate::engine_state::voxels::voxel::Voxel;

use super::{Chunk, CHUNK_DIMENSION};

/// Edge length of the padded solidity grid.
pub const CHUNK_DIMENSION_WRAPPED: usize = (CHUNK_DIMENSION + 2) as usize;
/// Cells in one padded layer.
pub const CHUNK_PLANE_SIZE_WRAPPED: usize = CHUNK_DIMENSION_WRAPPED * CHUNK_DIMENSION_WRAPPED;
/// Cells in the padded grid.
pub const CHUNK_SIZE_WRAPPED: usize = CHUNK_PLANE_SIZE_WRAPPED * CHUNK_DIMENSION_WRAPPED;

/// Borrowed view of a chunk and its face neighbors.
#[derive(Clone, Copy)]
pub struct ChunkNeighborhood<'a> {
    center: &'a [Voxel],
    /// Indexed by `BlockSide as usize`.
    neighbors: [Option<&'a [Voxel]>; 6],
}

impl<'a> ChunkNeighborhood<'a> {
    pub fn new(center: &'a [Voxel], neighbors: [Option<&'a [Voxel]>; 6]) -> Self {
        Self { center, neighbors }
    }

    /// A chunk surrounded by Air on every side.
    pub fn isolated(center: &'a [Voxel]) -> Self {
        Self::new(center, [None; 6])
    }

    pub fn center(&self) -> &'a [Voxel] {
        self.center
    }

    pub fn neighbor(&self, side: BlockSide) -> Option<&'a [Voxel]> {
        self.neighbors[side as usize]
    }

    /// Voxel at a chunk-local coordinate in `-1..=CHUNK_DIMENSION` on each axis.
    ///
    /// Coordinates that step outside through a single face read from that neighbor.
    /// Edge and corner cells are not needed by any pass and read as Air.
    pub fn voxel_at(&self, x: i32, y: i32, z: i32) -> Voxel {
        if Chunk::contains_local(x, y, z) {
            return self.center[Chunk::index(x, y, z)];
        }

        let side = match (
            Self::overflow(x),
            Self::overflow(y),
            Self::overflow(z),
        ) {
            (-1, 0, 0) => BlockSide::LEFT,
            (1, 0, 0) => BlockSide::RIGHT,
            (0, -1, 0) => BlockSide::BOTTOM,
            (0, 1, 0) => BlockSide::TOP,
            (0, 0, -1) => BlockSide::BACK,
            (0, 0, 1) => BlockSide::FRONT,
            _ => return Voxel::AIR,
        };

        match self.neighbors[side as usize] {
            Some(voxels) => voxels[Chunk::index(
                x.rem_euclid(CHUNK_DIMENSION),
                y.rem_euclid(CHUNK_DIMENSION),
                z.rem_euclid(CHUNK_DIMENSION),
            )],
            None => Voxel::AIR,
        }
    }

    fn overflow(coordinate: i32) -> i32 {
        if coordinate < 0 {
            -1
        } else if coordinate >= CHUNK_DIMENSION {
            1
        } else {
            0
        }
    }

    /// Builds a one-voxel padded solidity bitmap of the chunk and the boundary layers of
    /// its neighbors.
    pub fn solidity_grid(&self) -> SolidityGrid {
        let mut bits = BitVec::repeat(false, CHUNK_SIZE_WRAPPED);

        for (index, voxel) in self.center.iter().enumerate() {
            if voxel.is_solid() {
                let (x, y, z) = Chunk::coords_of(index);
                bits.set(SolidityGrid::wrapped_index(x, y, z), true);
            }
        }

        for side in BlockSide::all() {
            let Some(voxels) = self.neighbors[side as usize] else {
                continue;
            };
            let axis = side.axis();
            // The neighbor layer touching us, and where it lands in our padded frame.
            let (source_layer, target_layer) = if side.is_positive() {
                (0, CHUNK_DIMENSION)
            } else {
                (CHUNK_DIMENSION - 1, -1)
            };
            for v in 0..CHUNK_DIMENSION {
                for u in 0..CHUNK_DIMENSION {
                    let (sx, sy, sz) = axis.compose(source_layer, u, v);
                    if voxels[Chunk::index(sx, sy, sz)].is_solid() {
                        let (tx, ty, tz) = axis.compose(target_layer, u, v);
                        bits.set(SolidityGrid::wrapped_index(tx, ty, tz), true);
                    }
                }
            }
        }

        SolidityGrid { bits }
    }
}

/// Solidity of a chunk plus a one-voxel border, one bit per cell.
pub struct SolidityGrid {
    bits: BitVec,
}

impl SolidityGrid {
    #[inline]
    fn wrapped_index(x: i32, y: i32, z: i32) -> usize {
        (x + 1) as usize
            + (z + 1) as usize * CHUNK_DIMENSION_WRAPPED
            + (y + 1) as usize * CHUNK_PLANE_SIZE_WRAPPED
    }

    /// Solidity at a chunk-local coordinate in `-1..=CHUNK_DIMENSION`.
    #[inline]
    pub fn is_solid(&self, x: i32, y: i32, z: i32) -> bool {
        self.bits[Self::wrapped_index(x, y, z)]
    }

    /// Number of solid cells, border included.
    pub fn count_solid(&self) -> usize {
        self.bits.count_ones()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::chunk::CHUNK_SIZE;

    fn empty() -> Vec<Voxel> {
        vec![Voxel::AIR; CHUNK_SIZE as usize]
    }

    #[test]
    fn test_reads_cross_into_neighbors() {
        let center = empty();
        let mut right = empty();
        right[Chunk::index(0, 5, 6)] = Voxel::new(9);
        let mut below = empty();
        below[Chunk::index(2, 31, 3)] = Voxel::AIR.with_water_level(4);

        let mut neighbors = [None; 6];
        neighbors[BlockSide::RIGHT as usize] = Some(right.as_slice());
        neighbors[BlockSide::BOTTOM as usize] = Some(below.as_slice());
        let view = ChunkNeighborhood::new(&center, neighbors);

        assert_eq!(view.voxel_at(32, 5, 6).block_id(), 9);
        assert_eq!(view.voxel_at(2, -1, 3).water_level(), 4);
        assert_eq!(view.voxel_at(-1, 5, 6), Voxel::AIR);
        assert_eq!(view.voxel_at(32, 32, 6), Voxel::AIR);
    }

    #[test]
    fn test_solidity_grid_includes_neighbor_boundary() {
        let mut center = empty();
        center[Chunk::index(31, 0, 0)] = Voxel::new(1);
        let mut left = empty();
        left[Chunk::index(31, 4, 4)] = Voxel::new(1);
        left[Chunk::index(30, 4, 4)] = Voxel::new(1);

        let mut neighbors = [None; 6];
        neighbors[BlockSide::LEFT as usize] = Some(left.as_slice());
        let grid = ChunkNeighborhood::new(&center, neighbors).solidity_grid();

        assert!(grid.is_solid(31, 0, 0));
        assert!(grid.is_solid(-1, 4, 4));
        assert!(!grid.is_solid(32, 0, 0));
        // Only the touching layer of the neighbor is copied.
        assert_eq!(grid.count_solid(), 2);
    }
}
