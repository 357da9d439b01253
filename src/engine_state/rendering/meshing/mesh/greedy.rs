//! Greedy meshing implementation for voxel rendering.
//!
//! This module implements the greedy meshing algorithm which combines adjacent coplanar
//! faces with the same value into larger quads, significantly reducing the number of
//! vertices needed to render a chunk.
//!
//! For each face direction (Y, X, Z axes; positive then negative) and each layer of
//! voxels along that axis, a 2D mask is filled with the block id of every voxel whose
//! face in that direction is exposed. The mask is then swept row by row: each unconsumed
//! cell grows right while the value repeats, then down while the whole row segment
//! repeats, and the covered cells are cleared. Every rectangle becomes one [`Quad`].

use log::trace;
use web_time::Instant;

use crate::engine_state::rendering::meshing::MAX_QUADS_PER_CHUNK;
use crate::engine_state::voxels::block::block_side::BlockSide;
use crate::engine_state::voxels::chunk::neighborhood::ChunkNeighborhood;
use crate::engine_state::voxels::chunk::{Chunk, CHUNK_DIMENSION};

use super::face::Quad;

/// Sweeps a square mask and reports maximal rectangles of equal, non-default values.
///
/// The mask is cleared as rectangles are consumed, so it is all default on return.
///
/// # Arguments
/// * `mask` - Row-major `size * size` cells, `u` fastest
/// * `size` - Edge length of the mask
/// * `emit` - Called with `(u, v, width, height, value)` for every rectangle
pub fn greedy_rectangles<T, F>(mask: &mut [T], size: usize, mut emit: F)
where
    T: Copy + PartialEq + Default,
    F: FnMut(usize, usize, usize, usize, T),
{
    debug_assert_eq!(mask.len(), size * size);
    let empty = T::default();

    for v in 0..size {
        let mut u = 0;
        while u < size {
            let value = mask[u + v * size];
            if value == empty {
                u += 1;
                continue;
            }

            let mut width = 1;
            while u + width < size && mask[u + width + v * size] == value {
                width += 1;
            }

            let mut height = 1;
            'grow: while v + height < size {
                let row = (v + height) * size;
                for k in u..u + width {
                    if mask[k + row] != value {
                        break 'grow;
                    }
                }
                height += 1;
            }

            for row in v..v + height {
                mask[row * size + u..row * size + u + width].fill(empty);
            }

            emit(u, v, width, height, value);
            u += width;
        }
    }
}

/// Extracts the merged visible faces of a chunk's solid voxels.
///
/// A face is visible when its voxel is solid and the voxel across it, possibly in a
/// neighboring chunk, is not. Missing neighbors count as Air.
///
/// # Panics
/// Panics if the quad count exceeds [`MAX_QUADS_PER_CHUNK`], which no voxel
/// configuration can produce.
pub fn terrain_quads(neighborhood: &ChunkNeighborhood) -> Vec<Quad> {
    let start = Instant::now();
    let dimension = CHUNK_DIMENSION as usize;
    let center = neighborhood.center();
    let solidity = neighborhood.solidity_grid();

    let mut mask = vec![0u16; dimension * dimension];
    let mut quads = Vec::new();

    for side in BlockSide::meshing_order() {
        let axis = side.axis();
        let direction = side.direction();

        for layer in 0..CHUNK_DIMENSION {
            let mut exposed = false;
            for v in 0..CHUNK_DIMENSION {
                for u in 0..CHUNK_DIMENSION {
                    let (x, y, z) = axis.compose(layer, u, v);
                    let voxel = center[Chunk::index(x, y, z)];
                    let (ex, ey, ez) = axis.compose(layer + direction, u, v);
                    let cell = &mut mask[(u + v * CHUNK_DIMENSION) as usize];
                    if voxel.is_solid() && !solidity.is_solid(ex, ey, ez) {
                        *cell = voxel.block_id();
                        exposed = true;
                    } else {
                        *cell = 0;
                    }
                }
            }

            if !exposed {
                continue;
            }

            greedy_rectangles(&mut mask, dimension, |u, v, width, height, value| {
                quads.push(Quad {
                    side,
                    layer,
                    u: u as i32,
                    v: v as i32,
                    width: width as i32,
                    height: height as i32,
                    value,
                });
            });
        }
    }

    assert!(
        quads.len() <= MAX_QUADS_PER_CHUNK,
        "greedy mesher produced {} quads, bound is {}",
        quads.len(),
        MAX_QUADS_PER_CHUNK
    );

    trace!("Extracted {} terrain quads in {:?}", quads.len(), start.elapsed());
    quads
}
