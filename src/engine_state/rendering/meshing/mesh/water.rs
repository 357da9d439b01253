//! Surface extraction for water.
//!
//! Water runs the same layer sweep as solid terrain with a different face predicate:
//! a face is drawn where the voxel holds water and the voxel across the face is neither
//! solid nor wet. Faces between two water voxels are always hidden, whatever their
//! levels.
//!
//! Top faces carry the water level as their mask value, so only equal levels merge and
//! each merged surface sits at one height. Every other face merges freely.

use log::trace;

use crate::engine_state::rendering::meshing::MAX_QUADS_PER_CHUNK;
use crate::engine_state::voxels::block::block_side::BlockSide;
use crate::engine_state::voxels::chunk::neighborhood::ChunkNeighborhood;
use crate::engine_state::voxels::chunk::{Chunk, CHUNK_DIMENSION};
use crate::engine_state::voxels::voxel::MAX_WATER_LEVEL;

use super::face::Quad;
use super::greedy::greedy_rectangles;

/// Extracts the merged visible water faces of a chunk.
pub fn water_quads(neighborhood: &ChunkNeighborhood) -> Vec<Quad> {
    let dimension = CHUNK_DIMENSION as usize;
    let center = neighborhood.center();
    let mut mask = vec![0u16; dimension * dimension];
    let mut quads = Vec::new();

    if !center.iter().any(|voxel| voxel.has_water()) {
        return quads;
    }

    for side in BlockSide::meshing_order() {
        let axis = side.axis();
        let direction = side.direction();

        for layer in 0..CHUNK_DIMENSION {
            let mut exposed = false;
            for v in 0..CHUNK_DIMENSION {
                for u in 0..CHUNK_DIMENSION {
                    let (x, y, z) = axis.compose(layer, u, v);
                    let level = center[Chunk::index(x, y, z)].water_level();
                    let (ex, ey, ez) = axis.compose(layer + direction, u, v);
                    let exterior = neighborhood.voxel_at(ex, ey, ez);

                    let cell = &mut mask[(u + v * CHUNK_DIMENSION) as usize];
                    *cell = 0;
                    if level > 0 && !exterior.is_solid() && !exterior.has_water() {
                        *cell = if side == BlockSide::TOP {
                            level as u16
                        } else {
                            MAX_WATER_LEVEL as u16
                        };
                        exposed = true;
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

    assert!(quads.len() <= MAX_QUADS_PER_CHUNK);
    trace!("Extracted {} water quads", quads.len());
    quads
}

/// Height of a water surface above the bottom of its voxel, in voxels.
///
/// Full voxels stop short of the ceiling so stacked water never z-fights with the
/// terrain face above it.
pub fn surface_height(level: u8) -> f32 {
    if level >= MAX_WATER_LEVEL {
        0.9
    } else {
        level as f32 / MAX_WATER_LEVEL as f32
    }
}
