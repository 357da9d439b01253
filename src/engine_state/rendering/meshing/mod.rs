//! Mesh generation for voxel chunks.
//!
//! Each chunk inside render range gets two independent meshes: an opaque terrain mesh
//! for its solid voxels and a translucent water mesh. Both are built from a
//! [`ChunkNeighborhood`] so faces on chunk boundaries are culled against the adjacent
//! chunk exactly like interior faces.
//!
//! # Architecture
//! - `mesh/`: Greedy face extraction and vertex emission
//! - [`ChunkMeshBuffers`]: The pair of meshes a mesh job hands back to the chunk
//! - [`build_chunk_meshes`]: The whole mesh job minus locking
//!
//! # Bounds
//!
//! Every face plane of a chunk can hold at most `CHUNK_DIMENSION²` unit faces, and a
//! chunk has `CHUNK_DIMENSION + 1` planes per axis. [`MAX_QUADS_PER_CHUNK`] is that
//! product over three axes; since a merged quad covers at least one unit face, the
//! greedy passes can never exceed it.

use web_time::Instant;

use crate::engine_state::voxels::block::texture_table::BlockTextureTable;
use crate::engine_state::voxels::chunk::neighborhood::ChunkNeighborhood;
use crate::engine_state::voxels::chunk::CHUNK_DIMENSION;

pub mod mesh;

pub use mesh::MeshData;

const E: usize = CHUNK_DIMENSION as usize;

/// Upper bound on quads a single pass can emit for one chunk.
pub const MAX_QUADS_PER_CHUNK: usize = 3 * E * E * (E + 1);

/// Terrain and water geometry produced for one chunk.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ChunkMeshBuffers {
    pub terrain: MeshData,
    pub water: MeshData,
}

impl ChunkMeshBuffers {
    /// `true` if the chunk has nothing to draw.
    pub fn is_empty(&self) -> bool {
        self.terrain.is_empty() && self.water.is_empty()
    }
}

/// Builds both meshes for the center chunk of a neighborhood.
pub fn build_chunk_meshes(neighborhood: &ChunkNeighborhood, textures: &BlockTextureTable) -> ChunkMeshBuffers {
    let start = Instant::now();

    let terrain_quads = mesh::terrain_quads(neighborhood);
    let water_quads = mesh::water_quads(neighborhood);

    let buffers = ChunkMeshBuffers {
        terrain: MeshData::from_terrain_quads(&terrain_quads, textures),
        water: MeshData::from_water_quads(&water_quads),
    };

    log::trace!(
        "Built chunk meshes ({} terrain quads, {} water quads) in {:?}",
        terrain_quads.len(),
        water_quads.len(),
        start.elapsed()
    );

    buffers
}
