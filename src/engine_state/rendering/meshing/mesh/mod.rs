//! Mesh generation for voxel rendering.
//!
//! This module converts voxel data into flat, GPU-friendly buffers. Greedy meshing
//! combines coplanar faces with the same value into larger quads, so a flat stretch of
//! one block type costs a single quad no matter how large it is.
//!
//! # Architecture
//! - [`Quad`]: One merged rectangle of faces on a chunk face plane
//! - [`terrain_quads`] / [`water_quads`]: Layer sweeps that extract visible faces
//! - [`MeshData`]: Positions, indices and UV streams built from quads
//!
//! # Usage
//! ```no_run
//! use voxel_world::engine_state::rendering::meshing::mesh::{terrain_quads, MeshData};
//! use voxel_world::engine_state::voxels::chunk::{neighborhood::ChunkNeighborhood, Chunk};
//! # use voxel_world::engine_state::voxels::block::texture_table::BlockTextureTable;
//! # fn run(chunk: &Chunk, textures: &BlockTextureTable) {
//! let quads = terrain_quads(&ChunkNeighborhood::isolated(chunk.voxels()));
//! let mesh = MeshData::from_terrain_quads(&quads, textures);
//! # }
//! ```

mod face;
mod greedy;
#[allow(clippy::module_inception)]
mod mesh;
mod water;

pub use face::Quad;
pub use greedy::{greedy_rectangles, terrain_quads};
pub use mesh::MeshData;
pub use water::{surface_height, water_quads};
