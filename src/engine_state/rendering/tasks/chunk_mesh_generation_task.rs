//! Task for generating mesh data for chunks in a background thread.
//!
//! This module contains the `ChunkMeshGenerationTask` which builds the terrain and
//! water meshes of one chunk on a worker. The main thread stays free to schedule
//! other chunks while the greedy passes run.

use std::sync::{Arc, RwLockReadGuard};

use crate::{
    core::MtResource,
    engine_state::{
        rendering::meshing::{build_chunk_meshes, ChunkMeshBuffers},
        task_management::task::{Task, TaskResult},
        voxels::{
            block::texture_table::BlockTextureTable,
            chunk::{neighborhood::ChunkNeighborhood, Chunk},
            world::World,
        },
    },
};

/// A task that generates mesh data for a chunk in a background thread.
///
/// This task is responsible for:
/// 1. Read-locking the chunk and its generated face neighbors
/// 2. Running the terrain and water greedy passes
/// 3. Returning the buffers so the main thread can attach them to the chunk
pub struct ChunkMeshGenerationTask {
    /// The chunk that needs mesh generation
    chunk: MtResource<Chunk>,
    /// Generated face neighbors, indexed by `BlockSide as usize`
    neighbors: [Option<MtResource<Chunk>>; 6],
    textures: Arc<BlockTextureTable>,
}

impl ChunkMeshGenerationTask {
    /// Creates a new chunk mesh generation task.
    ///
    /// # Arguments
    /// * `chunk` - The chunk that needs mesh generation
    /// * `neighbors` - Its face neighbors that have voxel data; `None` reads as Air
    /// * `textures` - Atlas lookup for terrain faces
    pub fn new(
        chunk: MtResource<Chunk>,
        neighbors: [Option<MtResource<Chunk>>; 6],
        textures: Arc<BlockTextureTable>,
    ) -> Self {
        ChunkMeshGenerationTask {
            chunk,
            neighbors,
            textures,
        }
    }
}

impl Task for ChunkMeshGenerationTask {
    fn process(&self) -> Box<dyn TaskResult + Send> {
        let center = self.chunk.get();
        let guards: Vec<Option<RwLockReadGuard<'_, Chunk>>> = self
            .neighbors
            .iter()
            .map(|neighbor| neighbor.as_ref().map(|chunk| chunk.get()))
            .collect();

        let mut views = [None; 6];
        for (view, guard) in views.iter_mut().zip(&guards) {
            *view = guard.as_ref().map(|chunk| chunk.voxels());
        }

        let buffers = build_chunk_meshes(&ChunkNeighborhood::new(center.voxels(), views), &self.textures);

        Box::new(ChunkMeshGenerationTaskResult {
            chunk: self.chunk.clone(),
            buffers,
        })
    }
}

/// The result of a chunk mesh generation task.
pub struct ChunkMeshGenerationTaskResult {
    chunk: MtResource<Chunk>,
    buffers: ChunkMeshBuffers,
}

impl TaskResult for ChunkMeshGenerationTaskResult {
    /// Attaches the buffers to the chunk, where the finalizer will collect them.
    fn handle_result(self: Box<Self>, _world: &World) {
        let mut chunk = self.chunk.get_mut();
        log::trace!(
            "Meshed chunk {:?}: {} terrain triangles, {} water triangles",
            chunk.position,
            self.buffers.terrain.triangle_count(),
            self.buffers.water.triangle_count()
        );
        chunk.set_pending_mesh(self.buffers);
        chunk.state.has_mesh = true;
        chunk.state.dirty = false;
    }
}
