//! # Chunk Generation Task
//!
//! This module defines the `ChunkGenerationTask` which fills a freshly streamed chunk
//! with terrain on a worker thread.

use std::sync::Arc;

use cgmath::Point3;

use crate::{
    core::MtResource,
    engine_state::{
        task_management::task::{Task, TaskResult},
        voxels::{
            chunk::Chunk,
            terrain::{TerrainConfig, TerrainGenerator},
            voxel::Voxel,
            world::World,
        },
    },
};

/// A task that generates chunk data on a worker.
///
/// This task is responsible for:
/// 1. Sampling the terrain function for every voxel of the chunk
/// 2. Handing the finished buffer back to the main thread, which installs it
///
/// No lock is held while generating; the chunk is only touched when the result is
/// applied.
pub struct ChunkGenerationTask {
    /// The chunk the voxels are for
    chunk: MtResource<Chunk>,
    /// The position of the chunk to generate (in chunk coordinates)
    position: Point3<i32>,
    terrain: Arc<TerrainConfig>,
}

impl ChunkGenerationTask {
    /// Creates a new chunk generation task.
    ///
    /// # Arguments
    /// * `chunk` - Handle of the chunk to fill
    /// * `position` - The chunk coordinates of that chunk
    /// * `terrain` - Shared terrain parameters
    pub fn new(chunk: MtResource<Chunk>, position: Point3<i32>, terrain: Arc<TerrainConfig>) -> Self {
        ChunkGenerationTask {
            chunk,
            position,
            terrain,
        }
    }
}

impl Task for ChunkGenerationTask {
    fn process(&self) -> Box<dyn TaskResult + Send> {
        // `Worley` is not `Send`, so every job builds its own generator.
        let generator = TerrainGenerator::new(self.terrain.clone());
        let voxels = generator.generate(self.position);

        Box::new(ChunkGenerationTaskResult {
            chunk: self.chunk.clone(),
            position: self.position,
            voxels,
        })
    }
}

/// The result of a chunk generation task: the finished voxel buffer.
pub struct ChunkGenerationTaskResult {
    chunk: MtResource<Chunk>,
    position: Point3<i32>,
    voxels: Vec<Voxel>,
}

impl TaskResult for ChunkGenerationTaskResult {
    /// Installs the voxels and marks already generated neighbors dirty, since their
    /// boundary faces were culled against Air until now.
    fn handle_result(self: Box<Self>, world: &World) {
        let still_loaded = world
            .get_chunk_at(self.position)
            .is_some_and(|current| current.ptr_eq(&self.chunk));
        if !still_loaded {
            log::debug!("Discarding terrain for unloaded chunk {:?}", self.position);
            return;
        }

        self.chunk.get_mut().install_voxels(self.voxels);
        world.mark_neighbors_dirty(self.position);
        log::trace!("Generated chunk {:?}", self.position);
    }
}
