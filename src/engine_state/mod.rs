//! # Engine State Module
//!
//! The core engine module that owns the voxel world and drives it through the
//! per-tick pipeline.
//!
//! ## Key Components
//!
//! * `EngineState` - The coordinator that runs one pipeline tick at a time
//! * `voxels` - Voxel data, chunks, streaming, terrain and water
//! * `rendering` - Greedy meshing and the mesh finalizer boundary
//! * `task_management` - The worker pool and its stage barriers
//! * `settings` - The JSON world definition
//!
//! ## Architecture
//!
//! A tick runs these stages strictly in order, each ending in a barrier:
//!
//! ```text
//! stream -> terrain -> water (when due) -> mesh -> finalize
//! ```
//!
//! Jobs inside a stage run in parallel on the worker pool and only touch their own
//! chunk plus read-only neighbor data. The chunk store itself is only changed by the
//! streamer, while no job is in flight.

use std::sync::Arc;

use cgmath::Point3;
use log::debug;
use web_time::Instant;

use rendering::finalizer::{MeshFinalizer, MeshHandoff};
use rendering::tasks::chunk_mesh_generation_task::ChunkMeshGenerationTask;
use settings::{EngineSettings, WorldResources};
use task_management::TaskManager;
use voxels::block::texture_table::BlockTextureTable;
use voxels::chunk::world_to_chunk_position;
use voxels::streaming::ChunkStreamer;
use voxels::tasks::chunk_generation_task::ChunkGenerationTask;
use voxels::terrain::TerrainConfig;
use voxels::water::{WaterSimulator, WaterTickReport};
use voxels::world::World;

pub mod error;
pub mod rendering;
pub mod settings;
pub mod task_management;
pub mod voxels;

/// What one call to [`EngineState::tick`] did.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Chunks the streamer created.
    pub created: usize,
    /// Chunks the streamer destroyed.
    pub destroyed: usize,
    /// Chunks that received terrain.
    pub generated: usize,
    /// Present when a water tick ran.
    pub water: Option<WaterTickReport>,
    /// Chunks whose meshes were rebuilt.
    pub meshed: usize,
    /// Chunks whose meshes were handed to the finalizer.
    pub finalized: usize,
}

/// The main state container for the voxel engine.
///
/// Owns the world, the worker pool and the finalizer that receives finished meshes.
///
/// # Examples
///
/// ```
/// use cgmath::Point3;
/// use voxel_world::engine_state::rendering::MeshStore;
/// use voxel_world::engine_state::settings::WorldDefinition;
/// use voxel_world::engine_state::EngineState;
///
/// let mut definition = WorldDefinition::builtin().unwrap();
/// definition.engine.load_radius = 1;
/// definition.engine.render_radius = 1;
/// let resources = definition.build().unwrap();
///
/// let mut engine = EngineState::new(resources, MeshStore::new());
/// let report = engine.tick(Point3::new(0.0, 0.0, 0.0), web_time::Instant::now());
/// assert_eq!(report.created, 7);
/// assert_eq!(report.generated, 7);
/// ```
pub struct EngineState<F: MeshFinalizer> {
    world: World,
    streamer: ChunkStreamer,
    task_manager: TaskManager,
    water: WaterSimulator,
    settings: EngineSettings,
    textures: Arc<BlockTextureTable>,
    terrain: Arc<TerrainConfig>,
    finalizer: F,
}

impl<F: MeshFinalizer> EngineState<F> {
    /// Creates an engine with an empty world. Nothing is loaded until the first tick.
    ///
    /// # Arguments
    /// * `resources` - Resolved world definition
    /// * `finalizer` - Receiver of finished chunk meshes
    pub fn new(resources: WorldResources, finalizer: F) -> Self {
        let WorldResources {
            settings,
            textures,
            terrain,
            ..
        } = resources;

        Self {
            world: World::new(),
            streamer: ChunkStreamer::new(settings.load_radius, settings.render_radius),
            task_manager: TaskManager::new(settings.worker_count),
            water: WaterSimulator::new(settings.water_tick_interval()),
            settings,
            textures,
            terrain,
            finalizer,
        }
    }

    /// Runs one full pipeline tick for an observer at `observer` (world space).
    ///
    /// `now` drives the water clock; a water tick runs when the configured interval has
    /// elapsed since the previous one.
    pub fn tick(&mut self, observer: Point3<f32>, now: Instant) -> TickReport {
        let start = Instant::now();
        let mut report = TickReport::default();

        self.stream(world_to_chunk_position(observer), &mut report);
        report.generated = self.generate_terrain();
        if self.water.due(now) {
            report.water = Some(self.water.simulate_tick(&self.world, &mut self.task_manager));
        }
        report.meshed = self.generate_meshes();
        report.finalized = self.finalize_meshes();

        debug!("Tick finished in {:?}: {:?}", start.elapsed(), report);
        report
    }

    /// Runs one water tick immediately, regardless of the water clock.
    ///
    /// Changed chunks are re-meshed on the next [`tick`](Self::tick).
    pub fn step_water(&mut self) -> WaterTickReport {
        self.water.simulate_tick(&self.world, &mut self.task_manager)
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    /// Mutable world access, for seeding content between ticks.
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn finalizer(&self) -> &F {
        &self.finalizer
    }

    pub fn finalizer_mut(&mut self) -> &mut F {
        &mut self.finalizer
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    fn stream(&mut self, observer_chunk: Point3<i32>, report: &mut TickReport) {
        assert!(
            self.task_manager.is_idle(),
            "chunk store changed while jobs are in flight"
        );
        let Some(update) = self.streamer.update(observer_chunk, &mut self.world) else {
            return;
        };

        report.created = update.created.len();
        report.destroyed = update.destroyed.len();

        for chunk in &update.destroyed {
            self.finalizer.release(chunk.get().position);
        }
        for position in update.render_disabled {
            self.finalizer.release(position);
            if let Some(chunk) = self.world.get_chunk_at(position) {
                chunk.get_mut().state.has_mesh = false;
            }
        }
    }

    fn generate_terrain(&mut self) -> usize {
        let start = Instant::now();
        let mut jobs = 0;
        for position in self.world.sorted_positions() {
            let Some(chunk) = self.world.get_chunk_at(position) else {
                continue;
            };
            {
                let mut chunk = chunk.get_mut();
                if chunk.state.has_voxel_data || chunk.state.terrain_generating {
                    continue;
                }
                chunk.state.terrain_generating = true;
            }
            self.task_manager.publish_task(Box::new(ChunkGenerationTask::new(
                chunk,
                position,
                self.terrain.clone(),
            )));
            jobs += 1;
        }
        if jobs == 0 {
            return 0;
        }

        self.task_manager.wait_for_all(&self.world);
        debug!("Terrain stage generated {} chunks in {:?}", jobs, start.elapsed());
        jobs
    }

    fn generate_meshes(&mut self) -> usize {
        let start = Instant::now();
        let mut jobs = 0;
        for position in self.world.sorted_positions() {
            let Some(chunk) = self.world.get_chunk_at(position) else {
                continue;
            };
            {
                let mut chunk = chunk.get_mut();
                let state = chunk.state;
                if !(state.dirty && state.has_voxel_data && state.generate_mesh) || state.mesh_generating {
                    continue;
                }
                chunk.state.mesh_generating = true;
            }
            let neighbors = self.world.generated_neighbors_of(position);
            self.task_manager.publish_task(Box::new(ChunkMeshGenerationTask::new(
                chunk,
                neighbors,
                self.textures.clone(),
            )));
            jobs += 1;
        }
        if jobs == 0 {
            return 0;
        }

        self.task_manager.wait_for_all(&self.world);
        debug!("Mesh stage built {} chunks in {:?}", jobs, start.elapsed());
        jobs
    }

    fn finalize_meshes(&mut self) -> usize {
        let mut finalized = 0;
        for position in self.world.sorted_positions() {
            let Some(chunk) = self.world.get_chunk_at(position) else {
                continue;
            };
            let buffers = {
                let mut chunk = chunk.get_mut();
                let Some(buffers) = chunk.take_pending_mesh() else {
                    continue;
                };
                chunk.state.mesh_generating = false;
                if buffers.is_empty() {
                    chunk.state.has_mesh = false;
                }
                buffers
            };

            if buffers.is_empty() {
                self.finalizer.release(position);
            } else {
                self.finalizer.finalize(MeshHandoff::new(position, buffers));
                finalized += 1;
            }
        }
        finalized
    }
}
