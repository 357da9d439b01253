#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::invalid_rust_codeblocks)]

//! # Voxel World
//!
//! A chunked voxel world simulation core: streaming, procedural terrain, gravity water
//! and greedy meshing, scheduled as a per-tick pipeline over a worker pool.
//!
//! ## Key Modules
//!
//! * `core` - Shared primitives used throughout the engine
//! * `engine_state` - The pipeline, voxel data, meshing and task management
//!
//! ## Architecture
//!
//! Each tick follows the observer and runs these stages, separated by barriers:
//! * Chunk streaming around the observer
//! * Terrain generation for new chunks
//! * Water flow, on a fixed interval
//! * Greedy meshing of changed chunks inside render range
//! * Handoff of finished meshes to a [`MeshFinalizer`](engine_state::rendering::MeshFinalizer)
//!
//! ## Usage
//!
//! ```rust,no_run
//! fn main() {
//!     voxel_world::run();
//! }
//! ```

use cgmath::{Point3, Vector3};
use log::{error, info};
use web_time::{Duration, Instant};

use engine_state::rendering::MeshStore;
use engine_state::settings::WorldDefinition;
use engine_state::voxels::voxel::MAX_WATER_LEVEL;
use engine_state::EngineState;

pub mod core;
pub mod engine_state;

/// Environment variable naming a world definition file to load instead of the
/// bundled one.
pub const WORLD_DEFINITION_ENV: &str = "VOXEL_WORLD_DEFINITION";

/// Number of ticks the demo walk runs for.
const DEMO_TICKS: u32 = 24;
/// Observer speed of the demo walk, in voxels per tick.
const DEMO_STEP: f32 = 8.0;
/// Simulated time between demo ticks.
const DEMO_TICK_DURATION: Duration = Duration::from_millis(250);

/// Runs the headless demo: walks an observer along +X and logs what every tick did.
pub fn run() {
    let mut log_builder = env_logger::Builder::new();
    log_builder
        .target(env_logger::Target::Stdout)
        .parse_env("RUST_LOG")
        .init();

    info!("Logger initialized");

    let definition = match std::env::var(WORLD_DEFINITION_ENV) {
        Ok(path) => {
            info!("Loading world definition from {}", path);
            WorldDefinition::from_path(path)
        }
        Err(_) => WorldDefinition::builtin(),
    };
    let resources = match definition.and_then(|definition| definition.build()) {
        Ok(resources) => resources,
        Err(err) => {
            error!("Could not load world definition: {}", err);
            return;
        }
    };

    let mut engine = EngineState::new(resources, MeshStore::new());
    let mut observer = Point3::new(0.0_f32, 48.0, 0.0);
    let mut now = Instant::now();

    for tick in 0..DEMO_TICKS {
        let report = engine.tick(observer, now);
        info!("Tick {}: {:?}", tick, report);

        if tick == 0 {
            pour_water_column(&engine, observer);
        }

        observer += Vector3::new(DEMO_STEP, 0.0, 0.0);
        now += DEMO_TICK_DURATION;
    }

    let store = engine.finalizer();
    info!(
        "Finished with {} chunks loaded, {} meshed, {} triangles in {} bytes ({} uploads, {} releases), {} water units",
        engine.world().len(),
        store.len(),
        store.triangle_count(),
        store.byte_size(),
        store.uploads(),
        store.releases(),
        engine.world().total_water()
    );
}

/// Fills a short column of full water voxels a little above the observer.
fn pour_water_column(engine: &EngineState<MeshStore>, observer: Point3<f32>) {
    let base = Point3::new(observer.x as i32 + 4, observer.y as i32 + 8, observer.z as i32 + 4);
    let poured = (0..4)
        .filter(|dy| {
            let position = base + Vector3::new(0, *dy, 0);
            let voxel = engine.world().voxel_at(position);
            !voxel.is_solid() && engine.world().set_voxel_at(position, voxel.with_water_level(MAX_WATER_LEVEL))
        })
        .count();
    info!("Poured {} water voxels at {:?}", poured, base);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_definition_runs_demo_engine() {
        let mut definition = WorldDefinition::builtin().unwrap();
        definition.engine.load_radius = 1;
        definition.engine.render_radius = 1;
        definition.engine.worker_count = 2;
        let mut engine = EngineState::new(definition.build().unwrap(), MeshStore::new());
        let observer = Point3::new(0.0, 48.0, 0.0);
        engine.tick(observer, Instant::now());

        pour_water_column(&engine, observer);
        let poured = engine.world().total_water();
        assert_eq!(poured % MAX_WATER_LEVEL as u64, 0);
        engine.step_water();
        assert!(engine.world().total_water() <= poured);
    }
}
