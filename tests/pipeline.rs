//! End-to-end ticks of the engine against the bundled world.

use cgmath::{Point3, Vector3};
use voxel_world::engine_state::rendering::MeshStore;
use voxel_world::engine_state::settings::WorldDefinition;
use voxel_world::engine_state::voxels::voxel::{Voxel, MAX_WATER_LEVEL};
use voxel_world::engine_state::EngineState;
use web_time::{Duration, Instant};

fn engine(workers: usize) -> EngineState<MeshStore> {
    let mut definition = WorldDefinition::builtin().unwrap();
    definition.engine.load_radius = 2;
    definition.engine.render_radius = 1;
    definition.engine.worker_count = workers;
    EngineState::new(definition.build().unwrap(), MeshStore::new())
}

#[test]
fn test_parallel_pipeline_matches_inline() {
    let mut inline = engine(0);
    let mut parallel = engine(4);
    let now = Instant::now();

    for step in 0..3 {
        let observer = Point3::new(step as f32 * 32.0, 8.0, 0.0);
        let a = inline.tick(observer, now);
        let b = parallel.tick(observer, now);
        assert_eq!(a, b);
    }

    let mut positions: Vec<_> = inline.finalizer().positions().collect();
    positions.sort_by_key(|p| (p.x, p.y, p.z));
    let mut other: Vec<_> = parallel.finalizer().positions().collect();
    other.sort_by_key(|p| (p.x, p.y, p.z));
    assert_eq!(positions, other);
    assert_eq!(inline.finalizer().triangle_count(), parallel.finalizer().triangle_count());
    assert_eq!(inline.finalizer().byte_size(), parallel.finalizer().byte_size());
}

#[test]
fn test_only_render_range_is_meshed() {
    let mut engine = engine(2);
    let report = engine.tick(Point3::new(0.0, 8.0, 0.0), Instant::now());
    assert_eq!(report.created, 33);
    assert_eq!(report.generated, 33);
    assert!(report.meshed <= 7);

    let center = Point3::new(0, 0, 0);
    for position in engine.finalizer().positions() {
        let offset = position - center;
        assert!(offset.x * offset.x + offset.y * offset.y + offset.z * offset.z <= 1);
    }
}

#[test]
fn test_water_clock_and_remeshing() {
    let mut engine = engine(2);
    let start = Instant::now();
    let sky = Point3::new(0.0, 4000.0, 0.0);
    assert!(engine.tick(sky, start).water.is_none());

    let source = Point3::new(10, 4010, 10);
    assert!(engine.world().set_voxel_at(source, Voxel::AIR.with_water_level(MAX_WATER_LEVEL)));

    let early = engine.tick(sky, start + Duration::from_millis(500));
    assert!(early.water.is_none());
    assert_eq!(early.finalized, 1);

    let due = engine.tick(sky, start + Duration::from_millis(1000));
    let water = due.water.unwrap();
    assert_eq!(water.units_moved, MAX_WATER_LEVEL as u64);
    assert_eq!(due.meshed, 1);
    assert_eq!(engine.world().voxel_at(source).water_level(), 0);
    assert_eq!(
        engine.world().voxel_at(source - Vector3::unit_y()).water_level(),
        MAX_WATER_LEVEL
    );
    assert_eq!(engine.world().total_water(), MAX_WATER_LEVEL as u64);
}
