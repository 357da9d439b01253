//! The loaded set always converges to the sphere around the observer.

use std::collections::HashSet;

use cgmath::Point3;
use voxel_world::engine_state::voxels::chunk::world_to_chunk_position;
use voxel_world::engine_state::voxels::streaming::{distance_squared, ChunkStreamer};
use voxel_world::engine_state::voxels::world::World;

#[test]
fn test_loaded_set_equals_required_sphere() {
    let mut world = World::new();
    let mut streamer = ChunkStreamer::new(3, 2);

    for center in [
        Point3::new(0, 0, 0),
        Point3::new(1, 0, 0),
        Point3::new(5, -2, 1),
        Point3::new(-7, 3, -3),
        Point3::new(-6, 3, -3),
    ] {
        streamer.reconcile(center, &mut world);

        let loaded: HashSet<_> = world.positions().collect();
        let required: HashSet<_> = ChunkStreamer::required_positions(center, 3).into_iter().collect();
        assert_eq!(loaded, required);

        for (position, chunk) in world.chunks() {
            let in_render = distance_squared(center, *position) <= 4;
            assert_eq!(chunk.get().state.generate_mesh, in_render, "{:?}", position);
        }

        let again = streamer.reconcile(center, &mut world);
        assert!(again.is_empty());
    }
}

#[test]
fn test_observer_position_uses_floor_division() {
    assert_eq!(world_to_chunk_position(Point3::new(-0.5, 31.9, 32.0)), Point3::new(-1, 0, 1));
    assert_eq!(world_to_chunk_position(Point3::new(-32.0, -32.1, 0.0)), Point3::new(-1, -2, 0));
}

#[test]
fn test_destroyed_handles_outlive_the_store() {
    let mut world = World::new();
    let mut streamer = ChunkStreamer::new(1, 1);
    streamer.reconcile(Point3::new(0, 0, 0), &mut world);
    let held = world.get_chunk_at(Point3::new(-1, 0, 0)).unwrap();

    let update = streamer.update(Point3::new(3, 0, 0), &mut world).unwrap();
    assert_eq!(update.destroyed.len(), 7);
    assert_eq!(update.created.len(), 7);
    assert!(!world.contains(Point3::new(-1, 0, 0)));
    assert!(update.destroyed.iter().any(|chunk| chunk.ptr_eq(&held)));
    assert_eq!(held.get().position, Point3::new(-1, 0, 0));
}
