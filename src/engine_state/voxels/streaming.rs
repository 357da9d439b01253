//! # Chunk Streaming
//!
//! Keeps the set of loaded chunks equal to a sphere around the observer.
//!
//! Two radii are involved:
//!
//! * the **load radius** decides which chunks exist at all, so neighbors stay available
//!   to the water simulation and to boundary-face culling
//! * the **render radius** (never larger) decides which loaded chunks get meshed
//!
//! Reconciliation is a pure set difference against the world. Running it twice for the
//! same center changes nothing the second time, and [`ChunkStreamer::update`] skips the
//! scan entirely while the observer stays inside the same chunk.

use cgmath::Point3;

use crate::core::MtResource;

use super::chunk::Chunk;
use super::world::World;

/// Squared distance between two chunk coordinates.
pub fn distance_squared(a: Point3<i32>, b: Point3<i32>) -> i32 {
    let d = a - b;
    d.x * d.x + d.y * d.y + d.z * d.z
}

/// What a reconciliation changed.
#[derive(Default)]
pub struct StreamingUpdate {
    /// Newly created, still empty chunks.
    pub created: Vec<Point3<i32>>,
    /// Chunks removed from the world. Their buffers are freed when these handles drop.
    pub destroyed: Vec<MtResource<Chunk>>,
    /// Existing chunks that moved into render range.
    pub render_enabled: Vec<Point3<i32>>,
    /// Existing chunks that moved out of render range.
    pub render_disabled: Vec<Point3<i32>>,
}

impl StreamingUpdate {
    /// `true` if the world was left untouched.
    pub fn is_empty(&self) -> bool {
        self.created.is_empty()
            && self.destroyed.is_empty()
            && self.render_enabled.is_empty()
            && self.render_disabled.is_empty()
    }
}

/// Tracks the observer's chunk and reconciles the world around it.
pub struct ChunkStreamer {
    load_radius: i32,
    render_radius: i32,
    center: Option<Point3<i32>>,
}

impl ChunkStreamer {
    /// # Arguments
    /// * `load_radius` - Chunks within this distance (in chunks) stay loaded
    /// * `render_radius` - Chunks within this distance are meshed, clamped to `load_radius`
    pub fn new(load_radius: i32, render_radius: i32) -> Self {
        Self {
            load_radius: load_radius.max(0),
            render_radius: render_radius.clamp(0, load_radius.max(0)),
            center: None,
        }
    }

    pub fn load_radius(&self) -> i32 {
        self.load_radius
    }

    pub fn render_radius(&self) -> i32 {
        self.render_radius
    }

    /// The chunk the last reconciliation was centered on.
    pub fn center(&self) -> Option<Point3<i32>> {
        self.center
    }

    /// Every chunk coordinate within `radius` of `center`, by squared distance.
    pub fn required_positions(center: Point3<i32>, radius: i32) -> Vec<Point3<i32>> {
        let radius_squared = radius * radius;
        let mut positions = Vec::new();
        for x in -radius..=radius {
            for y in -radius..=radius {
                for z in -radius..=radius {
                    if x * x + y * y + z * z <= radius_squared {
                        positions.push(Point3::new(center.x + x, center.y + y, center.z + z));
                    }
                }
            }
        }
        positions
    }

    fn in_render_range(&self, center: Point3<i32>, position: Point3<i32>) -> bool {
        distance_squared(center, position) <= self.render_radius * self.render_radius
    }

    /// Reconciles only if the observer entered a different chunk since the last call.
    pub fn update(&mut self, observer_chunk: Point3<i32>, world: &mut World) -> Option<StreamingUpdate> {
        if self.center == Some(observer_chunk) {
            return None;
        }
        Some(self.reconcile(observer_chunk, world))
    }

    /// Makes the world contain exactly the chunks within load range of `center`.
    pub fn reconcile(&mut self, center: Point3<i32>, world: &mut World) -> StreamingUpdate {
        self.center = Some(center);
        let load_squared = self.load_radius * self.load_radius;
        let mut update = StreamingUpdate::default();

        let stale: Vec<Point3<i32>> = world
            .positions()
            .filter(|position| distance_squared(center, *position) > load_squared)
            .collect();
        for position in stale {
            if let Some(chunk) = world.remove_chunk_at(position) {
                update.destroyed.push(chunk);
            }
        }

        for position in Self::required_positions(center, self.load_radius) {
            let render = self.in_render_range(center, position);
            let (chunk, created) = world.add_chunk_at(position);
            let mut chunk = chunk.get_mut();
            if created {
                chunk.state.generate_mesh = render;
                update.created.push(position);
            } else if chunk.state.generate_mesh != render {
                chunk.state.generate_mesh = render;
                if render {
                    chunk.state.dirty = chunk.state.has_voxel_data;
                    update.render_enabled.push(position);
                } else {
                    update.render_disabled.push(position);
                }
            }
        }

        if !update.is_empty() {
            log::info!(
                "Streaming around {:?}: {} created, {} destroyed, {} entered render range, {} left it ({} loaded)",
                center,
                update.created.len(),
                update.destroyed.len(),
                update.render_enabled.len(),
                update.render_disabled.len(),
                world.len()
            );
        }

        update
    }
}
