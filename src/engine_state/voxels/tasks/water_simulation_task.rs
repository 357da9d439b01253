//! # Water Simulation Task
//!
//! The flow phase of a water tick for a single chunk. See [`crate::engine_state::voxels::water`]
//! for the two-phase design.

use std::sync::atomic::Ordering;
use std::sync::mpsc::Sender;
use std::sync::Arc;

use cgmath::{Point3, Vector3};

use crate::{
    core::MtResource,
    engine_state::{
        task_management::task::{Task, TaskResult},
        voxels::{
            chunk::Chunk,
            voxel::Voxel,
            water::{flow_down, WaterCounters, WaterTransfer},
            world::World,
        },
    },
};

/// Pours one chunk's water down by one cell.
///
/// The task write-locks only its own chunk. Water leaving through the bottom face is
/// sent on `transfers` for the coordinator to apply after every flow job is done.
pub struct WaterSimulationTask {
    chunk: MtResource<Chunk>,
    /// Copy of the top layer of the chunk below, taken before dispatch.
    below_top_layer: Option<Box<[Voxel]>>,
    transfers: Sender<WaterTransfer>,
    counters: Arc<WaterCounters>,
}

impl WaterSimulationTask {
    pub fn new(
        chunk: MtResource<Chunk>,
        below_top_layer: Option<Box<[Voxel]>>,
        transfers: Sender<WaterTransfer>,
        counters: Arc<WaterCounters>,
    ) -> Self {
        WaterSimulationTask {
            chunk,
            below_top_layer,
            transfers,
            counters,
        }
    }
}

impl Task for WaterSimulationTask {
    fn process(&self) -> Box<dyn TaskResult + Send> {
        let mut chunk = self.chunk.get_mut();
        let position = chunk.position;
        let flow = flow_down(chunk.voxels_mut(), self.below_top_layer.as_deref());

        let target = position - Vector3::unit_y();
        for (index, amount) in &flow.transfers {
            // The receiver lives until the tick's apply phase, after every job returns.
            let _ = self.transfers.send(WaterTransfer {
                target,
                index: *index,
                amount: *amount,
            });
        }

        if flow.changed {
            self.counters.chunks_changed.fetch_add(1, Ordering::Relaxed);
            self.counters.units_moved.fetch_add(flow.units_moved, Ordering::Relaxed);
        }

        Box::new(WaterSimulationTaskResult {
            position,
            changed: flow.changed,
            boundary_changed: flow.boundary_changed,
        })
    }
}

/// Marks the chunks a flow pass touched for remeshing.
pub struct WaterSimulationTaskResult {
    position: Point3<i32>,
    changed: bool,
    boundary_changed: bool,
}

impl TaskResult for WaterSimulationTaskResult {
    fn handle_result(self: Box<Self>, world: &World) {
        if !self.changed {
            return;
        }
        world.mark_dirty(self.position);
        if self.boundary_changed {
            world.mark_neighbors_dirty(self.position);
        }
        log::trace!("Water flowed in chunk {:?}", self.position);
    }
}
