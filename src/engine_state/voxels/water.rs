//! # Water Simulation
//!
//! Gravity-only cellular water. Every voxel carries a level in `0..=7`; once per water
//! tick each wet voxel tries to pour into the voxel directly below it. There is no
//! lateral flow, evaporation or pressure.
//!
//! ## Two Phases
//!
//! Chunks are simulated in parallel, and a chunk's bottom layer pours into the top
//! layer of a different chunk. To keep jobs from writing into each other's buffers,
//! a tick runs in two phases separated by a barrier:
//!
//! 1. **Flow** (parallel): each job rewrites only its own chunk. Water leaving through
//!    the bottom face is subtracted immediately and recorded as a [`WaterTransfer`] on a
//!    channel instead of being written into the chunk below.
//! 2. **Apply** (sequential): the coordinator drains the channel and adds every
//!    transfer to its target voxel.
//!
//! How much the chunk below can accept is read from a copy of its top layer taken
//! before any job starts, so the decision does not depend on job order. Since only the
//! voxel directly above a cell ever pours into it, the receiving cell cannot have
//! gained water by the time the transfer lands and the clamp at 7 never discards
//! anything. Water is conserved exactly unless it pours into a chunk that is gone.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::mpsc::{channel, Sender};
use std::sync::Arc;

use cgmath::{Point3, Vector3};
use log::{debug, warn};
use web_time::{Duration, Instant};

use crate::engine_state::task_management::TaskManager;

use super::chunk::{Chunk, CHUNK_DIMENSION, CHUNK_PLANE_SIZE};
use super::tasks::water_simulation_task::WaterSimulationTask;
use super::voxel::{Voxel, MAX_WATER_LEVEL};
use super::world::World;

/// Water leaving a chunk through its bottom face.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct WaterTransfer {
    /// Chunk that receives the water.
    pub target: Point3<i32>,
    /// Voxel index inside the target chunk.
    pub index: usize,
    pub amount: u8,
}

/// What one flow pass did to a chunk.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChunkFlow {
    /// Any voxel of the chunk changed.
    pub changed: bool,
    /// A voxel on the chunk's outer shell changed, which affects neighbor meshes.
    pub boundary_changed: bool,
    /// `(index in the chunk below, amount)` for water that left through the bottom.
    pub transfers: Vec<(usize, u8)>,
    /// Total units moved, inside the chunk and out of it.
    pub units_moved: u64,
}

/// Summary of one water tick.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct WaterTickReport {
    pub chunks_changed: usize,
    pub transfers_applied: usize,
    pub units_moved: u64,
}

fn on_shell(index: usize) -> bool {
    let (x, y, z) = Chunk::coords_of(index);
    let edge = CHUNK_DIMENSION - 1;
    x == 0 || y == 0 || z == 0 || x == edge || y == edge || z == edge
}

/// Runs the flow phase for one chunk.
///
/// # Arguments
/// * `voxels` - The chunk's buffer, rewritten in place
/// * `below_top_layer` - Copy of the top layer of the chunk below, if that chunk is
///   loaded and generated. Without it the bottom layer holds its water.
pub fn flow_down(voxels: &mut [Voxel], below_top_layer: Option<&[Voxel]>) -> ChunkFlow {
    let mut flow = ChunkFlow::default();
    if !voxels.iter().any(|voxel| voxel.has_water()) {
        return flow;
    }

    let snapshot = voxels.to_vec();
    let plane = CHUNK_PLANE_SIZE as usize;

    // Index order puts y slowest: a voxel is always visited before the one above it,
    // so water falls at most one cell per tick.
    for (index, source) in snapshot.iter().enumerate() {
        let level = source.water_level();
        if level == 0 {
            continue;
        }

        let amount = if index >= plane {
            let target = index - plane;
            let below = snapshot[target];
            if below.is_solid() {
                continue;
            }
            let amount = level.min(MAX_WATER_LEVEL - below.water_level());
            if amount == 0 {
                continue;
            }
            let current = voxels[target].water_level();
            voxels[target] = voxels[target].with_water_level((current + amount).min(MAX_WATER_LEVEL));
            amount
        } else {
            let Some(below_layer) = below_top_layer else {
                continue;
            };
            let below = below_layer[index];
            if below.is_solid() {
                continue;
            }
            let amount = level.min(MAX_WATER_LEVEL - below.water_level());
            if amount == 0 {
                continue;
            }
            // Same column, top layer of the chunk below.
            flow.transfers.push((index + plane * (CHUNK_DIMENSION as usize - 1), amount));
            amount
        };

        let current = voxels[index].water_level();
        voxels[index] = voxels[index].with_water_level(current - amount);
        flow.changed = true;
        flow.boundary_changed |= on_shell(index) || index < 2 * plane;
        flow.units_moved += amount as u64;
    }

    flow
}

/// Counters shared by the flow jobs of one tick.
#[derive(Default)]
pub struct WaterCounters {
    pub chunks_changed: AtomicUsize,
    pub units_moved: AtomicU64,
}

/// Decides when water ticks run and drives both phases.
pub struct WaterSimulator {
    tick_interval: Duration,
    last_tick: Option<Instant>,
}

impl WaterSimulator {
    pub fn new(tick_interval: Duration) -> Self {
        Self {
            tick_interval,
            last_tick: None,
        }
    }

    pub fn tick_interval(&self) -> Duration {
        self.tick_interval
    }

    /// Returns `true` if a water tick should run at `now`, and if so restarts the
    /// interval. The first call only starts the clock.
    pub fn due(&mut self, now: Instant) -> bool {
        match self.last_tick {
            None => {
                self.last_tick = Some(now);
                false
            }
            Some(last) if now.saturating_duration_since(last) >= self.tick_interval => {
                self.last_tick = Some(now);
                true
            }
            Some(_) => false,
        }
    }

    /// Runs one full water tick over every generated chunk.
    ///
    /// Blocks until both phases are done; any jobs already queued on `task_manager`
    /// are finished first.
    pub fn simulate_tick(&self, world: &World, task_manager: &mut TaskManager) -> WaterTickReport {
        let start = Instant::now();
        let (sender, receiver) = channel::<WaterTransfer>();
        let counters = Arc::new(WaterCounters::default());

        // Every copy of a lower chunk's top layer is taken before the first job is
        // published, so no flow job can run ahead of a snapshot it affects.
        let mut pending = Vec::new();
        for position in world.sorted_positions() {
            let Some(chunk) = world.get_chunk_at(position) else {
                continue;
            };
            if !chunk.get().state.has_voxel_data {
                continue;
            }

            let below_position = position - Vector3::unit_y();
            let below_top_layer = world
                .get_chunk_at(below_position)
                .filter(|below| below.get().state.has_voxel_data)
                .map(|below| below.get().layer(CHUNK_DIMENSION - 1));
            pending.push((chunk, below_top_layer));
        }

        let jobs = pending.len();
        for (chunk, below_top_layer) in pending {
            task_manager.publish_task(Box::new(WaterSimulationTask::new(
                chunk,
                below_top_layer,
                sender.clone(),
                counters.clone(),
            )));
        }
        drop(sender);

        task_manager.wait_for_all(world);

        let mut report = WaterTickReport {
            chunks_changed: counters.chunks_changed.load(Ordering::Relaxed),
            transfers_applied: 0,
            units_moved: counters.units_moved.load(Ordering::Relaxed),
        };

        for transfer in receiver.try_iter() {
            if apply_transfer(world, transfer) {
                report.transfers_applied += 1;
            }
        }

        debug!(
            "Water tick over {} chunks in {:?}: {:?}",
            jobs,
            start.elapsed(),
            report
        );
        report
    }
}

/// Adds transferred water to its target voxel.
///
/// # Returns
/// `false` if the target chunk no longer exists, in which case the water is lost.
pub fn apply_transfer(world: &World, transfer: WaterTransfer) -> bool {
    let Some(chunk) = world.get_chunk_at(transfer.target) else {
        warn!(
            "Dropping {} water units bound for unloaded chunk {:?}",
            transfer.amount, transfer.target
        );
        return false;
    };

    {
        let mut chunk = chunk.get_mut();
        let voxel = chunk.voxels()[transfer.index];
        let level = voxel.water_level() + transfer.amount;
        if level > MAX_WATER_LEVEL {
            warn!(
                "Water transfer into {:?} overflowed by {} units",
                transfer.target,
                level - MAX_WATER_LEVEL
            );
        }
        chunk.voxels_mut()[transfer.index] = voxel.with_water_level(level.min(MAX_WATER_LEVEL));
        chunk.state.dirty = true;
    }

    // The receiving voxel sits in the top layer, which the chunk above meshes against.
    world.mark_neighbors_dirty(transfer.target);
    true
}
