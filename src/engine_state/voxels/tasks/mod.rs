//! # Voxel Task System
//!
//! Per-chunk jobs for world generation and water flow. Each is published once per
//! chunk per stage and applied on the main thread when the stage barrier is reached.

pub mod chunk_generation_task;
pub mod water_simulation_task;
