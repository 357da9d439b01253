//! # Task System Core Traits
//!
//! This module defines the fundamental building blocks of the task system.
//!
//! ## Core Components
//! - `Task`: A unit of work that runs on a worker thread
//! - `TaskResult`: The outcome of a task, applied to the world on the main thread
//!
//! ## Task Lifecycle
//! 1. A `Task` is created and scheduled via `TaskManager::publish_task()`
//! 2. The task's `process()` method is called on a worker thread
//! 3. The task returns a boxed `TaskResult`
//! 4. The result's `handle_result()` is called on the main thread with the world
//!
//! ## Thread Safety
//! - `Task` must be `Send` to be transferred between threads
//! - `TaskResult` must be `Send` to be transferred back to the main thread
//! - A task write-locks at most the one chunk it works on; neighbor data is read-locked
//!   or copied before dispatch

use crate::engine_state::voxels::world::World;

/// A unit of work executed on a worker thread.
///
/// Tasks own everything they need: chunk handles, shared configuration behind `Arc`,
/// or plain copies of voxel data. They never touch the world map itself.
pub trait Task: Send {
    /// Does the work and returns a result for the main thread.
    fn process(&self) -> Box<dyn TaskResult + Send>;
}

/// The outcome of a `Task`, applied on the main thread.
///
/// Results are where worker output meets shared state: writing generated voxels into
/// a chunk, storing mesh buffers, marking neighbors dirty.
pub trait TaskResult: Send {
    fn handle_result(self: Box<Self>, world: &World);
}
