//! # Task Management System
//!
//! A small worker pool that runs the engine's per-chunk jobs in parallel.
//!
//! ## Architecture Overview
//!
//! - `TaskManager`: Central coordinator for task distribution and worker management
//! - `Task`: A unit of work that can be executed on a worker
//! - `TaskResult`: The result of a completed task, applied on the main thread
//! - `TaskChannel`: The sending half of one worker's queue
//!
//! Each worker has a dedicated channel for task distribution; all workers report back
//! over one shared result channel, so the main thread can block on whichever job
//! finishes first.
//!
//! ## Task Lifecycle
//! 1. Tasks are published via `TaskManager::publish_task()`
//! 2. The manager distributes tasks to worker channels round-robin, queueing the rest
//! 3. Workers process tasks and send back results
//! 4. Results are applied on the main thread in `process_completed_tasks()`
//! 5. `wait_for_all()` repeats 2-4 until nothing is queued or in flight
//!
//! ## Stages
//!
//! The engine publishes one stage's jobs, then calls `wait_for_all()` before starting
//! the next stage. No job of one stage can therefore observe a half-applied result of
//! the previous one.
//!
//! ## Failure
//!
//! A panic inside a task is caught on the worker, logged, and re-raised on the main
//! thread when its result would have been applied. Nothing is silently dropped.
//!
//! ## Inline Mode
//!
//! A manager built with zero workers runs every task on the calling thread, in publish
//! order, when results are collected. Tests use this for fully deterministic runs.

pub mod task;

use std::any::Any;
use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::thread::{self, JoinHandle};

use log::{debug, error, info};
use task::{Task, TaskResult};

use super::voxels::world::World;

/// What a worker sends back: its channel index and the task's result, or the panic
/// message if the task panicked.
type WorkerMessage = (usize, Result<Box<dyn TaskResult + Send>, String>);

/// A communication channel between the main thread and a worker thread.
#[derive(Debug)]
pub struct TaskChannel {
    task_sender: Sender<Box<dyn Task + Send>>,
    num_tasks_in_flight: usize,
    worker: Option<JoinHandle<()>>,
}

/// Manages a pool of worker threads and coordinates task execution.
///
/// The `TaskManager` is responsible for:
/// - Creating and joining worker threads
/// - Distributing tasks across available workers
/// - Collecting results and applying them to the world
/// - Queueing tasks when all workers are busy
pub struct TaskManager {
    channels: Vec<TaskChannel>,
    result_receiver: Receiver<WorkerMessage>,
    queued_tasks: VecDeque<Box<dyn Task + Send>>,
    current_channel: usize,
}

/// Maximum number of tasks that can be in flight per worker channel.
///
/// Keeping this at 1 leaves everything else in the manager's queue, so a worker that
/// finishes early picks up the next job instead of waiting behind a slow one.
pub const MAX_TASKS_IN_FLIGHT: usize = 1;

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

impl TaskManager {
    /// Creates a new `TaskManager` with the specified number of worker threads.
    ///
    /// # Arguments
    /// * `num_workers` - Number of worker threads to create. Zero runs every task
    ///   inline on the thread that collects results.
    ///
    /// If the OS refuses to spawn a thread, the manager logs the error and continues
    /// with the workers it has.
    pub fn new(num_workers: usize) -> Self {
        let (result_tx, result_rx) = channel::<WorkerMessage>();
        let mut channels = Vec::with_capacity(num_workers);

        info!(
            "Starting {} task workers (available parallelism: {:?})",
            num_workers,
            thread::available_parallelism()
        );

        for index in 0..num_workers {
            let (task_tx, task_rx) = channel::<Box<dyn Task + Send>>();
            let result_tx = result_tx.clone();

            let task_closure = move || {
                while let Ok(task) = task_rx.recv() {
                    let outcome = panic::catch_unwind(AssertUnwindSafe(|| task.process()))
                        .map_err(panic_message);
                    if let Err(message) = &outcome {
                        error!("Task panicked on worker {}: {}", index, message);
                    }
                    if result_tx.send((index, outcome)).is_err() {
                        break;
                    }
                }
            };

            match thread::Builder::new()
                .name(format!("voxel-worker-{index}"))
                .spawn(task_closure)
            {
                Ok(worker) => channels.push(TaskChannel {
                    task_sender: task_tx,
                    num_tasks_in_flight: 0,
                    worker: Some(worker),
                }),
                Err(err) => {
                    error!("Failed to spawn task worker {}: {}", index, err);
                    break;
                }
            }
        }

        TaskManager {
            channels,
            result_receiver: result_rx,
            queued_tasks: VecDeque::new(),
            current_channel: 0,
        }
    }

    /// Number of live worker threads. Zero means inline mode.
    pub fn num_workers(&self) -> usize {
        self.channels.len()
    }

    /// Number of tasks sent to workers whose results have not been applied yet.
    pub fn tasks_in_flight(&self) -> usize {
        self.channels.iter().map(|channel| channel.num_tasks_in_flight).sum()
    }

    /// Number of tasks waiting for a worker.
    pub fn queued_tasks(&self) -> usize {
        self.queued_tasks.len()
    }

    /// `true` if nothing is queued or running.
    pub fn is_idle(&self) -> bool {
        self.queued_tasks.is_empty() && self.tasks_in_flight() == 0
    }

    /// Attempts to send a task to a specific worker channel.
    ///
    /// # Returns
    /// - `Ok(())` if the task was sent
    /// - `Err(task)` if the worker has disconnected, so the task can be requeued
    fn try_send_task(
        &mut self,
        task: Box<dyn Task + Send>,
        channel_idx: usize,
    ) -> Result<(), Box<dyn Task + Send>> {
        match self.channels[channel_idx].task_sender.send(task) {
            Ok(_) => {
                self.channels[channel_idx].num_tasks_in_flight += 1;
                Ok(())
            }
            Err(task) => Err(task.0),
        }
    }

    /// Finds the next channel, round-robin from the last one used, with room for
    /// another task.
    fn find_available_channel(&self) -> Option<usize> {
        let count = self.channels.len();
        (0..count)
            .map(|offset| (self.current_channel + offset) % count)
            .find(|index| self.channels[*index].num_tasks_in_flight < MAX_TASKS_IN_FLIGHT)
    }

    /// Publishes a new task for execution.
    ///
    /// # Returns
    /// - `true` if the task was immediately sent to a worker
    /// - `false` if it was queued
    pub fn publish_task(&mut self, task: Box<dyn Task + Send>) -> bool {
        match self.find_available_channel() {
            Some(channel_idx) => match self.try_send_task(task, channel_idx) {
                Ok(_) => {
                    self.current_channel = (channel_idx + 1) % self.channels.len();
                    true
                }
                Err(task) => {
                    self.queued_tasks.push_back(task);
                    false
                }
            },
            None => {
                self.queued_tasks.push_back(task);
                false
            }
        }
    }

    /// Sends queued tasks, oldest first, until the queue is empty or every worker is
    /// busy.
    pub fn process_queued_tasks(&mut self) {
        while let Some(channel_idx) = self.find_available_channel() {
            let Some(task) = self.queued_tasks.pop_front() else {
                break;
            };
            match self.try_send_task(task, channel_idx) {
                Ok(_) => self.current_channel = (channel_idx + 1) % self.channels.len(),
                Err(task) => {
                    // Worker is gone; keep the task and stop.
                    self.queued_tasks.push_front(task);
                    break;
                }
            }
        }
    }

    /// Applies one worker message to the world.
    ///
    /// # Panics
    /// Re-raises a panic that happened inside the task.
    fn handle_message(&mut self, (channel_idx, outcome): WorkerMessage, world: &World) {
        let channel = &mut self.channels[channel_idx];
        channel.num_tasks_in_flight = channel.num_tasks_in_flight.saturating_sub(1);
        match outcome {
            Ok(result) => result.handle_result(world),
            Err(message) => panic!("task panicked on worker {channel_idx}: {message}"),
        }
    }

    /// Runs every queued task on the calling thread. Used when there are no workers.
    fn run_queued_inline(&mut self, world: &World) -> usize {
        let mut handled = 0;
        while let Some(task) = self.queued_tasks.pop_front() {
            task.process().handle_result(world);
            handled += 1;
        }
        handled
    }

    /// Applies every result that is already available, without blocking, then refills
    /// idle workers from the queue.
    ///
    /// # Returns
    /// The number of results applied.
    pub fn process_completed_tasks(&mut self, world: &World) -> usize {
        if self.channels.is_empty() {
            return self.run_queued_inline(world);
        }

        let mut handled = 0;
        while let Ok(message) = self.result_receiver.try_recv() {
            self.handle_message(message, world);
            handled += 1;
        }
        self.process_queued_tasks();
        handled
    }

    /// Blocks until every published task has run and its result has been applied.
    ///
    /// # Returns
    /// The number of results applied.
    ///
    /// # Panics
    /// Re-raises the first panic from a task.
    pub fn wait_for_all(&mut self, world: &World) -> usize {
        if self.channels.is_empty() {
            return self.run_queued_inline(world);
        }

        let mut handled = 0;
        loop {
            self.process_queued_tasks();
            if self.is_idle() {
                break;
            }
            match self.result_receiver.recv() {
                Ok(message) => {
                    self.handle_message(message, world);
                    handled += 1;
                }
                Err(_) => {
                    // Every sender is gone: all workers have exited.
                    error!(
                        "All task workers disconnected with {} tasks in flight; running {} queued tasks inline",
                        self.tasks_in_flight(),
                        self.queued_tasks.len()
                    );
                    for channel in &mut self.channels {
                        channel.num_tasks_in_flight = 0;
                    }
                    handled += self.run_queued_inline(world);
                    break;
                }
            }
        }

        debug!("Stage barrier applied {} results", handled);
        handled
    }
}

impl Drop for TaskManager {
    fn drop(&mut self) {
        let workers: Vec<JoinHandle<()>> = self
            .channels
            .drain(..)
            .filter_map(|mut channel| channel.worker.take())
            .collect();
        // Dropping the channels closed every task sender, so each worker's loop ends.
        for worker in workers {
            if worker.join().is_err() {
                error!("Task worker exited with a panic");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use super::*;

    struct Record {
        id: usize,
        log: Arc<Mutex<Vec<usize>>>,
    }

    struct RecordResult {
        id: usize,
        log: Arc<Mutex<Vec<usize>>>,
    }

    impl Task for Record {
        fn process(&self) -> Box<dyn TaskResult + Send> {
            Box::new(RecordResult {
                id: self.id,
                log: self.log.clone(),
            })
        }
    }

    impl TaskResult for RecordResult {
        fn handle_result(self: Box<Self>, _world: &World) {
            self.log.lock().unwrap().push(self.id);
        }
    }

    struct Count(Arc<AtomicUsize>);

    impl Task for Count {
        fn process(&self) -> Box<dyn TaskResult + Send> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Box::new(Nothing)
        }
    }

    struct Nothing;

    impl TaskResult for Nothing {
        fn handle_result(self: Box<Self>, _world: &World) {}
    }

    struct Explode;

    impl Task for Explode {
        fn process(&self) -> Box<dyn TaskResult + Send> {
            panic!("boom");
        }
    }

    #[test]
    fn test_inline_mode_runs_in_publish_order() {
        let world = World::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut manager = TaskManager::new(0);
        for id in 0..5 {
            assert!(!manager.publish_task(Box::new(Record { id, log: log.clone() })));
        }
        assert_eq!(manager.wait_for_all(&world), 5);
        assert_eq!(*log.lock().unwrap(), vec![0, 1, 2, 3, 4]);
        assert!(manager.is_idle());
    }

    #[test]
    fn test_workers_run_everything_before_barrier_returns() {
        let world = World::new();
        let counter = Arc::new(AtomicUsize::new(0));
        let mut manager = TaskManager::new(3);
        assert_eq!(manager.num_workers(), 3);
        for _ in 0..50 {
            manager.publish_task(Box::new(Count(counter.clone())));
        }
        assert_eq!(manager.wait_for_all(&world), 50);
        assert_eq!(counter.load(Ordering::SeqCst), 50);
        assert!(manager.is_idle());
    }

    #[test]
    #[should_panic(expected = "boom")]
    fn test_worker_panic_reaches_main_thread() {
        let world = World::new();
        let mut manager = TaskManager::new(2);
        manager.publish_task(Box::new(Explode));
        manager.wait_for_all(&world);
    }
}
