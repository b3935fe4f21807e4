use std::{num::NonZeroUsize, thread};

use log::warn;
use rayon::{ThreadPool, ThreadPoolBuilder, prelude::*};

use super::PerWorker;
use crate::error::{Result, TrainErr};

/// A fixed-size pool of worker threads that runs a function over a collection and blocks
/// until every element has been handled.
#[derive(Debug)]
pub struct WorkerPool {
    pool: ThreadPool,
    workers: NonZeroUsize,
}

impl WorkerPool {
    /// Creates a new `WorkerPool`.
    ///
    /// # Arguments
    /// * `workers` - The amount of threads of the pool.
    ///
    /// # Returns
    /// An `InvalidWorkerCount` error if `workers` is zero, or a `ThreadPool` error if the
    /// threads couldn't be spawned.
    pub fn new(workers: usize) -> Result<Self> {
        let workers =
            NonZeroUsize::new(workers).ok_or(TrainErr::InvalidWorkerCount { got: workers })?;

        let pool = ThreadPoolBuilder::new()
            .num_threads(workers.get())
            .thread_name(|i| format!("paratrain-worker-{i}"))
            .build()?;

        Ok(Self { pool, workers })
    }

    /// Creates a new `WorkerPool` with one thread per available core.
    pub fn with_available_parallelism() -> Result<Self> {
        let workers = thread::available_parallelism().map_or(1, NonZeroUsize::get);
        Self::new(workers)
    }

    pub fn workers(&self) -> usize {
        self.workers.get()
    }

    /// Runs `f` once per element of `items` across the pool.
    ///
    /// # Arguments
    /// * `items` - The elements to hand out, one task each.
    /// * `f` - The task body.
    ///
    /// # Returns
    /// The first error a task returns. Tasks the pool hasn't started by then are skipped.
    ///
    /// # Panics
    /// If any task panics.
    pub fn for_each<T, F>(&self, items: &[T], f: F) -> Result<()>
    where
        T: Sync,
        F: Fn(&T) -> Result<()> + Sync,
    {
        self.pool.install(|| {
            items
                .par_iter()
                .enumerate()
                .with_max_len(1)
                .try_for_each(|(i, item)| f(item).inspect_err(|e| warn!("task {i} failed: {e}")))
        })
    }

    /// Runs `f` once per element of `items` across the pool, handing each task exclusive
    /// local state kept by the worker running it.
    ///
    /// A worker usually keeps a single local state. A task that waits on nested pool work
    /// may see its worker start another task meanwhile, which then gets a local of its own.
    ///
    /// # Arguments
    /// * `items` - The elements to hand out, one task each.
    /// * `init` - Creates a local state when the worker has none to spare.
    /// * `f` - The task body.
    ///
    /// # Returns
    /// Every local state created during the call, or the first error a task returns.
    pub fn for_each_with<T, L, I, F>(&self, items: &[T], init: I, f: F) -> Result<Vec<L>>
    where
        T: Sync,
        L: Send,
        I: Fn() -> L + Sync,
        F: Fn(&mut L, &T) -> Result<()> + Sync,
    {
        let locals = PerWorker::new(self.workers());

        self.for_each(items, |item| {
            let idx = self.pool.current_thread_index().unwrap_or(0);
            locals.with(idx, &init, |local| f(local, item))
        })?;

        Ok(locals.into_values())
    }
}
