use std::sync::Arc;

use log::debug;
use parking_lot::Mutex;

use super::{Example, Trainer, status::StatusLog};
use crate::{
    accumulation::{LocalGradient, LocalValue},
    config::TrainerConfig,
    error::Result,
    execution::WorkerPool,
    optimization::ConcurrentStep,
    storage::ParameterStore,
    tensor::Layout,
};

/// Spreads the examples over a pool of workers, each one steps right after computing
/// its example's gradient.
///
/// Every tensor of the store is wrapped in a `LockedTensor` on construction, so
/// concurrent steps interleave one tensor operation at a time. Converges after a fixed
/// amount of `process_examples` calls.
#[derive(Debug)]
pub struct ParallelOnlineTrainer<S: ConcurrentStep> {
    store: Arc<ParameterStore>,
    step: S,
    pool: WorkerPool,
    max_iterations: usize,
    log_every: usize,
    iterations: usize,
}

impl<S: ConcurrentStep> ParallelOnlineTrainer<S> {
    /// Creates a new `ParallelOnlineTrainer`, locking every tensor of `store`.
    ///
    /// # Arguments
    /// * `store` - The parameters to learn.
    /// * `step` - The step function every worker applies.
    /// * `config` - Provides the amount of workers, iteration limit and status interval.
    ///
    /// # Returns
    /// An `InvalidWorkerCount` error if the config asks for no workers, an `AlreadyLocked`
    /// error if the store was already wrapped, or an `UnsupportedRank` error if some
    /// tensor can't be wrapped.
    pub fn new(store: Arc<ParameterStore>, step: S, config: &TrainerConfig) -> Result<Self> {
        let pool = WorkerPool::new(config.workers)?;
        store.lock_tensors()?;

        Ok(Self {
            store,
            step,
            pool,
            max_iterations: config.max_iterations,
            log_every: config.log_every,
            iterations: 0,
        })
    }

    /// The amount of completed `process_examples` calls.
    pub fn iterations(&self) -> usize {
        self.iterations
    }
}

impl<E: Example, S: ConcurrentStep> Trainer<E> for ParallelOnlineTrainer<S> {
    fn process_examples(&mut self, examples: &[E]) -> Result<()> {
        if self.iterations >= self.max_iterations {
            return Ok(());
        }

        let store = &*self.store;
        let step = &self.step;
        let status = Mutex::new(StatusLog::new(self.log_every));

        self.pool.for_each(examples, |example| {
            let mut gradient = LocalGradient::new(store.blank_set(Layout::Sparse));
            let mut value = LocalValue::new();

            example.accumulate(store, &mut gradient, &mut value)?;
            gradient.materialize();

            step.step(store, gradient.target(), value.value())?;
            status.lock().record(value.value());
            Ok(())
        })?;

        self.iterations += 1;
        debug!(
            iteration = self.iterations,
            examples = status.into_inner().examples();
            "parallel online pass done"
        );
        Ok(())
    }

    fn is_converged(&self) -> bool {
        self.iterations >= self.max_iterations
    }
}
