use std::sync::Arc;

use log::debug;

use super::{Example, Trainer};
use crate::{
    accumulation::{SharedGradient, SharedValue},
    config::TrainerConfig,
    error::Result,
    execution::WorkerPool,
    optimization::StepFunction,
    storage::ParameterStore,
    tensor::Layout,
};

/// Spreads the examples over a pool of workers that all deposit into one mutex guarded
/// accumulator, then takes a single step.
#[derive(Debug)]
pub struct ParallelBatchTrainer<S: StepFunction> {
    store: Arc<ParameterStore>,
    step: S,
    pool: WorkerPool,
}

impl<S: StepFunction> ParallelBatchTrainer<S> {
    /// Creates a new `ParallelBatchTrainer`.
    ///
    /// # Arguments
    /// * `store` - The parameters to learn.
    /// * `step` - The step function, its convergence is the trainer's.
    /// * `config` - Provides the amount of workers.
    ///
    /// # Returns
    /// An `InvalidWorkerCount` error if the config asks for no workers.
    pub fn new(store: Arc<ParameterStore>, step: S, config: &TrainerConfig) -> Result<Self> {
        let pool = WorkerPool::new(config.workers)?;
        Ok(Self { store, step, pool })
    }
}

impl<E: Example, S: StepFunction> Trainer<E> for ParallelBatchTrainer<S> {
    fn process_examples(&mut self, examples: &[E]) -> Result<()> {
        if self.step.is_converged() {
            return Ok(());
        }

        let store = &*self.store;
        let gradient = SharedGradient::new(store.blank_set(Layout::Dense));
        let value = SharedValue::new();

        self.pool.for_each(examples, |example| {
            let (mut gradient, mut value) = (&gradient, &value);
            example.accumulate(store, &mut gradient, &mut value)
        })?;

        let value = value.value();
        debug!(
            examples = examples.len(),
            workers = self.pool.workers(),
            objective = value;
            "batch accumulated"
        );

        self.step.step(store, &gradient.into_target(), value)
    }

    fn is_converged(&self) -> bool {
        self.step.is_converged()
    }
}
