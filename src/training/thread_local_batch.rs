use std::sync::Arc;

use log::debug;

use super::{Example, Trainer};
use crate::{
    accumulation::{LocalGradient, LocalValue},
    config::TrainerConfig,
    error::Result,
    execution::WorkerPool,
    optimization::StepFunction,
    storage::ParameterStore,
    tensor::Layout,
};

/// Spreads the examples over a pool of workers, each deposits into its own accumulator.
/// The accumulators are merged after the join and a single step is taken.
#[derive(Debug)]
pub struct ThreadLocalBatchTrainer<S: StepFunction> {
    store: Arc<ParameterStore>,
    step: S,
    pool: WorkerPool,
}

impl<S: StepFunction> ThreadLocalBatchTrainer<S> {
    /// Creates a new `ThreadLocalBatchTrainer`.
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

impl<E: Example, S: StepFunction> Trainer<E> for ThreadLocalBatchTrainer<S> {
    fn process_examples(&mut self, examples: &[E]) -> Result<()> {
        if self.step.is_converged() {
            return Ok(());
        }

        let store = &*self.store;
        let locals = self.pool.for_each_with(
            examples,
            || {
                let gradient = LocalGradient::new(store.blank_set(Layout::Dense));
                (gradient, LocalValue::new())
            },
            |(gradient, value), example| example.accumulate(store, gradient, value),
        )?;

        let mut gradient = LocalGradient::new(store.blank_set(Layout::Dense));
        let mut value = LocalValue::new();

        for (g, v) in &locals {
            gradient.merge(g)?;
            value.merge(v);
        }

        debug!(
            examples = examples.len(),
            accumulators = locals.len(),
            objective = value.value();
            "batch reduced"
        );

        self.step.step(store, gradient.target(), value.value())
    }

    fn is_converged(&self) -> bool {
        self.step.is_converged()
    }
}
