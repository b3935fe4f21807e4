use std::sync::Arc;

use log::debug;

use super::{Example, Trainer, status::StatusLog};
use crate::{
    accumulation::{LocalGradient, LocalValue},
    config::TrainerConfig,
    error::Result,
    optimization::StepFunction,
    storage::ParameterStore,
    tensor::Layout,
};

/// Takes one step per example, in input order, on the calling thread.
///
/// Converges after a fixed amount of `process_examples` calls.
#[derive(Debug)]
pub struct OnlineTrainer<S: StepFunction> {
    store: Arc<ParameterStore>,
    step: S,
    max_iterations: usize,
    log_every: usize,
    iterations: usize,
}

impl<S: StepFunction> OnlineTrainer<S> {
    /// Creates a new `OnlineTrainer`.
    ///
    /// # Arguments
    /// * `store` - The parameters to learn.
    /// * `step` - The step function applied after every example.
    /// * `config` - Provides the iteration limit and status interval.
    ///
    /// # Returns
    /// A new `OnlineTrainer` instance.
    pub fn new(store: Arc<ParameterStore>, step: S, config: &TrainerConfig) -> Self {
        Self {
            store,
            step,
            max_iterations: config.max_iterations,
            log_every: config.log_every,
            iterations: 0,
        }
    }

    /// The amount of completed `process_examples` calls.
    pub fn iterations(&self) -> usize {
        self.iterations
    }
}

impl<E: Example, S: StepFunction> Trainer<E> for OnlineTrainer<S> {
    fn process_examples(&mut self, examples: &[E]) -> Result<()> {
        if self.iterations >= self.max_iterations {
            return Ok(());
        }

        let mut status = StatusLog::new(self.log_every);
        let mut gradient = LocalGradient::new(self.store.blank_set(Layout::Sparse));

        for example in examples {
            gradient.reset();
            let mut value = LocalValue::new();

            example.accumulate(&self.store, &mut gradient, &mut value)?;
            gradient.materialize();

            self.step.step(&self.store, gradient.target(), value.value())?;
            status.record(value.value());
        }

        self.iterations += 1;
        debug!(iteration = self.iterations, examples = status.examples(); "online pass done");
        Ok(())
    }

    fn is_converged(&self) -> bool {
        self.iterations >= self.max_iterations
    }
}
