use std::sync::Arc;

use log::debug;

use super::{Example, Trainer};
use crate::{
    accumulation::{LocalGradient, LocalValue},
    error::Result,
    optimization::StepFunction,
    storage::ParameterStore,
    tensor::Layout,
};

/// Accumulates every example on the calling thread, then takes a single step.
#[derive(Debug)]
pub struct BatchTrainer<S: StepFunction> {
    store: Arc<ParameterStore>,
    step: S,
}

impl<S: StepFunction> BatchTrainer<S> {
    /// Creates a new `BatchTrainer`.
    ///
    /// # Arguments
    /// * `store` - The parameters to learn.
    /// * `step` - The step function, its convergence is the trainer's.
    ///
    /// # Returns
    /// A new `BatchTrainer` instance.
    pub fn new(store: Arc<ParameterStore>, step: S) -> Self {
        Self { store, step }
    }
}

impl<E: Example, S: StepFunction> Trainer<E> for BatchTrainer<S> {
    fn process_examples(&mut self, examples: &[E]) -> Result<()> {
        if self.step.is_converged() {
            return Ok(());
        }

        let mut gradient = LocalGradient::new(self.store.blank_set(Layout::Dense));
        let mut value = LocalValue::new();

        for example in examples {
            example.accumulate(&self.store, &mut gradient, &mut value)?;
        }

        debug!(examples = examples.len(), objective = value.value(); "batch accumulated");
        self.step.step(&self.store, gradient.target(), value.value())
    }

    fn is_converged(&self) -> bool {
        self.step.is_converged()
    }
}
