use std::sync::atomic::{AtomicUsize, Ordering};

use log::debug;

use super::{ConcurrentStep, StepFunction};
use crate::{error::Result, storage::ParameterStore, tensor::TensorSet};

/// Plain gradient ascent, `w += rate * g` for every gradient key.
#[derive(Debug)]
pub struct GradientStep {
    rate: f32,
    max_steps: Option<usize>,
    steps: AtomicUsize,
}

impl GradientStep {
    /// Creates a new `GradientStep` that never reports convergence on its own.
    ///
    /// # Arguments
    /// * `rate` - The small coefficient that modulates the size of every step.
    ///
    /// # Returns
    /// A new `GradientStep` instance.
    pub fn new(rate: f32) -> Self {
        Self {
            rate,
            max_steps: None,
            steps: AtomicUsize::new(0),
        }
    }

    /// Creates a new `GradientStep` that converges after `max_steps` steps.
    ///
    /// # Arguments
    /// * `rate` - The small coefficient that modulates the size of every step.
    /// * `max_steps` - The amount of steps after which the parameters count as learned.
    ///
    /// # Returns
    /// A new `GradientStep` instance.
    pub fn with_budget(rate: f32, max_steps: usize) -> Self {
        Self {
            max_steps: Some(max_steps),
            ..Self::new(rate)
        }
    }

    /// The amount of steps applied so far.
    pub fn steps(&self) -> usize {
        self.steps.load(Ordering::Relaxed)
    }

    fn apply(&self, store: &ParameterStore, gradient: &TensorSet, value: f64) -> Result<()> {
        for (key, g) in gradient.iter() {
            store.get(key)?.add_scaled(g, self.rate)?;
        }

        let steps = self.steps.fetch_add(1, Ordering::Relaxed) + 1;
        debug!(step = steps, value = value; "gradient step applied");
        Ok(())
    }

    fn budget_spent(&self) -> bool {
        self.max_steps.is_some_and(|max| self.steps() >= max)
    }
}

impl Clone for GradientStep {
    fn clone(&self) -> Self {
        Self {
            rate: self.rate,
            max_steps: self.max_steps,
            steps: AtomicUsize::new(self.steps()),
        }
    }
}

impl StepFunction for GradientStep {
    fn step(&mut self, store: &ParameterStore, gradient: &TensorSet, value: f64) -> Result<()> {
        self.apply(store, gradient, value)
    }

    fn is_converged(&self) -> bool {
        self.budget_spent()
    }
}

impl ConcurrentStep for GradientStep {
    fn step(&self, store: &ParameterStore, gradient: &TensorSet, value: f64) -> Result<()> {
        self.apply(store, gradient, value)
    }

    fn is_converged(&self) -> bool {
        self.budget_spent()
    }
}
