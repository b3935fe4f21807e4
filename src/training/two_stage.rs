use super::{Example, Trainer};
use crate::error::Result;

/// Runs a first trainer until it converges, then hands over to a second one.
#[derive(Debug)]
pub struct TwoStageTrainer<A, B> {
    first: A,
    second: B,
}

impl<A, B> TwoStageTrainer<A, B> {
    /// Creates a new `TwoStageTrainer`.
    ///
    /// # Arguments
    /// * `first` - The trainer that runs until it converges.
    /// * `second` - The trainer that takes over after it.
    ///
    /// # Returns
    /// A new `TwoStageTrainer` instance.
    pub fn new(first: A, second: B) -> Self {
        Self { first, second }
    }

    pub fn first(&self) -> &A {
        &self.first
    }

    pub fn second(&self) -> &B {
        &self.second
    }
}

impl<E, A, B> Trainer<E> for TwoStageTrainer<A, B>
where
    E: Example,
    A: Trainer<E>,
    B: Trainer<E>,
{
    fn process_examples(&mut self, examples: &[E]) -> Result<()> {
        if !self.first.is_converged() {
            return self.first.process_examples(examples);
        }

        self.second.process_examples(examples)
    }

    fn is_converged(&self) -> bool {
        self.first.is_converged() && self.second.is_converged()
    }
}
