use super::Example;
use crate::error::Result;

/// Learns the parameters of a store from a collection of examples.
///
/// A trainer starts iterating on construction and stays converged once it gets there.
pub trait Trainer<E: Example> {
    /// Makes one unit of progress over `examples`. Does nothing once converged.
    ///
    /// # Arguments
    /// * `examples` - The examples to learn from, each visited once.
    ///
    /// # Returns
    /// The first error an example or the step function runs into.
    fn process_examples(&mut self, examples: &[E]) -> Result<()>;

    /// Whether the trainer has converged.
    fn is_converged(&self) -> bool;

    /// Processes `examples` over and over until the trainer converges.
    fn train_from_examples(&mut self, examples: &[E]) -> Result<()> {
        while !self.is_converged() {
            self.process_examples(examples)?;
        }

        Ok(())
    }
}

impl<E: Example, T: Trainer<E> + ?Sized> Trainer<E> for Box<T> {
    fn process_examples(&mut self, examples: &[E]) -> Result<()> {
        (**self).process_examples(examples)
    }

    fn is_converged(&self) -> bool {
        (**self).is_converged()
    }
}
