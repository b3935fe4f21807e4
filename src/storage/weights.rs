use std::fmt;

use crate::{
    error::Result,
    tensor::{DenseTensor, Tensor},
};

/// A parameter tensor that many threads can read and write through shared references.
///
/// Every method is a single operation: implementations decide how much consistency an
/// operation observes, nothing is guaranteed across two calls.
pub trait Weights: fmt::Debug + Send + Sync {
    /// The logical shape of the tensor.
    fn shape(&self) -> &[usize];

    /// Sets every value to zero.
    fn zero(&self);

    /// Reads the value at `index`.
    ///
    /// # Panics
    /// If `index` is out of bounds.
    fn get(&self, index: usize) -> f32;

    /// Overwrites the value at `index`.
    ///
    /// # Panics
    /// If `index` is out of bounds.
    fn set(&self, index: usize, value: f32);

    /// Adds `delta` to the value at `index`.
    ///
    /// # Panics
    /// If `index` is out of bounds.
    fn increment(&self, index: usize, delta: f32);

    /// Adds `factor * other` into these weights.
    ///
    /// # Returns
    /// A `ShapeMismatch` error if both shapes differ.
    fn add_scaled(&self, other: &dyn Tensor, factor: f32) -> Result<()>;

    /// Computes the dot product between these weights and `other`.
    ///
    /// # Returns
    /// A `ShapeMismatch` error if both shapes differ.
    fn dot(&self, other: &dyn Tensor) -> Result<f32>;

    /// The sorted indices that hold an assigned value.
    fn active_indices(&self) -> Vec<usize>;

    /// Copies the current values into an owned tensor.
    fn snapshot(&self) -> DenseTensor;

    /// Whether these weights already serialize their operations with a lock.
    fn is_locked(&self) -> bool {
        false
    }

    fn len(&self) -> usize {
        self.shape().iter().product()
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn rank(&self) -> usize {
        self.shape().len()
    }
}
