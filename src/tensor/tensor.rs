use std::fmt;

use super::DenseTensor;
use crate::error::{Result, TrainErr};

/// Chooses the representation of a freshly created blank tensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    Dense,
    Sparse,
}

/// A numeric array addressed by a flat index.
///
/// Mutation requires exclusive access, tensors that must be shared between
/// threads live behind a `Weights` implementation instead.
pub trait Tensor: fmt::Debug + Send + Sync {
    /// The logical shape of the tensor.
    fn shape(&self) -> &[usize];

    /// The representation used by this tensor.
    fn layout(&self) -> Layout;

    /// Sets every value of the tensor to zero.
    fn zero(&mut self);

    /// Reads the value at `index`.
    ///
    /// # Panics
    /// If `index` is out of bounds.
    fn get(&self, index: usize) -> f32;

    /// Overwrites the value at `index`.
    ///
    /// # Panics
    /// If `index` is out of bounds.
    fn set(&mut self, index: usize, value: f32);

    /// Adds `delta` to the value at `index`.
    ///
    /// # Panics
    /// If `index` is out of bounds.
    fn increment(&mut self, index: usize, delta: f32);

    /// Visits every assigned entry. An index may be visited more than once by lazy
    /// representations, in which case the visited values add up to the stored one.
    ///
    /// # Arguments
    /// * `f` - Called with each `(index, value)` pair.
    fn for_each_active(&self, f: &mut dyn FnMut(usize, f32));

    /// Returns a zeroed tensor with the same shape and layout.
    fn blank(&self) -> Box<dyn Tensor>;

    /// Returns an owned copy of this tensor behind a box.
    fn boxed_clone(&self) -> Box<dyn Tensor>;

    /// Forces any lazy internal representation into its final form.
    fn materialize(&mut self) {}

    /// Downcasts to a dense tensor when possible, used for fast paths.
    fn as_dense(&self) -> Option<&DenseTensor> {
        None
    }

    /// The total amount of values addressed by the tensor.
    fn len(&self) -> usize {
        self.shape().iter().product()
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The amount of dimensions of the tensor.
    fn rank(&self) -> usize {
        self.shape().len()
    }

    /// The sorted, deduplicated indices that hold an assigned value.
    fn active_indices(&self) -> Vec<usize> {
        let mut indices = Vec::new();
        self.for_each_active(&mut |i, _| indices.push(i));
        indices.sort_unstable();
        indices.dedup();
        indices
    }

    /// Computes the dot product between `self` and `other`.
    ///
    /// # Returns
    /// A `ShapeMismatch` error if both shapes differ.
    fn dot(&self, other: &dyn Tensor) -> Result<f32> {
        check_shape(self.shape(), other.shape())?;

        // Walk the sparser of both operands.
        let mut sum = 0.;
        match self.layout() {
            Layout::Dense => other.for_each_active(&mut |i, v| sum += v * self.get(i)),
            Layout::Sparse => self.for_each_active(&mut |i, v| sum += v * other.get(i)),
        }

        Ok(sum)
    }

    /// Adds `factor * other` into `self`.
    ///
    /// # Returns
    /// A `ShapeMismatch` error if both shapes differ.
    fn add_scaled(&mut self, other: &dyn Tensor, factor: f32) -> Result<()> {
        check_shape(self.shape(), other.shape())?;
        other.for_each_active(&mut |i, v| self.increment(i, factor * v));
        Ok(())
    }

    /// Copies every value into a flat vector in index order.
    fn to_vec(&self) -> Vec<f32> {
        let mut out = vec![0.; self.len()];
        self.for_each_active(&mut |i, v| out[i] += v);
        out
    }
}

impl Clone for Box<dyn Tensor> {
    fn clone(&self) -> Self {
        self.boxed_clone()
    }
}

/// Fails with a `ShapeMismatch` unless both shapes are identical.
pub(crate) fn check_shape(expected: &[usize], got: &[usize]) -> Result<()> {
    if expected != got {
        return Err(TrainErr::ShapeMismatch {
            expected: expected.to_vec(),
            got: got.to_vec(),
        });
    }

    Ok(())
}
