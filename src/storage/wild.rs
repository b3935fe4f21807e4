use std::sync::atomic::{AtomicU32, Ordering};

use super::Weights;
use crate::{
    error::{Result, TrainErr},
    initialization::ParamGen,
    tensor::{DenseTensor, Tensor, check_shape},
};

/// Dense weights shared across threads without any lock.
///
/// It embraces race conditions: every value is a relaxed atomic, so a read always returns
/// some value that was written, but a multi-value read may mix old and new values and
/// concurrent increments on the same index can overwrite each other. Wrap it in a
/// `LockedTensor` when updates must not be lost.
#[derive(Debug)]
pub struct WildTensor {
    shape: Vec<usize>,
    values: Box<[AtomicU32]>,
}

impl WildTensor {
    /// Creates a new zeroed `WildTensor`.
    ///
    /// # Arguments
    /// * `shape` - The logical shape of the tensor.
    ///
    /// # Returns
    /// A new `WildTensor` instance.
    pub fn zeros(shape: &[usize]) -> Self {
        let len: usize = shape.iter().product();
        Self::from_values(shape, std::iter::repeat_n(0., len))
    }

    /// Creates a new `WildTensor` from flat values in index order.
    ///
    /// # Arguments
    /// * `shape` - The logical shape of the tensor.
    /// * `values` - The initial values.
    ///
    /// # Returns
    /// A `ShapeMismatch` error if `values` doesn't fill `shape` exactly.
    pub fn from_vec(shape: &[usize], values: Vec<f32>) -> Result<Self> {
        let len: usize = shape.iter().product();
        if len != values.len() {
            return Err(TrainErr::ShapeMismatch {
                expected: shape.to_vec(),
                got: vec![values.len()],
            });
        }

        Ok(Self::from_values(shape, values))
    }

    /// Creates a new `WildTensor` sampling its initial values from a parameter generator.
    ///
    /// # Arguments
    /// * `shape` - The logical shape of the tensor.
    /// * `param_gen` - The generator to draw the values from.
    ///
    /// # Returns
    /// A `ParamGenExhausted` error if the generator runs dry before filling the tensor.
    pub fn generate<PG: ParamGen + ?Sized>(shape: &[usize], param_gen: &mut PG) -> Result<Self> {
        let len: usize = shape.iter().product();
        let mut values = vec![0.; len];
        let mut filled = 0;

        while filled < len {
            match param_gen.fill(&mut values[filled..]) {
                0 => {
                    return Err(TrainErr::ParamGenExhausted {
                        got: filled,
                        expected: len,
                    });
                }
                n => filled += n,
            }
        }

        Ok(Self::from_values(shape, values))
    }

    fn from_values<I: IntoIterator<Item = f32>>(shape: &[usize], values: I) -> Self {
        Self {
            shape: shape.to_vec(),
            values: values
                .into_iter()
                .map(|v| AtomicU32::new(v.to_bits()))
                .collect(),
        }
    }

    fn load(&self, index: usize) -> f32 {
        f32::from_bits(self.values[index].load(Ordering::Relaxed))
    }

    fn store(&self, index: usize, value: f32) {
        self.values[index].store(value.to_bits(), Ordering::Relaxed);
    }
}

impl Weights for WildTensor {
    fn shape(&self) -> &[usize] {
        &self.shape
    }

    fn zero(&self) {
        (0..self.values.len()).for_each(|i| self.store(i, 0.));
    }

    fn get(&self, index: usize) -> f32 {
        self.load(index)
    }

    fn set(&self, index: usize, value: f32) {
        self.store(index, value);
    }

    fn increment(&self, index: usize, delta: f32) {
        // Not a compare-exchange: racing writers may lose each other's delta.
        self.store(index, self.load(index) + delta);
    }

    fn add_scaled(&self, other: &dyn Tensor, factor: f32) -> Result<()> {
        check_shape(&self.shape, other.shape())?;
        other.for_each_active(&mut |i, v| self.increment(i, factor * v));
        Ok(())
    }

    fn dot(&self, other: &dyn Tensor) -> Result<f32> {
        check_shape(&self.shape, other.shape())?;

        let mut sum = 0.;
        other.for_each_active(&mut |i, v| sum += v * self.load(i));
        Ok(sum)
    }

    fn active_indices(&self) -> Vec<usize> {
        (0..self.values.len()).collect()
    }

    fn snapshot(&self) -> DenseTensor {
        let mut out = DenseTensor::zeros(&self.shape);
        (0..self.values.len()).for_each(|i| out.set(i, self.load(i)));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{initialization::ConstParamGen, tensor::SparseTensor};

    #[test]
    fn reads_and_writes() {
        let w = WildTensor::zeros(&[2, 2]);
        w.set(1, 2.);
        w.increment(1, 0.5);
        w.increment(3, -1.);

        assert_eq!(w.get(1), 2.5);
        assert_eq!(w.snapshot().to_vec(), vec![0., 2.5, 0., -1.]);

        w.zero();
        assert_eq!(w.snapshot().to_vec(), vec![0.; 4]);
    }

    #[test]
    fn add_scaled_and_dot() {
        let w = WildTensor::from_vec(&[3], vec![1., 2., 3.]).unwrap();

        let mut x = SparseTensor::zeros(&[3]);
        x.increment(0, 1.);
        x.increment(2, 2.);

        assert_eq!(w.dot(&x).unwrap(), 7.);
        w.add_scaled(&x, 0.5).unwrap();
        assert_eq!(w.snapshot().to_vec(), vec![1.5, 2., 4.]);

        let wrong = SparseTensor::zeros(&[4]);
        assert!(w.dot(&wrong).is_err());
    }

    #[test]
    fn generate_from_param_gen() {
        let mut param_gen = ConstParamGen::new(0.25, 6);
        let w = WildTensor::generate(&[2, 3], &mut param_gen).unwrap();
        assert_eq!(w.snapshot().to_vec(), vec![0.25; 6]);

        let mut short = ConstParamGen::new(1., 3);
        let result = WildTensor::generate(&[4], &mut short);
        assert!(matches!(
            result,
            Err(TrainErr::ParamGenExhausted {
                got: 3,
                expected: 4
            })
        ));
    }
}
