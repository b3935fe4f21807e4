use ndarray::{Array1, ArrayView1};

use super::{Layout, Tensor, check_shape};
use crate::error::{Result, TrainErr};

/// A tensor that stores every value contiguously.
#[derive(Debug, Clone, PartialEq)]
pub struct DenseTensor {
    shape: Vec<usize>,
    data: Array1<f32>,
}

impl DenseTensor {
    /// Creates a new zeroed `DenseTensor`.
    ///
    /// # Arguments
    /// * `shape` - The logical shape of the tensor.
    ///
    /// # Returns
    /// A new `DenseTensor` instance.
    pub fn zeros(shape: &[usize]) -> Self {
        let len: usize = shape.iter().product();

        Self {
            shape: shape.to_vec(),
            data: Array1::zeros(len),
        }
    }

    /// Creates a new `DenseTensor` from flat values in index order.
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

        Ok(Self {
            shape: shape.to_vec(),
            data: Array1::from_vec(values),
        })
    }

    /// A flat view over the values of the tensor.
    pub fn view(&self) -> ArrayView1<'_, f32> {
        self.data.view()
    }
}

impl Tensor for DenseTensor {
    fn shape(&self) -> &[usize] {
        &self.shape
    }

    fn layout(&self) -> Layout {
        Layout::Dense
    }

    fn zero(&mut self) {
        self.data.fill(0.);
    }

    fn get(&self, index: usize) -> f32 {
        self.data[index]
    }

    fn set(&mut self, index: usize, value: f32) {
        self.data[index] = value;
    }

    fn increment(&mut self, index: usize, delta: f32) {
        self.data[index] += delta;
    }

    fn for_each_active(&self, f: &mut dyn FnMut(usize, f32)) {
        self.data.iter().enumerate().for_each(|(i, &v)| f(i, v));
    }

    fn blank(&self) -> Box<dyn Tensor> {
        Box::new(Self::zeros(&self.shape))
    }

    fn boxed_clone(&self) -> Box<dyn Tensor> {
        Box::new(self.clone())
    }

    fn as_dense(&self) -> Option<&DenseTensor> {
        Some(self)
    }

    fn dot(&self, other: &dyn Tensor) -> Result<f32> {
        check_shape(&self.shape, other.shape())?;

        let sum = match other.as_dense() {
            Some(dense) => self.data.dot(&dense.data),
            None => {
                let mut sum = 0.;
                other.for_each_active(&mut |i, v| sum += v * self.data[i]);
                sum
            }
        };

        Ok(sum)
    }

    fn add_scaled(&mut self, other: &dyn Tensor, factor: f32) -> Result<()> {
        check_shape(&self.shape, other.shape())?;

        match other.as_dense() {
            Some(dense) => self.data.scaled_add(factor, &dense.data),
            None => other.for_each_active(&mut |i, v| self.data[i] += factor * v),
        }

        Ok(())
    }

    fn to_vec(&self) -> Vec<f32> {
        self.data.to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tensor::SparseTensor;

    #[test]
    fn zeros_cover_every_index_of_the_shape() {
        let t = DenseTensor::zeros(&[2, 3, 4]);
        assert_eq!(t.to_vec(), vec![0.; 24]);
        assert_eq!(t.shape(), &[2, 3, 4]);
    }

    #[test]
    fn from_vec_rejects_wrong_length() {
        let result = DenseTensor::from_vec(&[2, 2], vec![1., 2., 3.]);
        assert!(matches!(result, Err(TrainErr::ShapeMismatch { .. })));
    }

    #[test]
    fn dense_dot_products() {
        let a = DenseTensor::from_vec(&[3], vec![1., 2., 3.]).unwrap();
        let b = DenseTensor::from_vec(&[3], vec![4., 5., 6.]).unwrap();
        assert_eq!(a.dot(&b).unwrap(), 32.);

        let mut s = SparseTensor::zeros(&[3]);
        s.increment(2, 2.);
        assert_eq!(a.dot(&s).unwrap(), 6.);
        assert_eq!(s.dot(&a).unwrap(), 6.);
    }

    #[test]
    fn add_scaled_mixes_layouts() {
        let mut a = DenseTensor::zeros(&[2, 2]);
        let b = DenseTensor::from_vec(&[2, 2], vec![1., 1., 1., 1.]).unwrap();
        a.add_scaled(&b, 2.).unwrap();

        let mut s = SparseTensor::zeros(&[2, 2]);
        s.increment(3, 1.);
        s.increment(3, 1.);
        a.add_scaled(&s, -1.).unwrap();

        assert_eq!(a.to_vec(), vec![2., 2., 2., 0.]);
    }

    #[test]
    fn shape_mismatch_is_reported() {
        let mut a = DenseTensor::zeros(&[4]);
        let b = DenseTensor::zeros(&[2, 2]);

        assert!(a.dot(&b).is_err());
        assert!(a.add_scaled(&b, 1.).is_err());
    }
}
