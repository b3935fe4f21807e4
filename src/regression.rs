use crate::{
    accumulation::{GradientAccumulator, ValueAccumulator},
    error::Result,
    storage::ParameterStore,
    tensor::Tensor,
    training::Example,
};

/// A least squares regression example, `y ~ w · x`.
///
/// Its objective value is `-r² / 2` with `r = y - w · x`, so ascending the gradient
/// `r * x` fits the weights stored under `key`.
#[derive(Debug, Clone)]
pub struct LeastSquares<T: Tensor> {
    key: String,
    features: T,
    target: f32,
}

impl<T: Tensor> LeastSquares<T> {
    /// Creates a new `LeastSquares` example.
    ///
    /// # Arguments
    /// * `key` - The key of the weights this example fits.
    /// * `features` - The example's inputs, shaped like the weights.
    /// * `target` - The expected output.
    ///
    /// # Returns
    /// A new `LeastSquares` instance.
    pub fn new(key: impl Into<String>, features: T, target: f32) -> Self {
        Self {
            key: key.into(),
            features,
            target,
        }
    }

    pub fn features(&self) -> &T {
        &self.features
    }

    pub fn target(&self) -> f32 {
        self.target
    }

    /// The residual `y - w · x` at the current parameters.
    pub fn residual(&self, store: &ParameterStore) -> Result<f32> {
        let weights = store.get(&self.key)?;
        Ok(self.target - weights.dot(&self.features)?)
    }
}

impl<T: Tensor> Example for LeastSquares<T> {
    fn accumulate(
        &self,
        store: &ParameterStore,
        gradient: &mut dyn GradientAccumulator,
        value: &mut dyn ValueAccumulator,
    ) -> Result<()> {
        let r = self.residual(store)?;

        gradient.accumulate(&self.key, &self.features, r)?;
        value.accumulate(-0.5 * f64::from(r).powi(2));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        accumulation::{LocalGradient, LocalValue},
        error::TrainErr,
        storage::WildTensor,
        tensor::{DenseTensor, Layout, SparseTensor},
    };

    fn create_test_store() -> ParameterStore {
        let store = ParameterStore::new();
        store.insert("w", WildTensor::from_vec(&[3], vec![1., 0., 2.]).unwrap());
        store
    }

    #[test]
    fn deposits_residual_scaled_features() {
        let store = create_test_store();
        let x = DenseTensor::from_vec(&[3], vec![1., 1., 1.]).unwrap();
        let example = LeastSquares::new("w", x, 5.);

        let mut gradient = LocalGradient::new(store.blank_set(Layout::Dense));
        let mut value = LocalValue::new();
        example.accumulate(&store, &mut gradient, &mut value).unwrap();

        assert_eq!(example.residual(&store).unwrap(), 2.);
        assert_eq!(gradient.target().get("w").unwrap().to_vec(), vec![2., 2., 2.]);
        assert_eq!(value.value(), -2.);
    }

    #[test]
    fn sparse_features_only_touch_their_indices() {
        let store = create_test_store();
        let mut x = SparseTensor::zeros(&[3]);
        x.increment(2, 1.);
        let example = LeastSquares::new("w", x, 1.);

        let mut gradient = LocalGradient::new(store.blank_set(Layout::Sparse));
        let mut value = LocalValue::new();
        example.accumulate(&store, &mut gradient, &mut value).unwrap();

        let g = gradient.target().get("w").unwrap();
        assert_eq!(g.active_indices(), vec![2]);
        assert_eq!(g.get(2), -1.);
    }

    #[test]
    fn mismatched_features_fail() {
        let store = create_test_store();
        let example = LeastSquares::new("w", DenseTensor::zeros(&[4]), 0.);

        let mut gradient = LocalGradient::new(store.blank_set(Layout::Dense));
        let mut value = LocalValue::new();
        let result = example.accumulate(&store, &mut gradient, &mut value);

        assert!(matches!(result, Err(TrainErr::ShapeMismatch { .. })));
    }
}
