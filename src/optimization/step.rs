use crate::{error::Result, storage::ParameterStore, tensor::TensorSet};

/// Defines how the parameter store moves given an accumulated gradient and value.
pub trait StepFunction: Send {
    /// Applies one step to the parameters.
    ///
    /// # Arguments
    /// * `store` - The parameters to update.
    /// * `gradient` - The gradient accumulated since the previous step.
    /// * `value` - The objective value accumulated since the previous step.
    ///
    /// # Returns
    /// An error if the gradient doesn't match the parameters.
    fn step(&mut self, store: &ParameterStore, gradient: &TensorSet, value: f64) -> Result<()>;

    /// Whether the step function considers the parameters learned.
    fn is_converged(&self) -> bool;
}

/// A step function many workers can apply at the same time.
///
/// Each call only touches the store through its tensors' own operations, so concurrent
/// steps interleave at the granularity of a single tensor operation.
pub trait ConcurrentStep: Send + Sync {
    /// Applies one step to the parameters, see [`StepFunction::step`].
    fn step(&self, store: &ParameterStore, gradient: &TensorSet, value: f64) -> Result<()>;

    fn is_converged(&self) -> bool;
}

impl<S: StepFunction + ?Sized> StepFunction for Box<S> {
    fn step(&mut self, store: &ParameterStore, gradient: &TensorSet, value: f64) -> Result<()> {
        (**self).step(store, gradient, value)
    }

    fn is_converged(&self) -> bool {
        (**self).is_converged()
    }
}

impl<S: ConcurrentStep + ?Sized> ConcurrentStep for Box<S> {
    fn step(&self, store: &ParameterStore, gradient: &TensorSet, value: f64) -> Result<()> {
        (**self).step(store, gradient, value)
    }

    fn is_converged(&self) -> bool {
        (**self).is_converged()
    }
}
