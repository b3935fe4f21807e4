use std::sync::Arc;

use crate::{
    accumulation::{GradientAccumulator, ValueAccumulator},
    error::Result,
    storage::ParameterStore,
};

/// A training example, able to deposit its contribution to the objective.
pub trait Example: Send + Sync {
    /// Adds this example's gradient and objective value at the current parameters.
    ///
    /// # Arguments
    /// * `store` - The parameters to evaluate the example at.
    /// * `gradient` - Where the gradient contribution is deposited.
    /// * `value` - Where the objective value contribution is deposited.
    ///
    /// # Returns
    /// An error if the example doesn't fit the parameters.
    fn accumulate(
        &self,
        store: &ParameterStore,
        gradient: &mut dyn GradientAccumulator,
        value: &mut dyn ValueAccumulator,
    ) -> Result<()>;
}

impl<E: Example + ?Sized> Example for &E {
    fn accumulate(
        &self,
        store: &ParameterStore,
        gradient: &mut dyn GradientAccumulator,
        value: &mut dyn ValueAccumulator,
    ) -> Result<()> {
        (**self).accumulate(store, gradient, value)
    }
}

impl<E: Example + ?Sized> Example for Box<E> {
    fn accumulate(
        &self,
        store: &ParameterStore,
        gradient: &mut dyn GradientAccumulator,
        value: &mut dyn ValueAccumulator,
    ) -> Result<()> {
        (**self).accumulate(store, gradient, value)
    }
}

impl<E: Example + ?Sized> Example for Arc<E> {
    fn accumulate(
        &self,
        store: &ParameterStore,
        gradient: &mut dyn GradientAccumulator,
        value: &mut dyn ValueAccumulator,
    ) -> Result<()> {
        (**self).accumulate(store, gradient, value)
    }
}
