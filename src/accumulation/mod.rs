mod gradient;
mod value;

pub use gradient::{GradientAccumulator, LocalGradient, SharedGradient};
pub use value::{LocalValue, SharedValue, ValueAccumulator};
