mod gradient_step;
mod step;

pub use gradient_step::GradientStep;
pub use step::{ConcurrentStep, StepFunction};
