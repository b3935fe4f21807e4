mod dense;
mod set;
mod sparse;
mod tensor;

pub use dense::DenseTensor;
pub use set::TensorSet;
pub use sparse::SparseTensor;
pub(crate) use tensor::check_shape;
pub use tensor::{Layout, Tensor};
