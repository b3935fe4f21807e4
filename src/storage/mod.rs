mod locked;
mod store;
mod weights;
mod wild;

pub use locked::{LockedTensor, MAX_RANK};
pub use store::ParameterStore;
pub use weights::Weights;
pub use wild::WildTensor;
