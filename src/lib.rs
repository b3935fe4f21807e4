pub mod accumulation;
pub mod config;
pub mod error;
pub mod execution;
pub mod initialization;
pub mod optimization;
pub mod regression;
pub mod storage;
pub mod tensor;
pub mod training;

pub use config::{Strategy, TrainerConfig};
pub use error::{Result, TrainErr};
pub use storage::ParameterStore;
pub use training::{Example, Trainer, TrainerBuilder};
