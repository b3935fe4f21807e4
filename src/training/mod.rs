mod batch;
mod builder;
mod example;
mod online;
mod parallel_batch;
mod parallel_online;
mod status;
mod synchronized_online;
mod thread_local_batch;
mod trainer;
mod two_stage;

pub use batch::BatchTrainer;
pub use builder::TrainerBuilder;
pub use example::Example;
pub use online::OnlineTrainer;
pub use parallel_batch::ParallelBatchTrainer;
pub use parallel_online::ParallelOnlineTrainer;
pub use synchronized_online::SynchronizedOnlineTrainer;
pub use thread_local_batch::ThreadLocalBatchTrainer;
pub use trainer::Trainer;
pub use two_stage::TwoStageTrainer;
