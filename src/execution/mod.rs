mod pool;
mod slots;

pub use pool::WorkerPool;
pub use slots::PerWorker;
