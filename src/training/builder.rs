use std::sync::Arc;

use super::{
    BatchTrainer, Example, OnlineTrainer, ParallelBatchTrainer, ParallelOnlineTrainer,
    SynchronizedOnlineTrainer, ThreadLocalBatchTrainer, Trainer, TwoStageTrainer,
};
use crate::{
    config::{Strategy, TrainerConfig},
    error::Result,
    optimization::{ConcurrentStep, StepFunction},
    storage::ParameterStore,
};

/// Builds `Trainer`s given a configuration and a strategy.
#[derive(Debug, Clone, Default)]
pub struct TrainerBuilder {
    config: TrainerConfig,
}

impl TrainerBuilder {
    /// Creates a new `TrainerBuilder`.
    ///
    /// # Arguments
    /// * `config` - The settings every built trainer uses.
    pub fn new(config: TrainerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TrainerConfig {
        &self.config
    }

    /// Builds a new `Trainer` following a strategy.
    ///
    /// # Arguments
    /// * `strategy` - The way the trainer spreads work across threads.
    /// * `store` - The parameters to learn.
    /// * `step` - The step function, cloned once per stage of a two stage strategy.
    ///
    /// # Returns
    /// Any error the chosen trainer reports on construction.
    pub fn build<E, S>(
        &self,
        strategy: &Strategy,
        store: Arc<ParameterStore>,
        step: S,
    ) -> Result<Box<dyn Trainer<E>>>
    where
        E: Example + 'static,
        S: StepFunction + ConcurrentStep + Clone + 'static,
    {
        let config = &self.config;

        let trainer: Box<dyn Trainer<E>> = match strategy {
            Strategy::Batch => Box::new(BatchTrainer::new(store, step)),
            Strategy::Online => Box::new(OnlineTrainer::new(store, step, config)),
            Strategy::ParallelBatch => Box::new(ParallelBatchTrainer::new(store, step, config)?),
            Strategy::ThreadLocalBatch => {
                Box::new(ThreadLocalBatchTrainer::new(store, step, config)?)
            }
            Strategy::ParallelOnline => Box::new(ParallelOnlineTrainer::new(store, step, config)?),
            Strategy::SynchronizedOnline => {
                Box::new(SynchronizedOnlineTrainer::new(store, step, config)?)
            }
            Strategy::TwoStage { first, second } => {
                let first = self.build(first, Arc::clone(&store), step.clone())?;
                let second = self.build(second, store, step)?;
                Box::new(TwoStageTrainer::new(first, second))
            }
        };

        Ok(trainer)
    }
}
