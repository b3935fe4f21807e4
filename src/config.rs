use std::{fs, num::NonZeroUsize, path::Path, thread};

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// The settings every trainer is built from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainerConfig {
    /// The amount of worker threads of the parallel strategies.
    pub workers: usize,
    /// The amount of `process_examples` calls after which the online strategies converge.
    pub max_iterations: usize,
    /// The amount of examples between status lines, 0 disables them.
    pub log_every: usize,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            workers: thread::available_parallelism().map_or(1, NonZeroUsize::get),
            max_iterations: 3,
            log_every: 1000,
        }
    }
}

impl TrainerConfig {
    /// Parses a configuration from JSON, missing fields take their default.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads and parses the JSON configuration file at `path`.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}

/// The strategy a trainer uses to spread work across threads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    Batch,
    Online,
    ParallelBatch,
    ThreadLocalBatch,
    ParallelOnline,
    SynchronizedOnline,
    TwoStage {
        first: Box<Strategy>,
        second: Box<Strategy>,
    },
}
