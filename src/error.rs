use std::{error::Error, fmt, io};

use rand_distr::{NormalError, uniform::Error as UniformError};
use rayon::ThreadPoolBuildError;

/// The result type used across the whole crate.
pub type Result<T> = std::result::Result<T, TrainErr>;

/// The training driver's error type.
#[derive(Debug)]
pub enum TrainErr {
    InvalidWorkerCount {
        got: usize,
    },
    ThreadPool(ThreadPoolBuildError),
    UnsupportedRank {
        key: String,
        rank: usize,
    },
    AlreadyLocked {
        key: String,
    },
    UnknownKey(String),
    ShapeMismatch {
        expected: Vec<usize>,
        got: Vec<usize>,
    },
    ParamGenExhausted {
        got: usize,
        expected: usize,
    },
    Distribution(String),
    Config(serde_json::Error),
    Io(io::Error),
}

impl fmt::Display for TrainErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrainErr::InvalidWorkerCount { got } => {
                write!(f, "invalid worker count: got {got}, expected at least 1")
            }
            TrainErr::ThreadPool(e) => write!(f, "failed to build worker pool: {e}"),
            TrainErr::UnsupportedRank { key, rank } => {
                write!(f, "tensor `{key}` has unsupported rank {rank}")
            }
            TrainErr::AlreadyLocked { key } => {
                write!(f, "tensor `{key}` is already wrapped in a lock")
            }
            TrainErr::UnknownKey(key) => write!(f, "no tensor stored under key `{key}`"),
            TrainErr::ShapeMismatch { expected, got } => {
                write!(f, "shape mismatch: got {got:?}, expected {expected:?}")
            }
            TrainErr::ParamGenExhausted { got, expected } => write!(
                f,
                "parameter generator exhausted after {got} of {expected} values"
            ),
            TrainErr::Distribution(detail) => write!(f, "invalid distribution: {detail}"),
            TrainErr::Config(e) => write!(f, "invalid configuration: {e}"),
            TrainErr::Io(e) => write!(f, "io error: {e}"),
        }
    }
}

impl Error for TrainErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            TrainErr::ThreadPool(e) => Some(e),
            TrainErr::Config(e) => Some(e),
            TrainErr::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for TrainErr {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for TrainErr {
    fn from(value: serde_json::Error) -> Self {
        Self::Config(value)
    }
}

impl From<ThreadPoolBuildError> for TrainErr {
    fn from(value: ThreadPoolBuildError) -> Self {
        Self::ThreadPool(value)
    }
}

impl From<NormalError> for TrainErr {
    fn from(value: NormalError) -> Self {
        Self::Distribution(value.to_string())
    }
}

impl From<UniformError> for TrainErr {
    fn from(value: UniformError) -> Self {
        Self::Distribution(value.to_string())
    }
}

/// Boundary conversion for binaries / I/O APIs.
impl From<TrainErr> for io::Error {
    fn from(value: TrainErr) -> Self {
        match value {
            TrainErr::Io(e) => e,
            other => io::Error::new(io::ErrorKind::InvalidData, other),
        }
    }
}
