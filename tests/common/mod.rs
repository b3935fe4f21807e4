#![allow(dead_code)]

use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use paratrain::{
    Example, ParameterStore, Result, TrainErr,
    accumulation::{GradientAccumulator, ValueAccumulator},
    optimization::{ConcurrentStep, StepFunction},
    storage::WildTensor,
    tensor::TensorSet,
};
use parking_lot::Mutex;
use rayon::prelude::*;

pub const KEY: &str = "w";
pub const LEN: usize = 8;

/// What a step function was handed on one call.
#[derive(Debug, Clone, PartialEq)]
pub struct StepRecord {
    pub gradient: Vec<f32>,
    pub value: f64,
}

/// A step function that records its calls instead of touching the store.
#[derive(Debug, Clone, Default)]
pub struct RecordingStep {
    records: Arc<Mutex<Vec<StepRecord>>>,
    converge_after: Option<usize>,
    nested_work: bool,
}

impl RecordingStep {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn converging_after(steps: usize) -> Self {
        Self {
            converge_after: Some(steps),
            ..Self::default()
        }
    }

    /// A step that runs nested parallel work on every call before recording it.
    pub fn with_nested_work() -> Self {
        Self {
            nested_work: true,
            ..Self::default()
        }
    }

    pub fn records(&self) -> Vec<StepRecord> {
        self.records.lock().clone()
    }

    fn record(&self, gradient: &TensorSet, value: f64) -> Result<()> {
        if self.nested_work {
            assert_eq!(nested_count(), NESTED_TASKS);
        }

        let gradient = gradient
            .get(KEY)
            .ok_or_else(|| TrainErr::UnknownKey(KEY.to_string()))?
            .to_vec();

        self.records.lock().push(StepRecord { gradient, value });
        Ok(())
    }

    fn converged(&self) -> bool {
        self.converge_after
            .is_some_and(|n| self.records.lock().len() >= n)
    }
}

impl StepFunction for RecordingStep {
    fn step(&mut self, _: &ParameterStore, gradient: &TensorSet, value: f64) -> Result<()> {
        self.record(gradient, value)
    }

    fn is_converged(&self) -> bool {
        self.converged()
    }
}

impl ConcurrentStep for RecordingStep {
    fn step(&self, _: &ParameterStore, gradient: &TensorSet, value: f64) -> Result<()> {
        self.record(gradient, value)
    }

    fn is_converged(&self) -> bool {
        self.converged()
    }
}

/// A step function that succeeds a fixed amount of times and then keeps failing.
#[derive(Debug, Clone, Default)]
pub struct FailingStep {
    calls: Arc<AtomicUsize>,
    succeed: usize,
}

impl FailingStep {
    pub fn after(succeed: usize) -> Self {
        Self {
            succeed,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn attempt(&self) -> Result<()> {
        if self.calls.fetch_add(1, Ordering::SeqCst) < self.succeed {
            return Ok(());
        }

        Err(TrainErr::UnknownKey("failing-step".to_string()))
    }
}

impl StepFunction for FailingStep {
    fn step(&mut self, _: &ParameterStore, _: &TensorSet, _: f64) -> Result<()> {
        self.attempt()
    }

    fn is_converged(&self) -> bool {
        false
    }
}

impl ConcurrentStep for FailingStep {
    fn step(&self, _: &ParameterStore, _: &TensorSet, _: f64) -> Result<()> {
        self.attempt()
    }

    fn is_converged(&self) -> bool {
        false
    }
}

pub const NESTED_TASKS: usize = 256;

/// Counts to `NESTED_TASKS` with one parallel task per unit.
pub fn nested_count() -> usize {
    (0..NESTED_TASKS)
        .into_par_iter()
        .with_max_len(1)
        .map(|_| 1)
        .sum()
}

/// An example that runs nested parallel work, then deposits 1 at index 0 and as its value.
#[derive(Debug, Clone, Copy)]
pub struct NestedWork;

impl Example for NestedWork {
    fn accumulate(
        &self,
        _: &ParameterStore,
        gradient: &mut dyn GradientAccumulator,
        value: &mut dyn ValueAccumulator,
    ) -> Result<()> {
        let delta = (nested_count() / NESTED_TASKS) as f32;

        gradient.accumulate_at(KEY, 0, delta)?;
        value.accumulate(f64::from(delta));
        Ok(())
    }
}

/// An example that deposits `id + 1` at index `id % LEN` and as its value, or fails.
#[derive(Debug, Clone, Copy)]
pub struct Marker {
    pub id: usize,
    pub fail: bool,
}

impl Marker {
    pub fn new(id: usize) -> Self {
        Self { id, fail: false }
    }

    pub fn failing(id: usize) -> Self {
        Self { id, fail: true }
    }

    pub fn delta(&self) -> f32 {
        (self.id + 1) as f32
    }
}

impl Example for Marker {
    fn accumulate(
        &self,
        _: &ParameterStore,
        gradient: &mut dyn GradientAccumulator,
        value: &mut dyn ValueAccumulator,
    ) -> Result<()> {
        if self.fail {
            return Err(TrainErr::UnknownKey(format!("marker-{}", self.id)));
        }

        gradient.accumulate_at(KEY, self.id % LEN, self.delta())?;
        value.accumulate(f64::from(self.delta()));
        Ok(())
    }
}

pub fn markers(n: usize) -> Vec<Marker> {
    (0..n).map(Marker::new).collect()
}

pub fn create_test_store() -> Arc<ParameterStore> {
    let store = ParameterStore::new();
    store.insert(KEY, WildTensor::zeros(&[LEN]));
    Arc::new(store)
}
