use parking_lot::Mutex;

/// Receives the objective value contributions of examples.
pub trait ValueAccumulator {
    fn accumulate(&mut self, value: f64);
}

/// A value accumulator owned by a single thread.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LocalValue {
    value: f64,
}

impl LocalValue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.value = 0.;
    }

    pub fn merge(&mut self, other: &LocalValue) {
        self.value += other.value;
    }

    pub fn value(&self) -> f64 {
        self.value
    }
}

impl ValueAccumulator for LocalValue {
    fn accumulate(&mut self, value: f64) {
        self.value += value;
    }
}

/// A value accumulator many threads can deposit into at once.
#[derive(Debug, Default)]
pub struct SharedValue {
    value: Mutex<f64>,
}

impl SharedValue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&self) {
        *self.value.lock() = 0.;
    }

    pub fn value(&self) -> f64 {
        *self.value.lock()
    }
}

impl ValueAccumulator for &SharedValue {
    fn accumulate(&mut self, value: f64) {
        *self.value.lock() += value;
    }
}
