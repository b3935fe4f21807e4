use parking_lot::{Mutex, MutexGuard};

use crate::{
    error::Result,
    tensor::{Tensor, TensorSet},
};

/// Receives the gradient contributions of examples.
pub trait GradientAccumulator {
    /// Adds `factor * contribution` into the tensor stored under `key`.
    ///
    /// # Returns
    /// An `UnknownKey` error if the target has no tensor under `key`, or a
    /// `ShapeMismatch` error if the shapes differ.
    fn accumulate(&mut self, key: &str, contribution: &dyn Tensor, factor: f32) -> Result<()>;

    /// Adds `delta` at `index` of the tensor stored under `key`.
    ///
    /// # Returns
    /// An `UnknownKey` error if the target has no tensor under `key`.
    fn accumulate_at(&mut self, key: &str, index: usize, delta: f32) -> Result<()>;
}

/// A gradient accumulator owned by a single thread.
#[derive(Debug, Clone)]
pub struct LocalGradient {
    target: TensorSet,
}

impl LocalGradient {
    /// Creates a new `LocalGradient` accumulating into `target`.
    pub fn new(target: TensorSet) -> Self {
        Self { target }
    }

    /// Zeroes the accumulated gradient.
    pub fn reset(&mut self) {
        self.target.zero();
    }

    /// Folds the gradient accumulated by `other` into this one.
    ///
    /// # Returns
    /// A `ShapeMismatch` error if both targets disagree on a tensor shape.
    pub fn merge(&mut self, other: &LocalGradient) -> Result<()> {
        self.target.add_scaled(&other.target, 1.)
    }

    /// Forces the lazily built tensors of the target into their final form.
    pub fn materialize(&mut self) {
        self.target.materialize();
    }

    pub fn target(&self) -> &TensorSet {
        &self.target
    }

    pub fn into_target(self) -> TensorSet {
        self.target
    }
}

impl GradientAccumulator for LocalGradient {
    fn accumulate(&mut self, key: &str, contribution: &dyn Tensor, factor: f32) -> Result<()> {
        self.target.require_mut(key)?.add_scaled(contribution, factor)
    }

    fn accumulate_at(&mut self, key: &str, index: usize, delta: f32) -> Result<()> {
        self.target.require_mut(key)?.increment(index, delta);
        Ok(())
    }
}

/// A gradient accumulator many threads can deposit into at once.
///
/// Deposits go through `&SharedGradient`, each one holds the accumulator's mutex for
/// its own duration.
#[derive(Debug)]
pub struct SharedGradient {
    target: Mutex<TensorSet>,
}

impl SharedGradient {
    /// Creates a new `SharedGradient` accumulating into `target`.
    pub fn new(target: TensorSet) -> Self {
        Self {
            target: Mutex::new(target),
        }
    }

    /// Zeroes the accumulated gradient.
    pub fn reset(&self) {
        self.target.lock().zero();
    }

    /// Locks the accumulated gradient for reading.
    pub fn lock(&self) -> MutexGuard<'_, TensorSet> {
        self.target.lock()
    }

    pub fn into_target(self) -> TensorSet {
        self.target.into_inner()
    }
}

impl GradientAccumulator for &SharedGradient {
    fn accumulate(&mut self, key: &str, contribution: &dyn Tensor, factor: f32) -> Result<()> {
        self.target
            .lock()
            .require_mut(key)?
            .add_scaled(contribution, factor)
    }

    fn accumulate_at(&mut self, key: &str, index: usize, delta: f32) -> Result<()> {
        self.target.lock().require_mut(key)?.increment(index, delta);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;
    use crate::tensor::{DenseTensor, SparseTensor};

    fn target() -> TensorSet {
        let mut set = TensorSet::new();
        set.insert("w", Box::new(DenseTensor::zeros(&[4])));
        set
    }

    #[test]
    fn local_accumulate_reset_and_merge() {
        let mut a = LocalGradient::new(target());
        let mut b = LocalGradient::new(target());

        let mut x = SparseTensor::zeros(&[4]);
        x.increment(1, 1.);

        a.accumulate("w", &x, 2.).unwrap();
        b.accumulate_at("w", 3, 5.).unwrap();
        a.merge(&b).unwrap();
        assert_eq!(a.target().get("w").unwrap().to_vec(), vec![0., 2., 0., 5.]);

        assert!(a.accumulate_at("missing", 0, 1.).is_err());

        a.reset();
        assert_eq!(a.target().get("w").unwrap().to_vec(), vec![0.; 4]);
    }

    #[test]
    fn shared_deposits_from_many_threads() {
        const THREADS: usize = 8;
        const REPEATS: usize = 500;

        let shared = SharedGradient::new(target());

        thread::scope(|s| {
            for t in 0..THREADS {
                let shared = &shared;
                s.spawn(move || {
                    let mut acc = shared;
                    for _ in 0..REPEATS {
                        acc.accumulate_at("w", t % 4, 1.).unwrap();
                    }
                });
            }
        });

        let total: f32 = shared.lock().get("w").unwrap().to_vec().iter().sum();
        assert_eq!(total, (THREADS * REPEATS) as f32);

        shared.reset();
        assert_eq!(shared.into_target().get("w").unwrap().to_vec(), vec![0.; 4]);
    }
}
