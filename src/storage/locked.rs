use std::sync::Arc;

use parking_lot::RwLock;

use super::Weights;
use crate::{
    error::{Result, TrainErr},
    tensor::{DenseTensor, Tensor},
};

/// The highest tensor rank a `LockedTensor` accepts.
pub const MAX_RANK: usize = 4;

/// Decorates a parameter tensor with its own read/write lock.
///
/// Every operation takes the lock for its own duration only: reads share it, mutations
/// hold it exclusively. A `LockedTensor` never touches another tensor's lock, so locking
/// many of them can't deadlock.
#[derive(Debug)]
pub struct LockedTensor {
    lock: RwLock<()>,
    inner: Arc<dyn Weights>,
}

impl LockedTensor {
    /// Creates a new `LockedTensor` wrapping `inner`.
    ///
    /// # Arguments
    /// * `key` - The parameter key of `inner`, used for error reporting.
    /// * `inner` - The tensor to decorate.
    ///
    /// # Returns
    /// An `UnsupportedRank` error if the rank of `inner` isn't in `1..=MAX_RANK`.
    pub fn new(key: &str, inner: Arc<dyn Weights>) -> Result<Self> {
        let rank = inner.rank();
        if !(1..=MAX_RANK).contains(&rank) {
            return Err(TrainErr::UnsupportedRank {
                key: key.to_string(),
                rank,
            });
        }

        Ok(Self {
            lock: RwLock::new(()),
            inner,
        })
    }

    /// The decorated tensor.
    pub fn inner(&self) -> &Arc<dyn Weights> {
        &self.inner
    }
}

impl Weights for LockedTensor {
    fn shape(&self) -> &[usize] {
        self.inner.shape()
    }

    fn zero(&self) {
        let _guard = self.lock.write();
        self.inner.zero();
    }

    fn get(&self, index: usize) -> f32 {
        let _guard = self.lock.read();
        self.inner.get(index)
    }

    fn set(&self, index: usize, value: f32) {
        let _guard = self.lock.write();
        self.inner.set(index, value);
    }

    fn increment(&self, index: usize, delta: f32) {
        let _guard = self.lock.write();
        self.inner.increment(index, delta);
    }

    fn add_scaled(&self, other: &dyn Tensor, factor: f32) -> Result<()> {
        let _guard = self.lock.write();
        self.inner.add_scaled(other, factor)
    }

    fn dot(&self, other: &dyn Tensor) -> Result<f32> {
        let _guard = self.lock.read();
        self.inner.dot(other)
    }

    fn active_indices(&self) -> Vec<usize> {
        let _guard = self.lock.read();
        self.inner.active_indices()
    }

    fn snapshot(&self) -> DenseTensor {
        let _guard = self.lock.read();
        self.inner.snapshot()
    }

    fn is_locked(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;
    use crate::storage::WildTensor;

    #[test]
    fn concurrent_increments_are_not_lost() {
        const THREADS: usize = 8;
        const INDICES: usize = 4;
        const REPEATS: usize = 2_000;

        let inner = Arc::new(WildTensor::zeros(&[THREADS * INDICES]));
        let locked = LockedTensor::new("w", inner).unwrap();

        thread::scope(|s| {
            for t in 0..THREADS {
                let locked = &locked;
                s.spawn(move || {
                    for _ in 0..REPEATS {
                        for i in 0..INDICES {
                            locked.increment(t * INDICES + i, 1.0);
                        }
                    }
                });
            }
        });

        let values = locked.snapshot().to_vec();
        assert!(values.iter().all(|&v| v == REPEATS as f32), "{values:?}");
    }

    #[test]
    fn concurrent_increments_on_shared_index() {
        const THREADS: usize = 6;
        const REPEATS: usize = 1_000;

        let locked = LockedTensor::new("w", Arc::new(WildTensor::zeros(&[1]))).unwrap();

        thread::scope(|s| {
            for _ in 0..THREADS {
                s.spawn(|| (0..REPEATS).for_each(|_| locked.increment(0, 1.0)));
            }
        });

        assert_eq!(locked.get(0), (THREADS * REPEATS) as f32);
    }

    #[test]
    fn readers_see_whole_writes() {
        let locked = LockedTensor::new("w", Arc::new(WildTensor::zeros(&[64]))).unwrap();
        let ones = crate::tensor::DenseTensor::from_vec(&[64], vec![1.; 64]).unwrap();

        thread::scope(|s| {
            s.spawn(|| {
                for _ in 0..200 {
                    locked.add_scaled(&ones, 1.).unwrap();
                }
            });

            s.spawn(|| {
                for _ in 0..200 {
                    let snapshot = locked.snapshot().to_vec();
                    assert!(snapshot.iter().all(|&v| v == snapshot[0]));
                }
            });
        });
    }

    #[test]
    fn rejects_unsupported_ranks() {
        let scalar = LockedTensor::new("scalar", Arc::new(WildTensor::zeros(&[])));
        assert!(matches!(
            scalar,
            Err(TrainErr::UnsupportedRank { rank: 0, .. })
        ));

        let rank5 = LockedTensor::new("rank5", Arc::new(WildTensor::zeros(&[1, 1, 1, 1, 2])));
        assert!(matches!(rank5, Err(TrainErr::UnsupportedRank { rank: 5, .. })));

        let rank4 = LockedTensor::new("rank4", Arc::new(WildTensor::zeros(&[1, 2, 1, 2])));
        assert!(rank4.unwrap().is_locked());
    }
}
