use std::{collections::BTreeMap, sync::Arc};

use log::debug;
use parking_lot::RwLock;

use super::{LockedTensor, Weights};
use crate::{
    error::{Result, TrainErr},
    tensor::{DenseTensor, Layout, SparseTensor, Tensor, TensorSet},
};

/// The mutable collection of named parameter tensors being learned.
///
/// Each key maps to exactly one tensor at any instant. Replacing a key's tensor is an
/// atomic swap: callers that already hold the previous `Arc` keep using it, every lookup
/// after the swap sees the new one.
#[derive(Debug, Default)]
pub struct ParameterStore {
    weights: RwLock<BTreeMap<String, Arc<dyn Weights>>>,
}

impl ParameterStore {
    /// Creates a new empty `ParameterStore`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `weights` under `key`.
    ///
    /// # Arguments
    /// * `key` - The parameter key.
    /// * `weights` - The tensor to store.
    ///
    /// # Returns
    /// The tensor previously stored under `key`, if any.
    pub fn insert<W>(&self, key: impl Into<String>, weights: W) -> Option<Arc<dyn Weights>>
    where
        W: Weights + 'static,
    {
        self.replace(key, Arc::new(weights))
    }

    /// Swaps the tensor stored under `key` for `weights`.
    ///
    /// # Returns
    /// The tensor previously stored under `key`, if any.
    pub fn replace(
        &self,
        key: impl Into<String>,
        weights: Arc<dyn Weights>,
    ) -> Option<Arc<dyn Weights>> {
        self.weights.write().insert(key.into(), weights)
    }

    /// Looks up the tensor stored under `key`.
    ///
    /// # Returns
    /// An `UnknownKey` error if nothing is stored under `key`.
    pub fn get(&self, key: &str) -> Result<Arc<dyn Weights>> {
        self.weights
            .read()
            .get(key)
            .cloned()
            .ok_or_else(|| TrainErr::UnknownKey(key.to_string()))
    }

    /// All the parameter keys, in order.
    pub fn keys(&self) -> Vec<String> {
        self.weights.read().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.weights.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.read().is_empty()
    }

    /// Copies the current values stored under `key`.
    pub fn snapshot(&self, key: &str) -> Result<DenseTensor> {
        Ok(self.get(key)?.snapshot())
    }

    /// Creates a zeroed tensor shaped like the one stored under `key`.
    ///
    /// # Arguments
    /// * `key` - The parameter key to take the shape from.
    /// * `layout` - Whether the blank tensor is dense or sparse.
    ///
    /// # Returns
    /// An `UnknownKey` error if nothing is stored under `key`.
    pub fn blank(&self, key: &str, layout: Layout) -> Result<Box<dyn Tensor>> {
        let weights = self.get(key)?;
        Ok(blank_tensor(weights.shape(), layout))
    }

    /// Creates a zeroed tensor set with one tensor per parameter key.
    ///
    /// # Arguments
    /// * `layout` - Whether the blank tensors are dense or sparse.
    pub fn blank_set(&self, layout: Layout) -> TensorSet {
        let weights = self.weights.read();
        let mut set = TensorSet::new();

        for (key, w) in weights.iter() {
            set.insert(key.clone(), blank_tensor(w.shape(), layout));
        }

        set
    }

    /// Replaces every tensor of the store with a `LockedTensor` wrapping it.
    ///
    /// The swap happens under the store's write lock, either every key is wrapped or none
    /// is. This is a one-time setup step.
    ///
    /// # Returns
    /// An `AlreadyLocked` error if any tensor is already locked, or an `UnsupportedRank`
    /// error if any tensor can't be decorated.
    pub fn lock_tensors(&self) -> Result<()> {
        let mut weights = self.weights.write();

        if let Some((key, _)) = weights.iter().find(|(_, w)| w.is_locked()) {
            return Err(TrainErr::AlreadyLocked { key: key.clone() });
        }

        let mut locked = Vec::with_capacity(weights.len());
        for (key, w) in weights.iter() {
            locked.push((key.clone(), LockedTensor::new(key, Arc::clone(w))?));
        }

        for (key, tensor) in locked {
            weights.insert(key, Arc::new(tensor));
        }

        debug!(tensors = weights.len(); "parameter tensors wrapped in locks");
        Ok(())
    }
}

fn blank_tensor(shape: &[usize], layout: Layout) -> Box<dyn Tensor> {
    match layout {
        Layout::Dense => Box::new(DenseTensor::zeros(shape)),
        Layout::Sparse => Box::new(SparseTensor::zeros(shape)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::WildTensor;

    fn create_test_store() -> ParameterStore {
        let store = ParameterStore::new();
        store.insert("bias", WildTensor::zeros(&[1]));
        store.insert("weights", WildTensor::zeros(&[2, 3]));
        store
    }

    #[test]
    fn lookups_and_swaps() {
        let store = create_test_store();
        assert_eq!(store.keys(), vec!["bias", "weights"]);
        assert!(matches!(store.get("missing"), Err(TrainErr::UnknownKey(_))));

        let before = store.get("bias").unwrap();
        let previous = store.insert("bias", WildTensor::from_vec(&[1], vec![5.]).unwrap());

        assert!(previous.is_some());
        assert_eq!(before.get(0), 0.);
        assert_eq!(store.get("bias").unwrap().get(0), 5.);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn blanks_follow_parameter_shapes() {
        let store = create_test_store();

        let dense = store.blank("weights", Layout::Dense).unwrap();
        assert_eq!(dense.shape(), &[2, 3]);
        assert_eq!(dense.layout(), Layout::Dense);

        let set = store.blank_set(Layout::Sparse);
        assert_eq!(set.len(), 2);
        assert_eq!(set.get("weights").unwrap().layout(), Layout::Sparse);
        assert!(set.get("weights").unwrap().active_indices().is_empty());
    }

    #[test]
    fn lock_tensors_wraps_every_key_once() {
        let store = create_test_store();
        let original = store.get("weights").unwrap();
        original.set(4, 2.);

        store.lock_tensors().unwrap();

        for key in store.keys() {
            assert!(store.get(&key).unwrap().is_locked(), "{key} isn't locked");
        }

        assert_eq!(store.get("weights").unwrap().get(4), 2.);
        store.get("weights").unwrap().increment(4, 1.);
        assert_eq!(original.get(4), 3.);
    }

    #[test]
    fn lock_tensors_twice_is_rejected() {
        let store = create_test_store();
        store.lock_tensors().unwrap();

        let result = store.lock_tensors();
        assert!(matches!(result, Err(TrainErr::AlreadyLocked { .. })));

        let weights = store.get("weights").unwrap();
        assert!(weights.is_locked());
    }

    #[test]
    fn lock_tensors_is_all_or_nothing() {
        let store = create_test_store();
        store.insert("scalar", WildTensor::zeros(&[]));

        let result = store.lock_tensors();
        assert!(matches!(result, Err(TrainErr::UnsupportedRank { rank: 0, .. })));
        assert!(store.keys().iter().all(|k| !store.get(k).unwrap().is_locked()));
    }
}
