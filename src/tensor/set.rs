use std::collections::{BTreeMap, btree_map};

use super::Tensor;
use crate::error::{Result, TrainErr};

/// A collection of tensors addressed by parameter key, shaped like a `ParameterStore`.
#[derive(Debug, Clone, Default)]
pub struct TensorSet {
    tensors: BTreeMap<String, Box<dyn Tensor>>,
}

impl TensorSet {
    /// Creates a new empty `TensorSet`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `tensor` under `key`, returning the previous tensor if any.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        tensor: Box<dyn Tensor>,
    ) -> Option<Box<dyn Tensor>> {
        self.tensors.insert(key.into(), tensor)
    }

    pub fn get(&self, key: &str) -> Option<&dyn Tensor> {
        self.tensors.get(key).map(|t| &**t)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Box<dyn Tensor>> {
        self.tensors.get_mut(key)
    }

    /// Like `get_mut` but fails with `UnknownKey` when `key` is missing.
    pub fn require_mut(&mut self, key: &str) -> Result<&mut Box<dyn Tensor>> {
        self.tensors
            .get_mut(key)
            .ok_or_else(|| TrainErr::UnknownKey(key.to_string()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.tensors.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &dyn Tensor)> {
        self.tensors.iter().map(|(k, t)| (k.as_str(), &**t))
    }

    pub fn len(&self) -> usize {
        self.tensors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tensors.is_empty()
    }

    /// Zeroes every tensor of the set.
    pub fn zero(&mut self) {
        self.tensors.values_mut().for_each(|t| t.zero());
    }

    /// Materializes every tensor of the set.
    pub fn materialize(&mut self) {
        self.tensors.values_mut().for_each(|t| t.materialize());
    }

    /// Adds `factor * other` into this set, key by key. Keys only present in `other`
    /// are copied over.
    ///
    /// # Arguments
    /// * `other` - The set to fold into this one.
    /// * `factor` - The scale applied to `other`.
    ///
    /// # Returns
    /// A `ShapeMismatch` error if a shared key holds tensors of different shapes.
    pub fn add_scaled(&mut self, other: &TensorSet, factor: f32) -> Result<()> {
        for (key, tensor) in &other.tensors {
            match self.tensors.entry(key.clone()) {
                btree_map::Entry::Occupied(mut entry) => {
                    entry.get_mut().add_scaled(&**tensor, factor)?;
                }
                btree_map::Entry::Vacant(entry) => {
                    let mut copy = tensor.blank();
                    copy.add_scaled(&**tensor, factor)?;
                    entry.insert(copy);
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tensor::{DenseTensor, SparseTensor};

    #[test]
    fn add_scaled_merges_matching_keys() {
        let mut a = TensorSet::new();
        a.insert("w", Box::new(DenseTensor::from_vec(&[2], vec![1., 1.]).unwrap()));

        let mut b = TensorSet::new();
        let mut s = SparseTensor::zeros(&[2]);
        s.increment(1, 2.);
        b.insert("w", Box::new(s));
        b.insert("bias", Box::new(DenseTensor::from_vec(&[1], vec![3.]).unwrap()));

        a.add_scaled(&b, 0.5).unwrap();

        assert_eq!(a.get("w").unwrap().to_vec(), vec![1., 2.]);
        assert_eq!(a.get("bias").unwrap().to_vec(), vec![1.5]);
        assert_eq!(b.get("bias").unwrap().to_vec(), vec![3.]);
    }

    #[test]
    fn zero_resets_all_tensors() {
        let mut set = TensorSet::new();
        set.insert("w", Box::new(DenseTensor::from_vec(&[2], vec![1., 2.]).unwrap()));
        set.zero();

        assert_eq!(set.get("w").unwrap().to_vec(), vec![0., 0.]);
        assert!(set.require_mut("missing").is_err());
    }
}
