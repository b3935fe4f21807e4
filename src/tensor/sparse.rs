use super::{Layout, Tensor};

/// A tensor that only stores assigned entries.
///
/// Increments are appended to an unsorted buffer and duplicate indices are allowed until
/// `materialize` sorts and coalesces them. Reads on an unmaterialized tensor are linear in
/// the amount of buffered entries.
#[derive(Debug, Clone, PartialEq)]
pub struct SparseTensor {
    shape: Vec<usize>,
    len: usize,
    indices: Vec<usize>,
    values: Vec<f32>,
    sorted: bool,
}

impl SparseTensor {
    /// Creates a new empty `SparseTensor`.
    ///
    /// # Arguments
    /// * `shape` - The logical shape of the tensor.
    ///
    /// # Returns
    /// A new `SparseTensor` instance.
    pub fn zeros(shape: &[usize]) -> Self {
        Self {
            shape: shape.to_vec(),
            len: shape.iter().product(),
            indices: Vec::new(),
            values: Vec::new(),
            sorted: true,
        }
    }

    /// Whether the buffer is sorted and free of duplicate indices.
    pub fn is_materialized(&self) -> bool {
        self.sorted
    }

    /// The amount of buffered entries, duplicates included.
    pub fn buffered(&self) -> usize {
        self.indices.len()
    }

    fn check_bounds(&self, index: usize) {
        assert!(
            index < self.len,
            "index {index} out of bounds for tensor of length {}",
            self.len
        );
    }

    fn position(&self, index: usize) -> Result<usize, usize> {
        self.indices.binary_search(&index)
    }
}

impl Tensor for SparseTensor {
    fn shape(&self) -> &[usize] {
        &self.shape
    }

    fn layout(&self) -> Layout {
        Layout::Sparse
    }

    fn zero(&mut self) {
        self.indices.clear();
        self.values.clear();
        self.sorted = true;
    }

    fn get(&self, index: usize) -> f32 {
        self.check_bounds(index);

        if self.sorted {
            return match self.position(index) {
                Ok(pos) => self.values[pos],
                Err(_) => 0.,
            };
        }

        self.indices
            .iter()
            .zip(&self.values)
            .filter(|(i, _)| **i == index)
            .map(|(_, v)| v)
            .sum()
    }

    fn set(&mut self, index: usize, value: f32) {
        self.check_bounds(index);
        self.materialize();

        match self.position(index) {
            Ok(pos) => self.values[pos] = value,
            Err(pos) => {
                self.indices.insert(pos, index);
                self.values.insert(pos, value);
            }
        }
    }

    fn increment(&mut self, index: usize, delta: f32) {
        self.check_bounds(index);

        match self.indices.last() {
            Some(&last) if last == index => {
                if let Some(v) = self.values.last_mut() {
                    *v += delta;
                }
                return;
            }
            Some(&last) if last > index => self.sorted = false,
            _ => {}
        }

        self.indices.push(index);
        self.values.push(delta);
    }

    fn for_each_active(&self, f: &mut dyn FnMut(usize, f32)) {
        self.indices
            .iter()
            .zip(&self.values)
            .for_each(|(&i, &v)| f(i, v));
    }

    fn blank(&self) -> Box<dyn Tensor> {
        Box::new(Self::zeros(&self.shape))
    }

    fn boxed_clone(&self) -> Box<dyn Tensor> {
        Box::new(self.clone())
    }

    fn materialize(&mut self) {
        if self.sorted {
            return;
        }

        let mut entries: Vec<(usize, f32)> = self
            .indices
            .drain(..)
            .zip(self.values.drain(..))
            .collect();
        entries.sort_unstable_by_key(|&(i, _)| i);

        for (i, v) in entries {
            match self.indices.last() {
                Some(&last) if last == i => {
                    if let Some(acc) = self.values.last_mut() {
                        *acc += v;
                    }
                }
                _ => {
                    self.indices.push(i);
                    self.values.push(v);
                }
            }
        }

        self.sorted = true;
    }

    fn len(&self) -> usize {
        self.len
    }

    fn active_indices(&self) -> Vec<usize> {
        if self.sorted {
            return self.indices.clone();
        }

        let mut indices = self.indices.clone();
        indices.sort_unstable();
        indices.dedup();
        indices
    }
}
