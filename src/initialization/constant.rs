use super::ParamGen;

/// Generates the same value a limited amount of times.
#[derive(Debug, Clone)]
pub struct ConstParamGen {
    value: f32,
    remaining: usize,
}

impl ConstParamGen {
    /// Creates a new `ConstParamGen`.
    ///
    /// # Arguments
    /// * `value` - The value to generate.
    /// * `limit` - How many values to generate before running dry.
    pub fn new(value: f32, limit: usize) -> Self {
        Self {
            value,
            remaining: limit,
        }
    }
}

impl ParamGen for ConstParamGen {
    fn fill(&mut self, out: &mut [f32]) -> usize {
        let n = out.len().min(self.remaining);
        out[..n].fill(self.value);
        self.remaining -= n;
        n
    }
}
