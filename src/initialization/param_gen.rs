/// Generates the initial values of parameter tensors.
pub trait ParamGen {
    /// Writes generated values at the front of `out`.
    ///
    /// # Arguments
    /// * `out` - The buffer to fill, at most `out.len()` values are written.
    ///
    /// # Returns
    /// The amount of values written, 0 once the generator is exhausted.
    fn fill(&mut self, out: &mut [f32]) -> usize;
}

impl<PG: ParamGen + ?Sized> ParamGen for &mut PG {
    fn fill(&mut self, out: &mut [f32]) -> usize {
        (**self).fill(out)
    }
}
