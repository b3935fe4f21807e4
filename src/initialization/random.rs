use rand::Rng;
use rand_distr::{Distribution, Normal, Uniform};

use super::ParamGen;
use crate::error::Result;

/// A parameter generator that follows a certain probabilistic distribution.
pub struct RandParamGen<R: Rng, D: Distribution<f32>> {
    rng: R,
    distribution: D,
    remaining: usize,
}

impl<R: Rng, D: Distribution<f32>> RandParamGen<R, D> {
    /// Creates a new `RandParamGen` parameter generator.
    ///
    /// # Arguments
    /// * `rng` - A random number generator.
    /// * `distribution` - The distribution to sample the random numbers from.
    /// * `limit` - The maximum amount of numbers to generate.
    pub fn new(rng: R, distribution: D, limit: usize) -> Self {
        Self {
            rng,
            distribution,
            remaining: limit,
        }
    }
}

impl<R: Rng> RandParamGen<R, Uniform<f32>> {
    /// Creates a new `RandParamGen` with a uniform distribution over `[low, high)`.
    ///
    /// # Returns
    /// A `Distribution` error if the range is invalid (low >= high).
    pub fn uniform(rng: R, limit: usize, low: f32, high: f32) -> Result<Self> {
        Ok(Self::new(rng, Uniform::new(low, high)?, limit))
    }
}

impl<R: Rng> RandParamGen<R, Normal<f32>> {
    /// Creates a new `RandParamGen` with a normal distribution.
    ///
    /// # Returns
    /// A `Distribution` error if `std_dev` is not finite (NaN or infinite).
    pub fn normal(rng: R, limit: usize, mean: f32, std_dev: f32) -> Result<Self> {
        Ok(Self::new(rng, Normal::new(mean, std_dev)?, limit))
    }
}

impl<R: Rng, D: Distribution<f32>> ParamGen for RandParamGen<R, D> {
    fn fill(&mut self, out: &mut [f32]) -> usize {
        let n = out.len().min(self.remaining);
        let samples = (&self.distribution).sample_iter(&mut self.rng);

        out[..n].iter_mut().zip(samples).for_each(|(slot, v)| *slot = v);
        self.remaining -= n;
        n
    }
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;

    #[test]
    fn uniform_stays_in_range() {
        let rng = StdRng::seed_from_u64(7);
        let mut param_gen = RandParamGen::uniform(rng, 100, -0.5, 0.5).unwrap();
        let mut out = vec![1.; 128];

        assert_eq!(param_gen.fill(&mut out), 100);
        assert!(out[..100].iter().all(|v| (-0.5..0.5).contains(v)));
        assert!(out[100..].iter().all(|&v| v == 1.));
        assert_eq!(param_gen.fill(&mut out), 0);
    }

    #[test]
    fn invalid_distributions_are_rejected() {
        assert!(RandParamGen::uniform(StdRng::seed_from_u64(0), 1, 1., 0.).is_err());
        assert!(RandParamGen::normal(StdRng::seed_from_u64(0), 1, 0., f32::NAN).is_err());
    }
}
