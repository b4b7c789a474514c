//! Configuration samplers

use log::trace;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Uniform};

use crate::common::{Configuration, Sampler};

/// Uniform sampling inside per-joint limits
pub struct RandomSampler<G: Rng = StdRng> {
    joints: Vec<Uniform<f64>>,
    rng: G,
}

impl RandomSampler<StdRng> {
    /// Sampler seeded from the OS
    pub fn new(lower: &[f64], upper: &[f64]) -> Self {
        Self::with_rng(lower, upper, StdRng::from_entropy())
    }

    /// Reproducible sampler
    pub fn seeded(lower: &[f64], upper: &[f64], seed: u64) -> Self {
        Self::with_rng(lower, upper, StdRng::seed_from_u64(seed))
    }
}

impl<G: Rng> RandomSampler<G> {
    /// Panics if the limit slices differ in length or `lower[i] > upper[i]`
    pub fn with_rng(lower: &[f64], upper: &[f64], rng: G) -> Self {
        assert_eq!(lower.len(), upper.len());
        let joints = lower
            .iter()
            .zip(upper.iter())
            .map(|(&lo, &hi)| Uniform::new_inclusive(lo, hi))
            .collect();
        RandomSampler { joints, rng }
    }

    pub fn dof(&self) -> usize {
        self.joints.len()
    }
}

impl<G: Rng> Sampler for RandomSampler<G> {
    fn gen_single_sample(&mut self) -> Option<Configuration> {
        let rng = &mut self.rng;
        Some(Configuration::from_iterator(
            self.joints.len(),
            self.joints.iter().map(|joint| joint.sample(&mut *rng)),
        ))
    }
}

/// Wraps a sampler and reports samples failing `is_valid` as failures, e.g.
/// to keep in-collision configurations out of a roadmap
pub struct RejectionSampler<S, F> {
    inner: S,
    is_valid: F,
}

impl<S, F> RejectionSampler<S, F>
where
    S: Sampler,
    F: Fn(&Configuration) -> bool,
{
    pub fn new(inner: S, is_valid: F) -> Self {
        RejectionSampler { inner, is_valid }
    }
}

impl<S, F> Sampler for RejectionSampler<S, F>
where
    S: Sampler,
    F: Fn(&Configuration) -> bool,
{
    fn gen_single_sample(&mut self) -> Option<Configuration> {
        let q = self.inner.gen_single_sample()?;
        if (self.is_valid)(&q) {
            Some(q)
        } else {
            trace!("rejected sample {:?}", q.as_slice());
            None
        }
    }
}
