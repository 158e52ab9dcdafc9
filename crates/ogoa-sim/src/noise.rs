//! Pluggable randomness for the range sampler.
//!
//! [`RangeSampler`](crate::sampler::RangeSampler) only talks to the
//! [`RandomSource`] trait, so tests can swap in a silent or scripted source.
//! [`NoiseGenerator`] is the production implementation.

use rand::prelude::*;
use rand::rngs::SmallRng;
use rand_distr::{StandardNormal, Uniform};

/// Source of the random draws the sampler needs.
pub trait RandomSource {
    /// Zero-mean Gaussian sample with the given standard deviation.
    fn gaussian(&mut self, stddev: f64) -> f64;

    /// Uniform sample in `[0, 1)`.
    fn uniform(&mut self) -> f64;

    /// `true` with the given probability.
    fn chance(&mut self, probability: f64) -> bool {
        self.uniform() < probability
    }
}

/// Gaussian / uniform noise backed by a small fast RNG.
#[derive(Clone)]
pub struct NoiseGenerator {
    rng: SmallRng,
}

impl NoiseGenerator {
    /// A seed of 0 draws from OS entropy; anything else is reproducible.
    pub fn new(seed: u64) -> Self {
        let rng = if seed == 0 {
            SmallRng::from_entropy()
        } else {
            SmallRng::seed_from_u64(seed)
        };
        Self { rng }
    }
}

impl RandomSource for NoiseGenerator {
    #[inline]
    fn gaussian(&mut self, stddev: f64) -> f64 {
        if stddev == 0.0 {
            return 0.0;
        }
        let n: f64 = self.rng.sample(StandardNormal);
        n * stddev
    }

    #[inline]
    fn uniform(&mut self) -> f64 {
        Uniform::new(0.0f64, 1.0).sample(&mut self.rng)
    }
}

impl std::fmt::Debug for NoiseGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NoiseGenerator").finish_non_exhaustive()
    }
}

/// Source that never perturbs anything: no noise, no glitches, no dropouts.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct SilentSource;

#[cfg(test)]
impl RandomSource for SilentSource {
    fn gaussian(&mut self, _stddev: f64) -> f64 {
        0.0
    }

    fn uniform(&mut self) -> f64 {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_generators_agree() {
        let mut a = NoiseGenerator::new(42);
        let mut b = NoiseGenerator::new(42);
        for _ in 0..100 {
            assert_eq!(a.gaussian(9.0), b.gaussian(9.0));
            assert_eq!(a.uniform(), b.uniform());
        }
    }

    #[test]
    fn zero_stddev_is_silent() {
        let mut noise = NoiseGenerator::new(7);
        for _ in 0..10 {
            assert_eq!(noise.gaussian(0.0), 0.0);
        }
    }

    #[test]
    fn chance_tracks_probability() {
        let mut noise = NoiseGenerator::new(42);
        let trials = 10_000;
        let hits = (0..trials).filter(|_| noise.chance(0.3)).count();
        let ratio = hits as f64 / trials as f64;
        assert!((ratio - 0.3).abs() < 0.05);
    }

    #[test]
    fn silent_source_never_fires() {
        let mut s = SilentSource;
        assert_eq!(s.gaussian(40.0), 0.0);
        assert!(!s.chance(0.3));
        // Even probability 1 does not fire because uniform() returns 1.0.
        assert!(!s.chance(1.0));
    }
}
