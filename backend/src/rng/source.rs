//! The random-source seam consumed by the thinning sampler.

use rand::Rng;
use rand_distr::{Distribution, Exp1};

/// Source of the two variates thinning needs.
///
/// Implementations must be deterministic for a given starting state if
/// trajectories are expected to be reproducible.
pub trait RandomSource {
    /// Standard exponential variate (rate 1). An Exp(λ) gap is `sample_exp() / λ`.
    fn sample_exp(&mut self) -> f64;

    /// Uniform variate in [0, 1).
    fn sample_uniform(&mut self) -> f64;
}

impl<T: RandomSource + ?Sized> RandomSource for &mut T {
    fn sample_exp(&mut self) -> f64 {
        (**self).sample_exp()
    }

    fn sample_uniform(&mut self) -> f64 {
        (**self).sample_uniform()
    }
}

/// Adapter exposing any `rand::Rng` as a [`RandomSource`].
///
/// # Example
/// ```
/// use jump_simulator_core_rs::rng::{RandSource, RandomSource};
/// use rand::SeedableRng;
/// use rand::rngs::StdRng;
///
/// let mut source = RandSource::new(StdRng::seed_from_u64(7));
/// assert!(source.sample_exp() >= 0.0);
/// ```
#[derive(Debug, Clone)]
pub struct RandSource<R> {
    inner: R,
}

impl<R: Rng> RandSource<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Rng> RandomSource for RandSource<R> {
    fn sample_exp(&mut self) -> f64 {
        Exp1.sample(&mut self.inner)
    }

    fn sample_uniform(&mut self) -> f64 {
        self.inner.random::<f64>()
    }
}
