//! Thinning Sampler
//!
//! Samples the next fire time of one jump type with Ogata-style thinning
//! against locally valid, refreshing bounds.
//!
//! # Algorithm
//!
//! ```text
//! t := t0
//! while t < end_time:
//!     (rate, lo, hi, L) := factory.window(prior, t0, t, u, p)
//!     hi < lo                        → fatal BoundInversion
//!     hi == 0                        → t += L, refresh (no draw)
//!     gap ~ Exp(hi)                  (one exponential draw)
//!     gap > L                        → t += L, refresh (draw discarded)
//!     t += gap
//!     t >= end_time                  → never
//!     lo == hi                       → accept (no uniform draw)
//!     v ~ U[0,1)                     (one uniform draw)
//!     v > lo/hi and v > rate(t)/hi   → reject, loop
//!     accept
//! never
//! ```
//!
//! The exact rate is only evaluated when the cheap lower-bound test fails.
//!
//! # Draw order
//!
//! One exponential draw per proposal, then at most one uniform draw. Any other
//! order changes trajectories under a fixed seed.

use tracing::trace;

use super::error::SamplingError;
use crate::core::time::NEVER;
use crate::models::{RateFactory, RateState, RateWindow};
use crate::rng::RandomSource;

/// Result of sampling one jump
#[derive(Debug, Clone)]
pub struct Proposal {
    /// Accepted fire time, or [`NEVER`] when the jump does not fire before the horizon
    pub time: f64,
    /// Record to persist for the jump
    pub rate_state: RateState,
}

impl Proposal {
    /// Whether the jump fires before the horizon (the time is not [`NEVER`])
    pub fn fires(&self) -> bool {
        self.time < NEVER
    }
}

/// Thinning sampler bound to a simulation horizon
#[derive(Debug, Clone, Copy)]
pub struct ThinningSampler {
    end_time: f64,
}

impl ThinningSampler {
    /// Sampler that reports [`NEVER`] for any candidate at or past `end_time`
    pub fn new(end_time: f64) -> Self {
        Self { end_time }
    }

    /// Simulation horizon the sampler was built for
    pub fn end_time(&self) -> f64 {
        self.end_time
    }

    /// Sample the next fire time of `jump` from `t0`
    ///
    /// # Arguments
    ///
    /// * `jump` - Index of the jump (for error reporting)
    /// * `factory` - The jump's rate factory
    /// * `prior` - The jump's persisted rate-state record
    /// * `u`, `p` - Current system state and parameters
    /// * `t0` - Time to sample from
    /// * `rng` - Random source
    ///
    /// # Errors
    ///
    /// Returns a [`SamplingError`] when the factory reports inverted or
    /// non-finite bounds, a non-positive window, or when the accepted time
    /// precedes `t0`.
    #[allow(clippy::too_many_arguments)]
    pub fn sample<U, P, R: RandomSource + ?Sized>(
        &self,
        jump: usize,
        factory: &dyn RateFactory<U, P>,
        prior: &RateState,
        u: &U,
        p: &P,
        t0: f64,
        rng: &mut R,
    ) -> Result<Proposal, SamplingError> {
        let mut t = t0;
        let mut installed: Option<RateState> = None;

        while t < self.end_time {
            let window = factory.window(prior, t0, t, u, p);
            check_window(jump, t, &window)?;
            let RateWindow {
                installed: state,
                lower,
                upper,
                length,
            } = window;

            if upper <= 0.0 {
                // Zero intensity over the whole window
                t += length;
                installed = Some(state);
                continue;
            }

            let gap = rng.sample_exp() / upper;
            if gap > length {
                trace!(jump, t, length, "Thinning window expired, refreshing bounds");
                t += length;
                installed = Some(state);
                continue;
            }

            t += gap;
            if t >= self.end_time {
                installed = Some(state);
                break;
            }

            if lower == upper {
                return accept(jump, t0, t, state);
            }

            let v = rng.sample_uniform();
            if v > lower / upper && v > factory.rate(&state, u, p, t) / upper {
                installed = Some(state);
                continue;
            }

            return accept(jump, t0, t, state);
        }

        Ok(Proposal {
            time: NEVER,
            rate_state: installed.unwrap_or_else(|| prior.clone()),
        })
    }
}

fn check_window(jump: usize, time: f64, window: &RateWindow) -> Result<(), SamplingError> {
    let RateWindow {
        lower,
        upper,
        length,
        ..
    } = *window;

    if lower.is_nan() || upper.is_nan() || !upper.is_finite() || lower < 0.0 {
        return Err(SamplingError::NonFiniteBound {
            jump,
            time,
            lower,
            upper,
        });
    }
    if upper < lower {
        return Err(SamplingError::BoundInversion {
            jump,
            time,
            lower,
            upper,
        });
    }
    if !(length > 0.0) {
        return Err(SamplingError::NonPositiveWindow { jump, time, length });
    }
    Ok(())
}

fn accept(jump: usize, t0: f64, t: f64, state: RateState) -> Result<Proposal, SamplingError> {
    if !(t >= t0) {
        return Err(SamplingError::ProposalBeforeOrigin {
            jump,
            origin: t0,
            proposed: t,
        });
    }
    Ok(Proposal {
        time: t,
        rate_state: state,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::RngManager;

    struct Bounds {
        lower: f64,
        upper: f64,
        length: f64,
    }

    impl RateFactory<(), ()> for Bounds {
        fn window(&self, _: &RateState, _: f64, _: f64, _: &(), _: &()) -> RateWindow {
            RateWindow {
                installed: RateState::opaque(self.upper),
                lower: self.lower,
                upper: self.upper,
                length: self.length,
            }
        }

        fn rate(&self, _: &RateState, _: &(), _: &(), _: f64) -> f64 {
            self.lower
        }
    }

    #[test]
    fn test_bound_inversion_is_fatal() {
        let factory = Bounds {
            lower: 2.0,
            upper: 1.0,
            length: 1.0,
        };
        let err = ThinningSampler::new(10.0)
            .sample(4, &factory, &RateState::Stateless, &(), &(), 0.0, &mut RngManager::new(1))
            .unwrap_err();

        assert_eq!(
            err,
            SamplingError::BoundInversion {
                jump: 4,
                time: 0.0,
                lower: 2.0,
                upper: 1.0
            }
        );
    }

    #[test]
    fn test_nan_and_negative_bounds_rejected() {
        let sampler = ThinningSampler::new(10.0);
        let mut rng = RngManager::new(1);
        for (lower, upper) in [(f64::NAN, 1.0), (-1.0, 1.0), (0.0, f64::INFINITY)] {
            let factory = Bounds {
                lower,
                upper,
                length: 1.0,
            };
            let result = sampler.sample(0, &factory, &RateState::Stateless, &(), &(), 0.0, &mut rng);
            assert!(
                matches!(result, Err(SamplingError::NonFiniteBound { .. })),
                "({}, {}) accepted",
                lower,
                upper
            );
        }
    }

    #[test]
    fn test_zero_window_rejected() {
        let factory = Bounds {
            lower: 0.5,
            upper: 1.0,
            length: 0.0,
        };
        let result = ThinningSampler::new(10.0).sample(
            0,
            &factory,
            &RateState::Stateless,
            &(),
            &(),
            0.0,
            &mut RngManager::new(1),
        );

        assert!(matches!(result, Err(SamplingError::NonPositiveWindow { .. })));
    }

    #[test]
    fn test_zero_rate_never_fires() {
        let factory = Bounds {
            lower: 0.0,
            upper: 0.0,
            length: f64::INFINITY,
        };
        let mut rng = RngManager::new(3);
        let before = rng.get_state();
        let proposal = ThinningSampler::new(10.0)
            .sample(0, &factory, &RateState::Stateless, &(), &(), 0.0, &mut rng)
            .unwrap();

        assert!(!proposal.fires());
        assert_eq!(rng.get_state(), before, "zero rate must not consume randomness");
        assert_eq!(proposal.rate_state.downcast_ref::<f64>(), Some(&0.0));
    }

    #[test]
    fn test_origin_past_horizon_keeps_prior() {
        let factory = Bounds {
            lower: 1.0,
            upper: 1.0,
            length: f64::INFINITY,
        };
        let prior = RateState::opaque("prior");
        let proposal = ThinningSampler::new(1.0)
            .sample(0, &factory, &prior, &(), &(), 2.0, &mut RngManager::new(3))
            .unwrap();

        assert_eq!(proposal.time, NEVER);
        assert_eq!(proposal.rate_state.downcast_ref::<&str>(), Some(&"prior"));
    }

    #[test]
    fn test_accepted_time_within_span_and_state_installed() {
        let factory = Bounds {
            lower: 0.5,
            upper: 2.0,
            length: 0.75,
        };
        let sampler = ThinningSampler::new(1_000.0);
        let mut rng = RngManager::new(11);

        for _ in 0..200 {
            let proposal = sampler
                .sample(0, &factory, &RateState::Stateless, &(), &(), 5.0, &mut rng)
                .unwrap();
            assert!(proposal.time >= 5.0);
            assert!(proposal.fires());
            assert_eq!(proposal.rate_state.downcast_ref::<f64>(), Some(&2.0));
        }
    }
}
