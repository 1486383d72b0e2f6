//! Sinusoidally modulated Poisson intensity
//!
//! `λ(t) = mean + amplitude · sin(frequency · t)`, bounded by
//! `mean ± |amplitude|` over fixed refresh windows. Stateless: the rate depends
//! on time only.

use serde::{Deserialize, Serialize};

use crate::aggregator::ConfigError;
use crate::models::{RateFactory, RateState, RateWindow};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PeriodicRate {
    pub mean: f64,
    pub amplitude: f64,
    pub frequency: f64,
    /// Length of each bound window
    pub refresh: f64,
}

impl PeriodicRate {
    /// Validated rate: non-negative intensity everywhere, positive refresh window
    pub fn new(mean: f64, amplitude: f64, frequency: f64, refresh: f64) -> Result<Self, ConfigError> {
        let finite = mean.is_finite() && amplitude.is_finite() && frequency.is_finite();
        if !finite || mean < amplitude.abs() || !(refresh > 0.0) {
            return Err(ConfigError::InvalidParameter(format!(
                "periodic rate needs mean >= |amplitude| and refresh > 0 \
                 (got mean={}, amplitude={}, refresh={})",
                mean, amplitude, refresh
            )));
        }
        Ok(Self {
            mean,
            amplitude,
            frequency,
            refresh,
        })
    }

    pub fn intensity(&self, t: f64) -> f64 {
        self.mean + self.amplitude * (self.frequency * t).sin()
    }

    /// Integral of the intensity over `[t0, t1]`
    pub fn expected_count(&self, t0: f64, t1: f64) -> f64 {
        let base = self.mean * (t1 - t0);
        if self.frequency == 0.0 {
            return base;
        }
        let w = self.frequency;
        base + self.amplitude * ((w * t0).cos() - (w * t1).cos()) / w
    }
}

impl<U, P> RateFactory<U, P> for PeriodicRate {
    fn window(&self, _prior: &RateState, _t0: f64, _t: f64, _u: &U, _p: &P) -> RateWindow {
        RateWindow {
            installed: RateState::Stateless,
            lower: self.mean - self.amplitude.abs(),
            upper: self.mean + self.amplitude.abs(),
            length: self.refresh,
        }
    }

    fn rate(&self, _installed: &RateState, _u: &U, _p: &P, t: f64) -> f64 {
        self.intensity(t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_rates_rejected() {
        assert!(PeriodicRate::new(1.0, 2.0, 1.0, 0.5).is_err());
        assert!(PeriodicRate::new(1.0, 0.5, 1.0, 0.0).is_err());
        assert!(PeriodicRate::new(f64::INFINITY, 0.5, 1.0, 0.5).is_err());
    }

    #[test]
    fn test_bounds_contain_intensity() {
        let rate = PeriodicRate::new(2.0, -1.5, 3.0, 0.25).unwrap();
        let window = RateFactory::<(), ()>::window(&rate, &RateState::Stateless, 0.0, 0.0, &(), &());

        for step in 0..1000 {
            let t = step as f64 * 0.01;
            let value = rate.intensity(t);
            assert!(value >= window.lower - 1e-12 && value <= window.upper + 1e-12);
        }
    }

    #[test]
    fn test_expected_count_constant_case() {
        let rate = PeriodicRate::new(2.0, 0.0, 0.0, 1.0).unwrap();
        assert_eq!(rate.expected_count(1.0, 4.0), 6.0);
    }

    #[test]
    fn test_expected_count_full_periods() {
        let w = 2.0 * std::f64::consts::PI;
        let rate = PeriodicRate::new(3.0, 1.0, w, 0.1).unwrap();
        assert!((rate.expected_count(0.0, 5.0) - 15.0).abs() < 1e-9);
    }
}
