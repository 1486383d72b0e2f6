//! Shared test helpers
#![allow(dead_code)]

use std::cell::Cell;
use std::collections::VecDeque;

use jump_simulator_core_rs::models::{ExcitationKernel, RateFactory, RateState, RateWindow};
use jump_simulator_core_rs::rng::RandomSource;

/// Which variate a [`ScriptedSource`] handed out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Draw {
    Exp,
    Uniform,
}

/// Random source replaying fixed variates and recording the draw order
#[derive(Debug, Default)]
pub struct ScriptedSource {
    exps: VecDeque<f64>,
    uniforms: VecDeque<f64>,
    pub draws: Vec<Draw>,
}

impl ScriptedSource {
    pub fn new(exps: &[f64], uniforms: &[f64]) -> Self {
        Self {
            exps: exps.iter().copied().collect(),
            uniforms: uniforms.iter().copied().collect(),
            draws: Vec::new(),
        }
    }
}

impl RandomSource for ScriptedSource {
    fn sample_exp(&mut self) -> f64 {
        self.draws.push(Draw::Exp);
        self.exps.pop_front().expect("exponential script exhausted")
    }

    fn sample_uniform(&mut self) -> f64 {
        self.draws.push(Draw::Uniform);
        self.uniforms.pop_front().expect("uniform script exhausted")
    }
}

/// Rate factory with fixed bounds and a time-only exact rate
///
/// Installs a kernel anchored at the window start so tests can see which
/// window was installed last.
pub struct WindowFactory {
    pub lower: f64,
    pub upper: f64,
    pub length: f64,
    pub rate: fn(f64) -> f64,
    pub window_calls: Cell<usize>,
    pub rate_calls: Cell<usize>,
}

impl WindowFactory {
    pub fn new(lower: f64, upper: f64, length: f64, rate: fn(f64) -> f64) -> Self {
        Self {
            lower,
            upper,
            length,
            rate,
            window_calls: Cell::new(0),
            rate_calls: Cell::new(0),
        }
    }
}

impl<U, P> RateFactory<U, P> for WindowFactory {
    fn window(&self, _prior: &RateState, _t0: f64, t: f64, _u: &U, _p: &P) -> RateWindow {
        self.window_calls.set(self.window_calls.get() + 1);
        RateWindow {
            installed: RateState::Kernel(ExcitationKernel {
                anchor: t,
                baseline: self.lower,
                excitation: 0.0,
                decay: 1.0,
            }),
            lower: self.lower,
            upper: self.upper,
            length: self.length,
        }
    }

    fn rate(&self, _installed: &RateState, _u: &U, _p: &P, t: f64) -> f64 {
        self.rate_calls.set(self.rate_calls.get() + 1);
        (self.rate)(t)
    }
}

/// One-sample Kolmogorov-Smirnov statistic against Exp(rate)
pub fn ks_statistic_exponential(samples: &mut [f64], rate: f64) -> f64 {
    samples.sort_by(|a, b| a.total_cmp(b));
    let n = samples.len() as f64;
    samples
        .iter()
        .enumerate()
        .map(|(i, &x)| {
            let cdf = 1.0 - (-rate * x).exp();
            let above = (i as f64 + 1.0) / n - cdf;
            let below = cdf - i as f64 / n;
            above.max(below)
        })
        .fold(0.0, f64::max)
}
