//! Exponential-kernel Hawkes processes
//!
//! Jump `i` has intensity
//!
//! ```text
//! λ_i(t) = λ0 + α · Σ_{j ∈ sources(i)} Σ_{s ∈ history(j), s <= t} exp(-β (t - s))
//! ```
//!
//! The rate-state record of each jump is an [`ExcitationKernel`] anchored at
//! the last sampling origin, so a resample only has to fold in the events
//! recorded since that anchor instead of rescanning the full history.
//!
//! # Bounds
//!
//! The intensity only decays between events, so over `[t, t + L)`:
//! - upper bound `λ_i(t)`
//! - lower bound `λ0`
//! - `L = ∞` without excitation, otherwise `1 / (2 · λ_i(t))`

use serde::{Deserialize, Serialize};

use crate::aggregator::ConfigError;
use crate::models::{ExcitationKernel, JumpSet, RateFactory, RateState, RateWindow};

/// Read access to past fire times, stored in the system state
pub trait EventHistory {
    /// Fire times of `jump` in ascending order
    fn history(&self, jump: usize) -> &[f64];
}

/// System state of a Hawkes simulation: the fire history of every jump
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HawkesState {
    pub history: Vec<Vec<f64>>,
}

impl HawkesState {
    pub fn new(num_jumps: usize) -> Self {
        Self {
            history: vec![Vec::new(); num_jumps],
        }
    }

    /// Record a fire of `jump` at `t`
    pub fn record(&mut self, jump: usize, t: f64) {
        if let Some(times) = self.history.get_mut(jump) {
            times.push(t);
        }
    }

    pub fn count(&self, jump: usize) -> usize {
        self.history.get(jump).map(Vec::len).unwrap_or(0)
    }

    pub fn total_count(&self) -> usize {
        self.history.iter().map(Vec::len).sum()
    }
}

impl EventHistory for HawkesState {
    fn history(&self, jump: usize) -> &[f64] {
        self.history.get(jump).map(|v| v.as_slice()).unwrap_or(&[])
    }
}

/// Baseline λ0, excitation α and decay β shared by all jumps
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HawkesParams {
    pub baseline: f64,
    pub excitation: f64,
    pub decay: f64,
}

impl HawkesParams {
    /// Validated parameters: `λ0 >= 0`, `α >= 0`, `β > 0`, all finite
    pub fn new(baseline: f64, excitation: f64, decay: f64) -> Result<Self, ConfigError> {
        let finite = baseline.is_finite() && excitation.is_finite() && decay.is_finite();
        if !finite || baseline < 0.0 || excitation < 0.0 || decay <= 0.0 {
            return Err(ConfigError::InvalidParameter(format!(
                "Hawkes parameters must satisfy baseline >= 0, excitation >= 0, decay > 0 \
                 (got baseline={}, excitation={}, decay={})",
                baseline, excitation, decay
            )));
        }
        Ok(Self {
            baseline,
            excitation,
            decay,
        })
    }

    /// Expected number of direct offspring per event (α / β)
    pub fn branching_ratio(&self) -> f64 {
        self.excitation / self.decay
    }

    /// Long-run intensity of a univariate process, `None` if explosive
    pub fn stationary_rate(&self) -> Option<f64> {
        let ratio = self.branching_ratio();
        (ratio < 1.0).then(|| self.baseline / (1.0 - ratio))
    }
}

/// Rate factory of one Hawkes jump excited by `sources`
#[derive(Debug, Clone, PartialEq)]
pub struct HawkesRate {
    jump: usize,
    sources: Vec<usize>,
}

impl HawkesRate {
    pub fn new(jump: usize, sources: Vec<usize>) -> Self {
        Self { jump, sources }
    }

    pub fn jump(&self) -> usize {
        self.jump
    }

    pub fn sources(&self) -> &[usize] {
        &self.sources
    }

    /// Kernel summarizing the history up to and including `t0`
    pub fn kernel_at<U: EventHistory>(
        &self,
        prior: &RateState,
        t0: f64,
        u: &U,
        p: &HawkesParams,
    ) -> ExcitationKernel {
        let contribution = |s: f64| p.excitation * (-p.decay * (t0 - s)).exp();

        let excitation = match prior.kernel() {
            Some(kernel) if kernel.anchor <= t0 => {
                let anchor = kernel.anchor;
                // histories are ascending: walk back only to the anchor
                let fresh: f64 = self
                    .sources
                    .iter()
                    .flat_map(|&j| u.history(j).iter().rev().copied().take_while(move |&s| s > anchor))
                    .filter(|&s| s <= t0)
                    .map(contribution)
                    .sum();
                kernel.excitation_at(t0) + fresh
            }
            _ => self
                .sources
                .iter()
                .flat_map(|&j| u.history(j).iter())
                .copied()
                .filter(|&s| s <= t0)
                .map(contribution)
                .sum(),
        };

        ExcitationKernel {
            anchor: t0,
            baseline: p.baseline,
            excitation,
            decay: p.decay,
        }
    }
}

impl<U: EventHistory> RateFactory<U, HawkesParams> for HawkesRate {
    fn window(&self, prior: &RateState, t0: f64, t: f64, u: &U, p: &HawkesParams) -> RateWindow {
        let kernel = self.kernel_at(prior, t0, u, p);
        let upper = kernel.intensity(t);
        let length = if kernel.excitation > 0.0 {
            1.0 / (2.0 * upper)
        } else {
            f64::INFINITY
        };

        RateWindow {
            installed: RateState::Kernel(kernel),
            lower: p.baseline,
            upper,
            length,
        }
    }

    fn rate(&self, installed: &RateState, _u: &U, p: &HawkesParams, t: f64) -> f64 {
        installed
            .kernel()
            .map(|kernel| kernel.intensity(t))
            .unwrap_or(p.baseline)
    }
}

/// Build a multivariate Hawkes jump set and its dependency graph
///
/// `sources[i]` lists the jumps whose fires excite jump `i`. Firing jump `j`
/// records `t` in the history and makes every jump excited by `j` stale.
///
/// # Example
/// ```
/// use jump_simulator_core_rs::processes::hawkes_jump_set;
///
/// // jump 0 self-excites, jump 1 is excited by both
/// let (jumps, graph) = hawkes_jump_set(vec![vec![0], vec![0, 1]]);
/// assert_eq!(jumps.len(), 2);
/// assert_eq!(graph, vec![vec![0, 1], vec![1]]);
/// ```
pub fn hawkes_jump_set(
    sources: Vec<Vec<usize>>,
) -> (JumpSet<HawkesState, HawkesParams>, Vec<Vec<usize>>) {
    let num_jumps = sources.len();
    let mut graph = vec![Vec::new(); num_jumps];
    for (jump, excited_by) in sources.iter().enumerate() {
        for &source in excited_by {
            if let Some(dependents) = graph.get_mut(source) {
                dependents.push(jump);
            }
        }
    }

    let mut jumps = JumpSet::<HawkesState, HawkesParams>::new();
    for (jump, excited_by) in sources.into_iter().enumerate() {
        jumps.push_conditional(HawkesRate::new(jump, excited_by), move |u, _, t| {
            u.record(jump, t)
        });
    }

    (jumps, graph)
}
