//! Queue Method aggregation controller
//!
//! Keeps one next-fire-time per jump type in an [`IndexedPriorityQueue`],
//! samples each time with the [`ThinningSampler`], and after every fire
//! resamples only the jumps the [`DependencyGraph`] names.
//!
//! # Lifecycle
//!
//! ```text
//! Uninitialized --initialize--> Ready --fire--> Ready
//!       |                         |               |
//!       |                         +----fire/initialize----> Terminated
//!       |                         |
//!       +-----initialize/fire error----> Failed
//! ```
//!
//! `Terminated` is entered as soon as the queue minimum lies past the horizon
//! (including the "never" sentinel). A sampling error during `initialize` or
//! `fire` leaves the controller `Failed`: the queue no longer matches the
//! state, so it refuses to fire again. `initialize` may be called again from
//! any state to restart the run.
//!
//! # Example
//!
//! ```rust
//! use jump_simulator_core_rs::aggregator::{AggregatorStatus, QueueMethod};
//! use jump_simulator_core_rs::models::JumpSet;
//! use jump_simulator_core_rs::RngManager;
//!
//! let jumps = JumpSet::<Vec<i64>, ()>::new().with_constant(|_u, _p, _t| 2.0, |u, _p, _t| u[0] += 1);
//! let mut aggregator = QueueMethod::new(jumps, None, RngManager::new(42)).unwrap();
//! let mut u = vec![0];
//!
//! aggregator.initialize(&u, &(), 0.0, 10.0).unwrap();
//! while let Some(next) = aggregator.peek_next() {
//!     aggregator.fire(&mut u, &(), next.time).unwrap();
//! }
//! assert_eq!(aggregator.status(), AggregatorStatus::Terminated);
//! assert!(u[0] > 0);
//! ```

use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use super::dependency::DependencyGraph;
use super::error::{AggregatorError, ConfigError, SamplingError};
use super::priority_queue::IndexedPriorityQueue;
use super::thinning::ThinningSampler;
use super::{FireOutcome, JumpAggregator, NextJump};
use crate::core::time::{SimClock, NEVER};
use crate::models::{Jump, JumpSet, RateState};
use crate::rng::RandomSource;

/// Controller state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AggregatorStatus {
    Uninitialized,
    Ready,
    Terminated,
    /// A sampling error interrupted `initialize` or `fire`
    Failed,
}

/// Queue method aggregator over jump types with state `U` and parameters `P`
pub struct QueueMethod<U, P, R> {
    jumps: Vec<Jump<U, P>>,
    rate_states: Vec<RateState>,
    dep_graph: Option<DependencyGraph>,
    queue: IndexedPriorityQueue,
    sampler: ThinningSampler,
    clock: SimClock,
    rng: R,
    next_jump: usize,
    next_jump_time: f64,
    status: AggregatorStatus,
}

impl<U, P, R: RandomSource> QueueMethod<U, P, R> {
    /// Validate the jump system and build an uninitialized aggregator
    ///
    /// # Errors
    ///
    /// - [`ConfigError::MassActionUnsupported`] if any mass-action jump is present
    /// - [`ConfigError::EmptyJumpSet`] if there is nothing to simulate
    /// - [`ConfigError::MissingDependencyGraph`] if conditional jumps are
    ///   present and `dependency_graph` is `None`
    /// - [`ConfigError::DependencyGraphSize`] / [`ConfigError::UnknownDependency`]
    ///   for a malformed graph
    pub fn new(
        jumps: JumpSet<U, P>,
        dependency_graph: Option<Vec<Vec<usize>>>,
        rng: R,
    ) -> Result<Self, ConfigError> {
        if jumps.has_mass_action() {
            return Err(ConfigError::MassActionUnsupported {
                count: jumps.num_mass_action(),
            });
        }
        if jumps.is_empty() {
            return Err(ConfigError::EmptyJumpSet);
        }

        let dep_graph =
            DependencyGraph::build(dependency_graph, jumps.len(), jumps.has_conditional())?;
        let (jumps, _) = jumps.into_parts();
        let num_jumps = jumps.len();

        Ok(Self {
            jumps,
            rate_states: vec![RateState::Stateless; num_jumps],
            dep_graph,
            queue: IndexedPriorityQueue::from_times(Vec::new()),
            sampler: ThinningSampler::new(NEVER),
            clock: SimClock::new(0.0, NEVER),
            rng,
            next_jump: 0,
            next_jump_time: NEVER,
            status: AggregatorStatus::Uninitialized,
        })
    }

    /// Sample every jump from `t0` and seed the queue
    pub fn initialize(
        &mut self,
        u: &U,
        p: &P,
        t0: f64,
        end_time: f64,
    ) -> Result<(), AggregatorError> {
        if !t0.is_finite() || !end_time.is_finite() || !(end_time > t0) {
            return Err(ConfigError::InvalidTimeSpan { t0, end_time }.into());
        }

        let sampler = ThinningSampler::new(end_time);
        let seeded = self
            .jumps
            .iter()
            .enumerate()
            .map(|(jump, definition)| {
                sampler.sample(
                    jump,
                    definition.factory(),
                    &RateState::Stateless,
                    u,
                    p,
                    t0,
                    &mut self.rng,
                )
            })
            .collect::<Result<Vec<_>, _>>();
        let proposals = match seeded {
            Ok(proposals) => proposals,
            Err(err) => return Err(self.fail(err.into())),
        };

        let (times, rate_states): (Vec<f64>, Vec<RateState>) = proposals
            .into_iter()
            .map(|proposal| (proposal.time, proposal.rate_state))
            .unzip();
        self.sampler = sampler;
        self.clock = SimClock::new(t0, end_time);
        self.rate_states = rate_states;
        self.queue = IndexedPriorityQueue::from_times(times);
        self.refresh_next();

        debug!(
            num_jumps = self.jumps.len(),
            t0,
            end_time,
            next_jump = self.next_jump,
            next_time = self.next_jump_time,
            "Initialized queue method aggregator"
        );
        Ok(())
    }

    /// The next jump to fire, if any fires before the horizon
    pub fn peek_next(&self) -> Option<NextJump> {
        match self.status {
            AggregatorStatus::Ready => Some(NextJump {
                time: self.next_jump_time,
                jump: self.next_jump,
            }),
            _ => None,
        }
    }

    /// Fire the current next jump at time `t` and resample its dependents
    ///
    /// `t` must be the time reported by [`peek_next`](Self::peek_next).
    ///
    /// # Errors
    ///
    /// - [`AggregatorError::NotInitialized`] / [`AggregatorError::Terminated`] /
    ///   [`AggregatorError::Failed`] outside the `Ready` state
    /// - [`AggregatorError::Clock`] if `t` precedes the previous fire
    /// - [`AggregatorError::FireTimeMismatch`] if `t` is not the queued time of
    ///   the next jump
    /// - [`AggregatorError::Sampling`] if a rate factory breaks its contract;
    ///   the effect has already run, so the aggregator moves to `Failed`
    pub fn fire(&mut self, u: &mut U, p: &P, t: f64) -> Result<FireOutcome, AggregatorError> {
        match self.status {
            AggregatorStatus::Uninitialized => return Err(AggregatorError::NotInitialized),
            AggregatorStatus::Terminated => return Err(AggregatorError::Terminated),
            AggregatorStatus::Failed => return Err(AggregatorError::Failed),
            AggregatorStatus::Ready => {}
        }
        self.clock.check_advance(t)?;
        if t != self.next_jump_time {
            return Err(AggregatorError::FireTimeMismatch {
                jump: self.next_jump,
                expected: self.next_jump_time,
                time: t,
            });
        }
        self.clock.advance_to(t)?;

        let fired = self.next_jump;
        self.jumps[fired].apply(u, p, t);
        let u: &U = u;

        let Self {
            jumps,
            rate_states,
            dep_graph,
            queue,
            sampler,
            rng,
            ..
        } = self;
        let mut resample = |jump: usize| -> Result<(usize, f64), SamplingError> {
            let proposal =
                sampler.sample(jump, jumps[jump].factory(), &rate_states[jump], u, p, t, &mut *rng)?;
            rate_states[jump] = proposal.rate_state;
            queue.update(jump, proposal.time);
            trace!(jump, time = t, next_time = proposal.time, "Resampled dependent jump");
            Ok((jump, proposal.time))
        };

        let resampled = match dep_graph.as_ref() {
            Some(graph) => graph
                .dependents(fired)
                .iter()
                .map(|&jump| resample(jump))
                .collect::<Result<Vec<_>, _>>(),
            None => (0..jumps.len())
                .map(&mut resample)
                .collect::<Result<Vec<_>, _>>(),
        };
        let resampled = match resampled {
            Ok(resampled) => resampled,
            Err(err) => return Err(self.fail(err.into())),
        };

        self.refresh_next();
        debug!(
            jump = fired,
            time = t,
            resampled = resampled.len(),
            next_jump = self.next_jump,
            next_time = self.next_jump_time,
            "Fired jump"
        );

        Ok(FireOutcome {
            jump: fired,
            time: t,
            resampled,
            status: self.status,
            next: self.peek_next(),
        })
    }

    // Queue and rate states are out of step with `u` after this
    fn fail(&mut self, err: AggregatorError) -> AggregatorError {
        self.status = AggregatorStatus::Failed;
        warn!(error = %err, time = self.clock.now(), "Queue method aggregator failed");
        err
    }

    // Read the queue minimum into next_jump / next_jump_time
    fn refresh_next(&mut self) {
        let (time, jump) = self.queue.peek_min().unwrap_or((NEVER, 0));
        self.next_jump = jump;
        self.next_jump_time = time;
        self.status = if self.clock.is_past_horizon(time) {
            AggregatorStatus::Terminated
        } else {
            AggregatorStatus::Ready
        };
    }
}

impl<U, P, R> QueueMethod<U, P, R> {
    pub fn status(&self) -> AggregatorStatus {
        self.status
    }

    /// Index of the jump at the queue minimum (meaningful once initialized)
    pub fn next_jump(&self) -> usize {
        self.next_jump
    }

    pub fn next_jump_time(&self) -> f64 {
        self.next_jump_time
    }

    pub fn end_time(&self) -> f64 {
        self.sampler.end_time()
    }

    /// Time of the most recent fire (or `t0` before any fire)
    pub fn current_time(&self) -> f64 {
        self.clock.now()
    }

    pub fn num_jumps(&self) -> usize {
        self.jumps.len()
    }

    /// Queued fire time of `jump`
    pub fn queued_time(&self, jump: usize) -> Option<f64> {
        self.queue.get(jump)
    }

    /// Queued fire times of all jumps, indexed by jump
    pub fn queued_times(&self) -> &[f64] {
        self.queue.times()
    }

    pub fn rate_state(&self, jump: usize) -> Option<&RateState> {
        self.rate_states.get(jump)
    }

    /// `None` when no conditional jump exists and no graph was supplied
    pub fn dependency_graph(&self) -> Option<&DependencyGraph> {
        self.dep_graph.as_ref()
    }

    pub fn rng(&self) -> &R {
        &self.rng
    }
}

impl<U, P, R: RandomSource> JumpAggregator<U, P> for QueueMethod<U, P, R> {
    fn initialize(&mut self, u: &U, p: &P, t0: f64, end_time: f64) -> Result<(), AggregatorError> {
        QueueMethod::initialize(self, u, p, t0, end_time)
    }

    fn peek_next(&self) -> Option<NextJump> {
        QueueMethod::peek_next(self)
    }

    fn fire(&mut self, u: &mut U, p: &P, t: f64) -> Result<FireOutcome, AggregatorError> {
        QueueMethod::fire(self, u, p, t)
    }

    fn status(&self) -> AggregatorStatus {
        QueueMethod::status(self)
    }
}
