//! Orchestrator Engine
//!
//! Drives a [`JumpAggregator`] over a run:
//! - Owns the system state, parameters and a monotone clock
//! - Advances time to each next jump and fires it
//! - Records fires, resamples and termination in an [`EventLog`]
//!
//! # Architecture
//!
//! ```text
//! new:   validate config → hash config → aggregator.initialize(t0, end_time)
//! step:  peek_next → clock.advance_to(time) → aggregator.fire → log events
//! run:   step until terminated (or the configured event cap)
//! ```
//!
//! # Example
//!
//! ```rust
//! use jump_simulator_core_rs::models::JumpSet;
//! use jump_simulator_core_rs::orchestrator::{Orchestrator, OrchestratorConfig};
//!
//! let jumps = JumpSet::<Vec<i64>, ()>::new().with_constant(|_u, _p, _t| 1.5, |u, _p, _t| u[0] += 1);
//! let config = OrchestratorConfig::new(12345, 0.0, 10.0);
//!
//! let mut orchestrator = Orchestrator::with_queue_method(config, jumps, None, vec![0], ()).unwrap();
//! let summary = orchestrator.run().unwrap();
//!
//! assert!(summary.terminated);
//! assert_eq!(orchestrator.state()[0] as usize, summary.events_fired);
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use super::checkpoint::compute_config_hash;
use crate::aggregator::{
    AggregatorError, AggregatorStatus, FireOutcome, JumpAggregator, QueueMethod,
};
use crate::core::time::{ClockError, SimClock, NEVER};
use crate::models::{Event, EventLog, JumpSet};
use crate::rng::RngManager;

// ============================================================================
// Configuration Types
// ============================================================================

/// Run configuration
///
/// # Fields
///
/// * `rng_seed` - Seed for the deterministic xorshift stream
/// * `t0` - Start of the simulated interval
/// * `end_time` - Horizon; no jump fires after it
/// * `record_events` - Keep an [`EventLog`] of the run
/// * `max_events` - Stop `run` after this many fires (unbounded if `None`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    pub rng_seed: u64,
    #[serde(default)]
    pub t0: f64,
    pub end_time: f64,
    #[serde(default = "default_record_events")]
    pub record_events: bool,
    #[serde(default)]
    pub max_events: Option<usize>,
}

fn default_record_events() -> bool {
    true
}

impl OrchestratorConfig {
    /// Config recording events, without an event cap
    pub fn new(rng_seed: u64, t0: f64, end_time: f64) -> Self {
        Self {
            rng_seed,
            t0,
            end_time,
            record_events: true,
            max_events: None,
        }
    }

    /// Parse and validate a JSON config
    ///
    /// ```rust
    /// use jump_simulator_core_rs::orchestrator::OrchestratorConfig;
    ///
    /// let config = OrchestratorConfig::from_json(r#"{"rng_seed": 7, "end_time": 5.0}"#).unwrap();
    /// assert_eq!(config.t0, 0.0);
    /// assert!(config.record_events);
    /// ```
    pub fn from_json(json: &str) -> Result<Self, SimulationError> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| SimulationError::Serialization(format!("Config parse failed: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), SimulationError> {
        if !self.t0.is_finite() || !self.end_time.is_finite() {
            return Err(SimulationError::InvalidConfig(format!(
                "t0 and end_time must be finite (got t0={}, end_time={})",
                self.t0, self.end_time
            )));
        }

        if self.end_time <= self.t0 {
            return Err(SimulationError::InvalidConfig(format!(
                "end_time must be > t0 (got t0={}, end_time={})",
                self.t0, self.end_time
            )));
        }

        if self.max_events == Some(0) {
            return Err(SimulationError::InvalidConfig(
                "max_events must be > 0 when set".to_string(),
            ));
        }

        Ok(())
    }
}

// ============================================================================
// Errors and Results
// ============================================================================

/// Simulation error types
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SimulationError {
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("State validation failed: {0}")]
    StateValidation(String),

    #[error(transparent)]
    Clock(#[from] ClockError),

    #[error(transparent)]
    Aggregator(#[from] AggregatorError),
}

/// Result of a `run`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Total fires since construction
    pub events_fired: usize,
    /// Time of the last fire (`t0` if none)
    pub final_time: f64,
    /// No jump fires before the horizon any more
    pub terminated: bool,
    /// Stopped because `max_events` was reached
    pub hit_event_cap: bool,
}

// ============================================================================
// Orchestrator
// ============================================================================

/// Owns a run: state `U`, parameters `P` and the aggregator `A` choosing jumps
///
/// # Determinism
///
/// Randomness comes only from the aggregator's source. With the xorshift
/// [`RngManager`], same seed + same jumps = identical trajectory (and identical
/// [`EventLog::digest`]).
pub struct Orchestrator<U, P, A> {
    config: OrchestratorConfig,
    config_hash: String,
    state: U,
    params: P,
    aggregator: A,
    clock: SimClock,
    event_log: EventLog,
    events_fired: usize,
}

impl<U, P, A: JumpAggregator<U, P>> Orchestrator<U, P, A> {
    /// Validate the config and initialize `aggregator` over `[t0, end_time]`
    ///
    /// # Arguments
    ///
    /// * `config` - Run configuration (the seed is informational here; the
    ///   aggregator already owns its random source)
    /// * `aggregator` - Uninitialized (or re-usable) aggregator
    /// * `state` - Initial system state
    /// * `params` - Parameters passed to every rate and effect
    pub fn new(
        config: OrchestratorConfig,
        mut aggregator: A,
        state: U,
        params: P,
    ) -> Result<Self, SimulationError> {
        config.validate()?;
        let config_hash = compute_config_hash(&config)?;

        aggregator.initialize(&state, &params, config.t0, config.end_time)?;

        let mut orchestrator = Self {
            clock: SimClock::new(config.t0, config.end_time),
            config,
            config_hash,
            state,
            params,
            aggregator,
            event_log: EventLog::new(),
            events_fired: 0,
        };
        if orchestrator.aggregator.status() == AggregatorStatus::Terminated {
            let t0 = orchestrator.config.t0;
            orchestrator.record(Event::Terminated { time: t0 });
        }
        Ok(orchestrator)
    }

    /// Fire the next jump, or return `None` once the run has terminated
    ///
    /// A failed aggregator keeps returning [`AggregatorError::Failed`].
    pub fn step(&mut self) -> Result<Option<FireOutcome>, SimulationError> {
        let Some(next) = self.aggregator.peek_next() else {
            if self.aggregator.status() == AggregatorStatus::Failed {
                return Err(AggregatorError::Failed.into());
            }
            return Ok(None);
        };

        self.clock.advance_to(next.time)?;
        let outcome = self.aggregator.fire(&mut self.state, &self.params, next.time)?;
        self.events_fired += 1;

        if self.config.record_events {
            self.record(Event::Fired {
                time: outcome.time,
                jump: outcome.jump,
            });
            for &(jump, next_time) in &outcome.resampled {
                self.record(Event::Resampled {
                    time: outcome.time,
                    jump,
                    next_time: (next_time < NEVER).then_some(next_time),
                });
            }
            if outcome.status == AggregatorStatus::Terminated {
                self.record(Event::Terminated { time: outcome.time });
            }
        }

        Ok(Some(outcome))
    }

    /// Step until termination or until `max_events` fires have happened
    pub fn run(&mut self) -> Result<RunSummary, SimulationError> {
        let mut hit_event_cap = false;

        loop {
            if let Some(cap) = self.config.max_events {
                if self.events_fired >= cap {
                    warn!(
                        max_events = cap,
                        time = self.clock.now(),
                        "Run stopped at event cap before the horizon"
                    );
                    hit_event_cap = true;
                    break;
                }
            }
            if self.step()?.is_none() {
                break;
            }
        }

        let summary = RunSummary {
            events_fired: self.events_fired,
            final_time: self.clock.now(),
            terminated: self.aggregator.status() == AggregatorStatus::Terminated,
            hit_event_cap,
        };
        info!(
            events_fired = summary.events_fired,
            final_time = summary.final_time,
            end_time = self.config.end_time,
            "Run complete"
        );
        Ok(summary)
    }

    fn record(&mut self, event: Event) {
        if self.config.record_events {
            self.event_log.log(event);
        }
    }
}

impl<U, P> Orchestrator<U, P, QueueMethod<U, P, RngManager>> {
    /// Build a queue-method run seeded from `config.rng_seed`
    pub fn with_queue_method(
        config: OrchestratorConfig,
        jumps: JumpSet<U, P>,
        dependency_graph: Option<Vec<Vec<usize>>>,
        state: U,
        params: P,
    ) -> Result<Self, SimulationError> {
        let aggregator = QueueMethod::new(jumps, dependency_graph, RngManager::new(config.rng_seed))
            .map_err(AggregatorError::from)?;
        Self::new(config, aggregator, state, params)
    }
}

// ========================================================================
// Accessors
// ========================================================================

impl<U, P, A> Orchestrator<U, P, A> {
    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// SHA-256 of the canonical JSON config
    pub fn config_hash(&self) -> &str {
        &self.config_hash
    }

    pub fn state(&self) -> &U {
        &self.state
    }

    pub fn params(&self) -> &P {
        &self.params
    }

    pub fn aggregator(&self) -> &A {
        &self.aggregator
    }

    pub fn event_log(&self) -> &EventLog {
        &self.event_log
    }

    pub fn events_fired(&self) -> usize {
        self.events_fired
    }

    /// Time of the most recent fire
    pub fn current_time(&self) -> f64 {
        self.clock.now()
    }

    /// Consume the run, returning the final state
    pub fn into_state(self) -> U {
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counter(rate: f64) -> JumpSet<Vec<i64>, ()> {
        JumpSet::<Vec<i64>, ()>::new().with_constant(move |_u, _p, _t| rate, |u, _p, _t| u[0] += 1)
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = OrchestratorConfig::new(1, 5.0, 5.0);
        assert!(matches!(config.validate(), Err(SimulationError::InvalidConfig(_))));

        config.end_time = f64::INFINITY;
        assert!(matches!(config.validate(), Err(SimulationError::InvalidConfig(_))));

        let mut config = OrchestratorConfig::new(1, 0.0, 1.0);
        config.max_events = Some(0);
        assert!(matches!(config.validate(), Err(SimulationError::InvalidConfig(_))));
    }

    #[test]
    fn test_from_json_reports_parse_errors() {
        let result = OrchestratorConfig::from_json("{ not json");
        assert!(matches!(result, Err(SimulationError::Serialization(_))));
    }

    #[test]
    fn test_zero_rate_run_terminates_immediately() {
        let config = OrchestratorConfig::new(3, 0.0, 10.0);
        let mut orchestrator =
            Orchestrator::with_queue_method(config, counter(0.0), None, vec![0], ()).unwrap();

        let summary = orchestrator.run().unwrap();

        assert_eq!(summary.events_fired, 0);
        assert!(summary.terminated);
        assert_eq!(summary.final_time, 0.0);
        assert_eq!(orchestrator.event_log().events(), &[Event::Terminated { time: 0.0 }]);
    }

    #[test]
    fn test_event_cap_stops_run() {
        let mut config = OrchestratorConfig::new(9, 0.0, 1_000.0);
        config.max_events = Some(5);
        let mut orchestrator =
            Orchestrator::with_queue_method(config, counter(10.0), None, vec![0], ()).unwrap();

        let summary = orchestrator.run().unwrap();

        assert_eq!(summary.events_fired, 5);
        assert!(summary.hit_event_cap);
        assert!(!summary.terminated);
        assert_eq!(orchestrator.state()[0], 5);
    }

    #[test]
    fn test_step_logs_fire_and_resample() {
        let config = OrchestratorConfig::new(21, 0.0, 100.0);
        let mut orchestrator =
            Orchestrator::with_queue_method(config, counter(1.0), None, vec![0], ()).unwrap();

        let outcome = orchestrator.step().unwrap().unwrap();
        let events = orchestrator.event_log().events();

        assert_eq!(events[0], Event::Fired { time: outcome.time, jump: 0 });
        assert_eq!(events[1].event_type(), "Resampled");
        assert_eq!(orchestrator.current_time(), outcome.time);
    }

    #[test]
    fn test_recording_disabled() {
        let mut config = OrchestratorConfig::new(4, 0.0, 10.0);
        config.record_events = false;
        let mut orchestrator =
            Orchestrator::with_queue_method(config, counter(2.0), None, vec![0], ()).unwrap();

        let summary = orchestrator.run().unwrap();

        assert!(summary.events_fired > 0);
        assert!(orchestrator.event_log().is_empty());
    }
}
