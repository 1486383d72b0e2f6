//! Error taxonomy of the queue method
//!
//! - [`ConfigError`]: unsupported model/method combinations, detected before
//!   any sampling happens
//! - [`SamplingError`]: a rate factory broke its contract mid-run
//! - [`AggregatorError`]: everything the controller can return, including
//!   state-machine misuse and fires at the wrong time

use thiserror::Error;

use crate::core::time::ClockError;

/// Configuration errors (fatal, detected at construction/initialization)
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Queue method does not support mass-action jumps ({count} present)")]
    MassActionUnsupported { count: usize },

    #[error("Conditional-rate jumps require a dependency graph")]
    MissingDependencyGraph,

    #[error("Dependency graph has {actual} entries, expected one per jump ({expected})")]
    DependencyGraphSize { expected: usize, actual: usize },

    #[error("Jump {jump} depends on unknown jump {dependency} (only {num_jumps} jumps)")]
    UnknownDependency {
        jump: usize,
        dependency: usize,
        num_jumps: usize,
    },

    #[error("Jump set is empty")]
    EmptyJumpSet,

    #[error("Invalid time span: t0={t0}, end_time={end_time}")]
    InvalidTimeSpan { t0: f64, end_time: f64 },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Rate-factory contract violations (fatal, detected inside the sampler)
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SamplingError {
    #[error("Jump {jump}: upper bound {upper} below lower bound {lower} at t={time}")]
    BoundInversion {
        jump: usize,
        time: f64,
        lower: f64,
        upper: f64,
    },

    #[error("Jump {jump}: bounds must be finite and non-negative (lower={lower}, upper={upper}) at t={time}")]
    NonFiniteBound {
        jump: usize,
        time: f64,
        lower: f64,
        upper: f64,
    },

    #[error("Jump {jump}: window length {length} at t={time} must be positive")]
    NonPositiveWindow { jump: usize, time: f64, length: f64 },

    #[error("Jump {jump}: proposed fire time {proposed} precedes sampling origin {origin}")]
    ProposalBeforeOrigin {
        jump: usize,
        origin: f64,
        proposed: f64,
    },
}

/// Errors returned by the queue method controller
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AggregatorError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Sampling error: {0}")]
    Sampling(#[from] SamplingError),

    #[error(transparent)]
    Clock(#[from] ClockError),

    #[error("Aggregator has not been initialized")]
    NotInitialized,

    #[error("Aggregator has terminated: no jump fires before the horizon")]
    Terminated,

    #[error("Aggregator failed on an earlier error; initialize again to restart")]
    Failed,

    #[error("Fire time {time} does not match the next jump {jump} at {expected}")]
    FireTimeMismatch { jump: usize, expected: f64, time: f64 },
}
