//! Jump Simulator Core - Queue Method aggregation
//!
//! Exact simulation of stochastic jump processes whose rates vary with time,
//! state and history, with deterministic execution.
//!
//! # Architecture
//!
//! - **core**: Continuous simulation time and the "never" sentinel
//! - **models**: Jump definitions, rate-state records, event log
//! - **aggregator**: Thinning sampler, dependency graph, indexed priority
//!   queue and the Queue Method controller
//! - **processes**: Ready-made Hawkes and periodic intensities
//! - **orchestrator**: Run driver, config, snapshots
//! - **rng**: Deterministic random number generation
//!
//! # Critical Invariants
//!
//! 1. Jump indices are `0..N` in insertion order
//! 2. All randomness flows through a seeded [`rng::RandomSource`]
//! 3. Simulated time never moves backwards

// Module declarations
pub mod aggregator;
pub mod core;
pub mod models;
pub mod orchestrator;
pub mod processes;
pub mod rng;

// Re-exports for convenience
pub use aggregator::{
    AggregatorError, AggregatorStatus, ConfigError, DependencyGraph, FireOutcome,
    IndexedPriorityQueue, JumpAggregator, NextJump, QueueMethod, SamplingError, ThinningSampler,
};
pub use core::time::{ClockError, SimClock, NEVER};
pub use models::{
    ConditionalRateJump, ConstantRateJump, Event, EventLog, ExcitationKernel, Jump, JumpSet,
    MassActionJump, RateFactory, RateState, RateWindow,
};
pub use orchestrator::{Orchestrator, OrchestratorConfig, RunSnapshot, RunSummary, SimulationError};
pub use rng::{RandSource, RandomSource, RngManager};
