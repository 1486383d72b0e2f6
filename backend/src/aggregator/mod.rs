//! Queue Method jump aggregation
//!
//! The aggregator answers "which jump fires next, and when?" for jump systems
//! whose rates may be time-varying, state-dependent and history-dependent.
//!
//! # Components
//!
//! - [`ThinningSampler`]: next fire time of one jump (rejection sampling
//!   against local bounds)
//! - [`DependencyGraph`]: which jumps to resample after a fire
//! - [`IndexedPriorityQueue`]: min-heap of fire times, re-keyed by jump index
//! - [`QueueMethod`]: the controller tying them together
//!
//! # Driver contract
//!
//! The caller owns simulated time and the system state:
//!
//! ```text
//! aggregator.initialize(u, p, t0, end_time)
//! while let Some(next) = aggregator.peek_next():
//!     advance time to next.time
//!     aggregator.fire(u, p, next.time)
//! ```
//!
//! `fire` takes exactly the time `peek_next` reported. After an error from
//! `initialize` or `fire` the aggregator reports nothing further until it is
//! initialized again.
//!
//! [`JumpAggregator`] is that contract as a trait; the orchestrator drives any
//! implementation through it.

pub mod dependency;
pub mod error;
pub mod priority_queue;
pub mod queue_method;
pub mod thinning;

pub use dependency::DependencyGraph;
pub use error::{AggregatorError, ConfigError, SamplingError};
pub use priority_queue::IndexedPriorityQueue;
pub use queue_method::{AggregatorStatus, QueueMethod};
pub use thinning::{Proposal, ThinningSampler};

use serde::{Deserialize, Serialize};

/// The next jump to fire
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NextJump {
    pub time: f64,
    pub jump: usize,
}

/// What happened during one `fire`
#[derive(Debug, Clone, PartialEq)]
pub struct FireOutcome {
    /// The jump whose effect was applied
    pub jump: usize,
    /// Fire time
    pub time: f64,
    /// `(jump, new fire time)` for every resampled jump, in resampling order
    pub resampled: Vec<(usize, f64)>,
    /// Controller state after the fire
    pub status: AggregatorStatus,
    /// Next jump, if any fires before the horizon
    pub next: Option<NextJump>,
}

/// Event-selection contract shared by jump aggregators
pub trait JumpAggregator<U, P> {
    /// Compute initial fire times from `t0` for a run ending at `end_time`
    fn initialize(&mut self, u: &U, p: &P, t0: f64, end_time: f64) -> Result<(), AggregatorError>;

    /// Next jump without mutation; `None` unless ready
    fn peek_next(&self) -> Option<NextJump>;

    /// Apply the next jump's effect at `t` and update affected fire times
    fn fire(&mut self, u: &mut U, p: &P, t: f64) -> Result<FireOutcome, AggregatorError>;

    fn status(&self) -> AggregatorStatus;
}
