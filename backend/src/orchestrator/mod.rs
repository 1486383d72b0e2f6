//! Orchestrator - drives a jump aggregator over a run
//!
//! See `engine.rs` for the driver loop and `checkpoint.rs` for snapshots.

pub mod checkpoint;
pub mod engine;

pub use engine::{Orchestrator, OrchestratorConfig, RunSummary, SimulationError};

pub use checkpoint::{compute_config_hash, validate_snapshot, RunSnapshot};
