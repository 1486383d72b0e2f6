//! Checkpoint - Run Snapshots and Config Hashing
//!
//! Captures the queue-method position of a run for auditing and replay checks.
//!
//! # Critical Invariants
//!
//! - **Determinism**: Same seed + config produces identical snapshots
//! - **No past fire times**: Every queued time is >= the current time
//! - **Queue minimum**: `next_jump` is the earliest queued jump (lowest index on ties)
//! - **Config Matching**: A snapshot is only valid against the config it was taken with

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::engine::{Orchestrator, SimulationError};
use crate::aggregator::{AggregatorStatus, QueueMethod};
use crate::core::time::NEVER;
use crate::rng::RngManager;

// ============================================================================
// Snapshot Structures
// ============================================================================

/// Queue-method run snapshot
///
/// Fire times that will not happen before the horizon are stored as `None`
/// (JSON has no infinity).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSnapshot {
    /// Time of the most recent fire
    pub current_time: f64,

    pub end_time: f64,

    /// xorshift state at the time of the snapshot
    pub rng_state: u64,

    /// Earliest queued jump; `None` once terminated
    pub next_jump: Option<usize>,

    /// Queued fire time per jump
    pub queued_times: Vec<Option<f64>>,

    pub events_fired: usize,

    /// SHA256 hash of the run config
    pub config_hash: String,
}

impl RunSnapshot {
    pub fn to_json(&self) -> Result<String, SimulationError> {
        serde_json::to_string(self)
            .map_err(|e| SimulationError::Serialization(format!("Snapshot serialization failed: {}", e)))
    }

    pub fn from_json(json: &str) -> Result<Self, SimulationError> {
        serde_json::from_str(json)
            .map_err(|e| SimulationError::Serialization(format!("Snapshot parse failed: {}", e)))
    }
}

impl<U, P> Orchestrator<U, P, QueueMethod<U, P, RngManager>> {
    /// Snapshot the current queue position
    pub fn snapshot(&self) -> RunSnapshot {
        let aggregator = self.aggregator();
        let next_jump = match aggregator.status() {
            AggregatorStatus::Ready => Some(aggregator.next_jump()),
            _ => None,
        };

        RunSnapshot {
            current_time: self.current_time(),
            end_time: aggregator.end_time(),
            rng_state: aggregator.rng().get_state(),
            next_jump,
            queued_times: aggregator
                .queued_times()
                .iter()
                .map(|&t| (t < NEVER).then_some(t))
                .collect(),
            events_fired: self.events_fired(),
            config_hash: self.config_hash().to_string(),
        }
    }
}

// ============================================================================
// Config Hashing
// ============================================================================

/// Deterministic SHA256 hash of a config
///
/// Object keys are sorted before hashing so the result does not depend on
/// field or map ordering.
pub fn compute_config_hash<T: Serialize>(config: &T) -> Result<String, SimulationError> {
    use serde_json::Value;
    use std::collections::BTreeMap;

    fn canonicalize(value: Value) -> Value {
        match value {
            Value::Object(map) => {
                let sorted: BTreeMap<String, Value> =
                    map.into_iter().map(|(k, v)| (k, canonicalize(v))).collect();
                Value::Object(sorted.into_iter().collect())
            }
            Value::Array(items) => Value::Array(items.into_iter().map(canonicalize).collect()),
            other => other,
        }
    }

    let value = serde_json::to_value(config)
        .map_err(|e| SimulationError::Serialization(format!("Config serialization failed: {}", e)))?;
    let json = serde_json::to_string(&canonicalize(value))
        .map_err(|e| SimulationError::Serialization(format!("Config serialization failed: {}", e)))?;

    let mut hasher = Sha256::new();
    hasher.update(json.as_bytes());
    Ok(format!("{:x}", hasher.finalize()))
}

// ============================================================================
// Validation Functions
// ============================================================================

/// Validate snapshot integrity
///
/// Checks:
/// - Config hash matches `expected_config_hash`
/// - No queued time precedes `current_time`
/// - `next_jump` is the queue minimum, or absent exactly when every queued
///   time lies past the horizon
pub fn validate_snapshot(
    snapshot: &RunSnapshot,
    expected_config_hash: &str,
) -> Result<(), SimulationError> {
    // 1. Config matching
    if snapshot.config_hash != expected_config_hash {
        return Err(SimulationError::StateValidation(format!(
            "Config hash mismatch: expected {}, got {}",
            expected_config_hash, snapshot.config_hash
        )));
    }

    // 2. No past fire times
    for (jump, time) in snapshot.queued_times.iter().enumerate() {
        if let Some(time) = time {
            if *time < snapshot.current_time {
                return Err(SimulationError::StateValidation(format!(
                    "Jump {} queued at {} before current time {}",
                    jump, time, snapshot.current_time
                )));
            }
        }
    }

    // 3. Queue minimum
    let minimum = snapshot
        .queued_times
        .iter()
        .enumerate()
        .filter_map(|(jump, time)| time.map(|t| (t, jump)))
        .min_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
    let expected_next = minimum
        .filter(|&(time, _)| time <= snapshot.end_time)
        .map(|(_, jump)| jump);

    if snapshot.next_jump != expected_next {
        return Err(SimulationError::StateValidation(format!(
            "next_jump {:?} is not the queue minimum {:?}",
            snapshot.next_jump, expected_next
        )));
    }

    Ok(())
}
