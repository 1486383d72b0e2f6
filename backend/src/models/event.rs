//! Event logging for simulation replay and auditing.
//!
//! This module defines the Event enum which captures every significant step of
//! a run. Events enable:
//! - Deterministic replay checks (trajectory digest)
//! - Debugging (which jump fired when, which dependents were resampled)
//! - Analysis (per-jump fire times, inter-event gaps)
//!
//! # Example
//!
//! ```rust
//! use jump_simulator_core_rs::models::{Event, EventLog};
//!
//! let mut log = EventLog::new();
//! log.log(Event::Fired { time: 0.7, jump: 1 });
//! log.log(Event::Resampled { time: 0.7, jump: 1, next_time: Some(1.9) });
//!
//! assert_eq!(log.fire_times(1), vec![0.7]);
//! assert_eq!(log.digest().len(), 64);
//! ```

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Simulation event capturing a step of the run.
///
/// Events are logged in the order they occur.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    /// A jump fired and its effect was applied
    Fired { time: f64, jump: usize },

    /// A dependent jump's fire time was recomputed after a fire
    ///
    /// `next_time` is `None` when the jump will not fire before the horizon.
    Resampled {
        time: f64,
        jump: usize,
        next_time: Option<f64>,
    },

    /// No jump fires before the horizon any more
    Terminated { time: f64 },
}

impl Event {
    /// Simulated time at which the event was recorded
    pub fn time(&self) -> f64 {
        match self {
            Event::Fired { time, .. } => *time,
            Event::Resampled { time, .. } => *time,
            Event::Terminated { time } => *time,
        }
    }

    pub fn jump(&self) -> Option<usize> {
        match self {
            Event::Fired { jump, .. } => Some(*jump),
            Event::Resampled { jump, .. } => Some(*jump),
            Event::Terminated { .. } => None,
        }
    }

    pub fn event_type(&self) -> &'static str {
        match self {
            Event::Fired { .. } => "Fired",
            Event::Resampled { .. } => "Resampled",
            Event::Terminated { .. } => "Terminated",
        }
    }

    // Bit-exact encoding fed to the trajectory digest
    fn digest_bytes(&self, hasher: &mut Sha256) {
        match self {
            Event::Fired { time, jump } => {
                hasher.update([0u8]);
                hasher.update(time.to_bits().to_le_bytes());
                hasher.update((*jump as u64).to_le_bytes());
            }
            Event::Resampled {
                time,
                jump,
                next_time,
            } => {
                hasher.update([1u8]);
                hasher.update(time.to_bits().to_le_bytes());
                hasher.update((*jump as u64).to_le_bytes());
                let next = next_time.map(f64::to_bits).unwrap_or(u64::MAX);
                hasher.update(next.to_le_bytes());
            }
            Event::Terminated { time } => {
                hasher.update([2u8]);
                hasher.update(time.to_bits().to_le_bytes());
            }
        }
    }
}

/// Append-only log of simulation events
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventLog {
    events: Vec<Event>,
}

impl EventLog {
    /// Create a new empty event log
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Add an event to the log
    pub fn log(&mut self, event: Event) {
        self.events.push(event);
    }

    /// Get the number of events logged
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Check if the log is empty
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Get all events
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Get events of a specific type
    pub fn events_of_type(&self, event_type: &str) -> Vec<&Event> {
        self.events
            .iter()
            .filter(|e| e.event_type() == event_type)
            .collect()
    }

    /// Get events for a specific jump type
    pub fn events_for_jump(&self, jump: usize) -> Vec<&Event> {
        self.events
            .iter()
            .filter(|e| e.jump() == Some(jump))
            .collect()
    }

    /// Fire times of one jump type, in order
    pub fn fire_times(&self, jump: usize) -> Vec<f64> {
        self.events
            .iter()
            .filter_map(|e| match e {
                Event::Fired { time, jump: j } if *j == jump => Some(*time),
                _ => None,
            })
            .collect()
    }

    /// Fire times of all jump types, in order
    pub fn all_fire_times(&self) -> Vec<f64> {
        self.events
            .iter()
            .filter_map(|e| match e {
                Event::Fired { time, .. } => Some(*time),
                _ => None,
            })
            .collect()
    }

    /// Number of fired events
    pub fn fired_count(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, Event::Fired { .. }))
            .count()
    }

    /// SHA-256 over the exact bit patterns of every event (hex encoded)
    ///
    /// Two runs with equal seeds and inputs produce equal digests.
    pub fn digest(&self) -> String {
        let mut hasher = Sha256::new();
        for event in &self.events {
            event.digest_bytes(&mut hasher);
        }
        format!("{:x}", hasher.finalize())
    }

    /// Serialize the log as a JSON array
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.events)
    }

    /// Clear all events
    pub fn clear(&mut self) {
        self.events.clear();
    }
}
