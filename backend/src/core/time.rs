//! Time management for the simulation
//!
//! Simulated time is continuous (`f64`). Two concepts live here:
//!
//! - [`NEVER`]: the sentinel fire time of a jump that will not fire before the
//!   horizon. It is strictly greater than any finite horizon.
//! - [`SimClock`]: a monotone clock over `[t0, end_time]` that refuses to move
//!   backwards.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fire time of a jump that does not fire before the horizon.
pub const NEVER: f64 = f64::INFINITY;

/// Errors raised by [`SimClock`]
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ClockError {
    #[error("Time went backward: from {from} to {to}")]
    WentBackward { from: f64, to: f64 },
}

/// Monotone simulation clock
///
/// # Example
/// ```
/// use jump_simulator_core_rs::SimClock;
///
/// let mut clock = SimClock::new(0.0, 10.0);
/// clock.advance_to(2.5).unwrap();
/// assert_eq!(clock.now(), 2.5);
/// assert!(clock.advance_to(1.0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimClock {
    t0: f64,
    end_time: f64,
    now: f64,
}

impl SimClock {
    /// Create a clock positioned at `t0`
    pub fn new(t0: f64, end_time: f64) -> Self {
        Self {
            t0,
            end_time,
            now: t0,
        }
    }

    /// Move the clock forward to `t`
    ///
    /// Staying at the same instant is allowed (simultaneous events).
    pub fn advance_to(&mut self, t: f64) -> Result<(), ClockError> {
        self.check_advance(t)?;
        self.now = t;
        Ok(())
    }

    /// Whether `advance_to(t)` would succeed, without moving the clock
    pub fn check_advance(&self, t: f64) -> Result<(), ClockError> {
        // `!(t >= now)` also rejects NaN
        if !(t >= self.now) {
            return Err(ClockError::WentBackward {
                from: self.now,
                to: t,
            });
        }
        Ok(())
    }

    pub fn now(&self) -> f64 {
        self.now
    }

    pub fn start(&self) -> f64 {
        self.t0
    }

    pub fn end_time(&self) -> f64 {
        self.end_time
    }

    /// Whether `t` lies past the simulation horizon
    pub fn is_past_horizon(&self, t: f64) -> bool {
        t > self.end_time
    }
}
