//! Rate-State Records
//!
//! A jump type's rate function may depend on its own past (Hawkes-type
//! intensities). Instead of capturing that history in a mutable closure, each
//! jump type owns one [`RateState`] value. The thinning sampler passes it into
//! the jump's rate factory and receives the replacement record back on every
//! successful sample; records are replaced, never mutated in place.
//!
//! # Variants
//!
//! - **Stateless**: Markovian rates (initial record of every jump type)
//! - **Kernel**: last event time plus exponential-kernel parameters
//! - **Opaque**: arbitrary user state behind `Arc<dyn Any>`

use serde::{Deserialize, Serialize};
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Per-jump-type memory handed to the rate factory.
#[derive(Clone, Default)]
pub enum RateState {
    /// No memory needed (initial record of every jump type)
    #[default]
    Stateless,

    /// Exponentially decaying excitation anchored at an event time
    Kernel(ExcitationKernel),

    /// Arbitrary user-defined state
    Opaque(Arc<dyn Any + Send + Sync>),
}

impl RateState {
    /// Wrap a user value as an opaque record
    pub fn opaque<T: Any + Send + Sync>(value: T) -> Self {
        RateState::Opaque(Arc::new(value))
    }

    pub fn is_stateless(&self) -> bool {
        matches!(self, RateState::Stateless)
    }

    pub fn kernel(&self) -> Option<&ExcitationKernel> {
        match self {
            RateState::Kernel(kernel) => Some(kernel),
            _ => None,
        }
    }

    /// Borrow the opaque payload if it has type `T`
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        match self {
            RateState::Opaque(value) => value.downcast_ref::<T>(),
            _ => None,
        }
    }
}

impl fmt::Debug for RateState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RateState::Stateless => write!(f, "Stateless"),
            RateState::Kernel(kernel) => f.debug_tuple("Kernel").field(kernel).finish(),
            RateState::Opaque(_) => write!(f, "Opaque(..)"),
        }
    }
}

/// Intensity `baseline + excitation · exp(-decay · (t - anchor))` for `t >= anchor`.
///
/// `excitation` is the excess intensity immediately after the anchor event,
/// so the record is a complete summary of an exponential-kernel history.
///
/// # Example
/// ```
/// use jump_simulator_core_rs::models::ExcitationKernel;
///
/// let kernel = ExcitationKernel { anchor: 2.0, baseline: 1.0, excitation: 0.5, decay: 1.0 };
/// assert_eq!(kernel.intensity(2.0), 1.5);
/// assert!(kernel.intensity(3.0) < 1.5);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExcitationKernel {
    /// Time the record was last brought up to date
    pub anchor: f64,
    /// Intensity floor (λ0)
    pub baseline: f64,
    /// Excess intensity at `anchor`
    pub excitation: f64,
    /// Exponential decay rate (β)
    pub decay: f64,
}

impl ExcitationKernel {
    /// Excess intensity at `t` (never earlier than the anchor)
    pub fn excitation_at(&self, t: f64) -> f64 {
        let elapsed = (t - self.anchor).max(0.0);
        self.excitation * (-self.decay * elapsed).exp()
    }

    pub fn intensity(&self, t: f64) -> f64 {
        self.baseline + self.excitation_at(t)
    }
}

/// What a rate factory returns for one thinning step.
///
/// `installed` is the rate function in force on `[t, t + length)`, expressed as
/// a rate-state record; it becomes the jump's persisted record on acceptance.
/// `lower <= rate(s) <= upper` must hold for every `s` in the window.
#[derive(Debug, Clone)]
pub struct RateWindow {
    pub installed: RateState,
    pub lower: f64,
    pub upper: f64,
    pub length: f64,
}

impl RateWindow {
    /// A rate that stays constant until the next fire (no refresh needed)
    pub fn constant(rate: f64) -> Self {
        Self {
            installed: RateState::Stateless,
            lower: rate,
            upper: rate,
            length: f64::INFINITY,
        }
    }

    /// Whether thinning can accept without a rejection test
    pub fn is_homogeneous(&self) -> bool {
        self.lower == self.upper
    }
}
