//! Deterministic random number generation
//!
//! Every variate the thinning sampler consumes goes through the
//! [`RandomSource`] trait. Two sources ship with the crate:
//!
//! - [`RngManager`]: xorshift64*, fully deterministic, checkpointable `u64` state
//! - [`RandSource`]: adapter over any `rand::Rng`
//!
//! CRITICAL: Draw order is part of the reproducibility contract. The sampler
//! takes one exponential draw per proposal and, only for inhomogeneous windows,
//! one uniform draw after it.

mod source;
mod xorshift;

pub use source::{RandSource, RandomSource};
pub use xorshift::RngManager;
