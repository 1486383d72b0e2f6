//! Ready-made conditional-rate processes
//!
//! - [`hawkes`]: self-exciting point processes with exponential kernels
//! - [`periodic`]: sinusoidally modulated Poisson intensities

pub mod hawkes;
pub mod periodic;

pub use hawkes::{hawkes_jump_set, EventHistory, HawkesParams, HawkesRate, HawkesState};
pub use periodic::PeriodicRate;
