//! Domain models for the jump simulator

pub mod event;
pub mod jump;
pub mod rate_state;

// Re-exports
pub use event::{Event, EventLog};
pub use jump::{ConditionalRateJump, ConstantRateJump, Effect, Jump, JumpSet, MassActionJump, RateFactory};
pub use rate_state::{ExcitationKernel, RateState, RateWindow};
