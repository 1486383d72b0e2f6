//! Jump types and jump sets
//!
//! A jump type is a category of discrete event with its own intensity and a
//! state-mutating effect. Three kinds exist:
//!
//! - **Constant-rate**: the rate may depend on state but stays constant
//!   between fires, so it never needs a refresh window
//! - **Conditional-rate**: the rate is produced by a [`RateFactory`] and may be
//!   time-varying and history-dependent
//! - **Mass-action**: polynomial rates from stoichiometry; carried only so the
//!   queue method can reject them at construction
//!
//! Jump indices are assigned in insertion order, starting at 0.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::rate_state::{RateState, RateWindow};

/// Effect applied when a jump fires: `(state, params, fire_time)`.
pub type Effect<U, P> = Box<dyn Fn(&mut U, &P, f64)>;

/// Produces a jump's rate function and its local bounds.
///
/// Contract for implementors:
/// - `window` is called with the jump's persisted record `prior`, the sampling
///   origin `t0` and the current working time `t >= t0`
/// - the returned bounds must hold on `[t, t + length)` and `lower <= upper`
/// - `rate` evaluates the rate function described by `installed` at time `t`
///
/// # Example
///
/// ```
/// use jump_simulator_core_rs::models::{RateFactory, RateState, RateWindow};
///
/// /// Linearly growing rate `slope * t`, bounded over unit windows.
/// struct Ramp {
///     slope: f64,
/// }
///
/// impl RateFactory<(), ()> for Ramp {
///     fn window(&self, _prior: &RateState, _t0: f64, t: f64, _u: &(), _p: &()) -> RateWindow {
///         RateWindow {
///             installed: RateState::Stateless,
///             lower: self.slope * t,
///             upper: self.slope * (t + 1.0),
///             length: 1.0,
///         }
///     }
///
///     fn rate(&self, _installed: &RateState, _u: &(), _p: &(), t: f64) -> f64 {
///         self.slope * t
///     }
/// }
/// ```
pub trait RateFactory<U, P> {
    fn window(&self, prior: &RateState, t0: f64, t: f64, u: &U, p: &P) -> RateWindow;

    fn rate(&self, installed: &RateState, u: &U, p: &P, t: f64) -> f64;
}

/// Jump whose rate is constant between fires
pub struct ConstantRateJump<U, P> {
    rate: Box<dyn Fn(&U, &P, f64) -> f64>,
    effect: Effect<U, P>,
}

impl<U, P> ConstantRateJump<U, P> {
    pub fn new(
        rate: impl Fn(&U, &P, f64) -> f64 + 'static,
        effect: impl Fn(&mut U, &P, f64) + 'static,
    ) -> Self {
        Self {
            rate: Box::new(rate),
            effect: Box::new(effect),
        }
    }
}

impl<U, P> RateFactory<U, P> for ConstantRateJump<U, P> {
    fn window(&self, _prior: &RateState, t0: f64, _t: f64, u: &U, p: &P) -> RateWindow {
        RateWindow::constant((self.rate)(u, p, t0))
    }

    fn rate(&self, _installed: &RateState, u: &U, p: &P, t: f64) -> f64 {
        (self.rate)(u, p, t)
    }
}

/// Jump whose rate comes from a user [`RateFactory`]
pub struct ConditionalRateJump<U, P> {
    factory: Box<dyn RateFactory<U, P>>,
    effect: Effect<U, P>,
}

impl<U, P> ConditionalRateJump<U, P> {
    pub fn new(
        factory: impl RateFactory<U, P> + 'static,
        effect: impl Fn(&mut U, &P, f64) + 'static,
    ) -> Self {
        Self {
            factory: Box::new(factory),
            effect: Box::new(effect),
        }
    }
}

/// A jump type usable by the queue method
pub enum Jump<U, P> {
    Constant(ConstantRateJump<U, P>),
    Conditional(ConditionalRateJump<U, P>),
}

impl<U, P> Jump<U, P> {
    pub fn is_conditional(&self) -> bool {
        matches!(self, Jump::Conditional(_))
    }

    /// The rate factory the thinning sampler consults
    pub fn factory(&self) -> &dyn RateFactory<U, P> {
        match self {
            Jump::Constant(jump) => jump as &dyn RateFactory<U, P>,
            Jump::Conditional(jump) => jump.factory.as_ref(),
        }
    }

    /// Apply the jump's effect at fire time `t`
    pub fn apply(&self, u: &mut U, p: &P, t: f64) {
        match self {
            Jump::Constant(jump) => (jump.effect)(u, p, t),
            Jump::Conditional(jump) => (jump.effect)(u, p, t),
        }
    }
}

impl<U, P> fmt::Debug for Jump<U, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Jump::Constant(_) => write!(f, "Jump::Constant"),
            Jump::Conditional(_) => write!(f, "Jump::Conditional"),
        }
    }
}

/// Mass-action reactions (rate = k · Π binomial(u[s], n))
///
/// Only the stoichiometry is stored; propensity evaluation belongs to other
/// aggregation methods.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MassActionJump {
    /// Rate constant per reaction
    pub rate_constants: Vec<f64>,
    /// (species index, count) consumed per reaction
    pub reactant_stoich: Vec<Vec<(usize, u32)>>,
    /// (species index, change) applied per reaction
    pub net_stoich: Vec<Vec<(usize, i64)>>,
}

impl MassActionJump {
    pub fn new(
        rate_constants: Vec<f64>,
        reactant_stoich: Vec<Vec<(usize, u32)>>,
        net_stoich: Vec<Vec<(usize, i64)>>,
    ) -> Self {
        Self {
            rate_constants,
            reactant_stoich,
            net_stoich,
        }
    }

    pub fn num_reactions(&self) -> usize {
        self.rate_constants.len()
    }
}

/// Ordered collection of jump types
///
/// The builder methods take the rate and effect closures directly, so their
/// argument types follow from the set's `U` and `P`.
///
/// # Example
/// ```
/// use jump_simulator_core_rs::models::JumpSet;
///
/// let mut jumps: JumpSet<Vec<i64>, ()> = JumpSet::new();
/// let birth = jumps.push_constant(|_u, _p, _t| 2.0, |u, _p, _t| u[0] += 1);
/// assert_eq!(birth, 0);
/// assert_eq!(jumps.len(), 1);
/// assert!(!jumps.has_conditional());
/// ```
pub struct JumpSet<U, P> {
    jumps: Vec<Jump<U, P>>,
    mass_action: Option<MassActionJump>,
}

impl<U, P> From<ConstantRateJump<U, P>> for Jump<U, P> {
    fn from(jump: ConstantRateJump<U, P>) -> Self {
        Jump::Constant(jump)
    }
}

impl<U, P> From<ConditionalRateJump<U, P>> for Jump<U, P> {
    fn from(jump: ConditionalRateJump<U, P>) -> Self {
        Jump::Conditional(jump)
    }
}

impl<U, P> JumpSet<U, P> {
    pub fn new() -> Self {
        Self {
            jumps: Vec::new(),
            mass_action: None,
        }
    }

    /// Add an already built jump, returning its index
    pub fn push_jump(&mut self, jump: impl Into<Jump<U, P>>) -> usize {
        self.jumps.push(jump.into());
        self.jumps.len() - 1
    }

    /// Add a constant-rate jump, returning its index
    pub fn push_constant(
        &mut self,
        rate: impl Fn(&U, &P, f64) -> f64 + 'static,
        effect: impl Fn(&mut U, &P, f64) + 'static,
    ) -> usize {
        self.push_jump(ConstantRateJump::<U, P>::new(rate, effect))
    }

    /// Add a conditional-rate jump, returning its index
    pub fn push_conditional(
        &mut self,
        factory: impl RateFactory<U, P> + 'static,
        effect: impl Fn(&mut U, &P, f64) + 'static,
    ) -> usize {
        self.push_jump(ConditionalRateJump::<U, P>::new(factory, effect))
    }

    pub fn with_jump(mut self, jump: impl Into<Jump<U, P>>) -> Self {
        self.push_jump(jump);
        self
    }

    pub fn with_constant(
        mut self,
        rate: impl Fn(&U, &P, f64) -> f64 + 'static,
        effect: impl Fn(&mut U, &P, f64) + 'static,
    ) -> Self {
        self.push_constant(rate, effect);
        self
    }

    pub fn with_conditional(
        mut self,
        factory: impl RateFactory<U, P> + 'static,
        effect: impl Fn(&mut U, &P, f64) + 'static,
    ) -> Self {
        self.push_conditional(factory, effect);
        self
    }

    pub fn with_mass_action(mut self, mass_action: MassActionJump) -> Self {
        self.mass_action = Some(mass_action);
        self
    }

    /// Number of constant and conditional jump types
    pub fn len(&self) -> usize {
        self.jumps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jumps.is_empty()
    }

    pub fn has_conditional(&self) -> bool {
        self.jumps.iter().any(Jump::is_conditional)
    }

    pub fn has_mass_action(&self) -> bool {
        self.mass_action.is_some()
    }

    /// Number of mass-action reactions carried by the set
    pub fn num_mass_action(&self) -> usize {
        self.mass_action
            .as_ref()
            .map(MassActionJump::num_reactions)
            .unwrap_or(0)
    }

    pub fn into_parts(self) -> (Vec<Jump<U, P>>, Option<MassActionJump>) {
        (self.jumps, self.mass_action)
    }
}

impl<U, P> Default for JumpSet<U, P> {
    fn default() -> Self {
        Self::new()
    }
}
