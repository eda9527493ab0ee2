//! Positional rule port - where grips, stances and outcomes change
//!
//! The stamina and fatigue part of a transition is fixed by
//! [`GameState::apply_action`]. Everything positional (which grips are
//! established, how stances shift, when a throw ends the match) is delegated
//! to a [`PositionalRule`], so different grappling models can be plugged into
//! the same learning loop.

use rand::rngs::StdRng;

use crate::{
    Error, Result,
    grappling::{Action, GameState, Side},
};

/// Strategy that applies the positional effect of an action.
///
/// `rng` is `Some` only when the transition runs in sampled mode; a rule that
/// needs randomness should treat `None` as a request for its deterministic
/// (most likely) outcome.
///
/// # Examples
///
/// ```
/// use grapple::{
///     grappling::{Action, ActionCategory, GameState, Outcome, Side},
///     ports::PositionalRule,
/// };
///
/// // A throw always wins.
/// let rule = |state: &mut GameState,
///             _side: Side,
///             action: Action,
///             _rng: Option<&mut rand::rngs::StdRng>|
///  -> grapple::Result<()> {
///     if action.category() == ActionCategory::ThrowNorthSouth {
///         state.conclude(Outcome::Win)?;
///     }
///     Ok(())
/// };
/// assert_eq!(rule.name(), "custom");
/// ```
pub trait PositionalRule: Send {
    /// Mutate `state` (already charged for stamina) with the action's effect.
    fn apply(
        &self,
        state: &mut GameState,
        side: Side,
        action: Action,
        rng: Option<&mut StdRng>,
    ) -> Result<()>;

    /// Name used in diagnostics and errors.
    fn name(&self) -> &str;
}

/// Documented no-op: positions never change, only stamina and fatigue do.
///
/// With this rule the outcome variable is never set, so episodes only end at
/// the runner's step cap.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassiveRule;

impl PositionalRule for PassiveRule {
    fn apply(
        &self,
        _state: &mut GameState,
        _side: Side,
        _action: Action,
        _rng: Option<&mut StdRng>,
    ) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &str {
        "passive"
    }
}

/// Refuses every action that has no positional model.
#[derive(Debug, Clone, Copy, Default)]
pub struct StrictRule;

impl PositionalRule for StrictRule {
    fn apply(
        &self,
        _state: &mut GameState,
        _side: Side,
        action: Action,
        _rng: Option<&mut StdRng>,
    ) -> Result<()> {
        Err(Error::TransitionNotImplemented {
            action: action.name(),
            rule: self.name().to_string(),
        })
    }

    fn name(&self) -> &str {
        "strict"
    }
}

impl<F> PositionalRule for F
where
    F: Fn(&mut GameState, Side, Action, Option<&mut StdRng>) -> Result<()> + Send,
{
    fn apply(
        &self,
        state: &mut GameState,
        side: Side,
        action: Action,
        rng: Option<&mut StdRng>,
    ) -> Result<()> {
        self(state, side, action, rng)
    }

    fn name(&self) -> &str {
        "custom"
    }
}
