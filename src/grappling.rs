//! Grappling match domain: variables, state space, actions and game state

pub mod action;
pub mod space;
pub mod state;
pub mod variables;

pub use action::{Action, ActionCategory, Power};
pub use space::{STANDARD_STATE_COUNT, StateIndex, StateKey, StateSpace};
pub use state::{GameState, Outcome, Side};
pub use variables::{StateVariable, Variable};
