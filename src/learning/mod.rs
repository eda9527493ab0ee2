//! Value learning: table, trace, policy and the agent that ties them together
//!
//! ## Update rule
//!
//! At the end of an episode the trace is walked from the last visit to the
//! first. Each visited entry moves toward the current target,
//!
//! ```text
//! V(s) <- V(s) + lr * (target - V(s))
//! ```
//!
//! and its updated value becomes the target of the visit before it. The first
//! target is the episode's reward (the outcome variable: -1, 0 or +1).

pub mod agent;
pub mod policy;
pub mod trace;
pub mod value_table;

pub use agent::TdAgent;
pub use policy::{EpsilonGreedy, action_values, greedy_action};
pub use trace::Trace;
pub use value_table::ValueTable;
