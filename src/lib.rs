//! Tabular TD sandbox for a two-player grappling match
//!
//! This crate provides:
//! - A discrete state space of grip, stance and outcome variables with a
//!   bijective index encoding
//! - Game state with stamina and fatigue bookkeeping
//! - A pluggable transition function and an epsilon-greedy policy
//! - A dense value table trained by a chained backward TD update
//! - An episode runner with composable observers

pub mod app;
pub mod cli;
pub mod error;
pub mod grappling;
pub mod learning;
pub mod pipeline;
pub mod ports;
pub mod transition;

pub use app::AgentConfig;
pub use error::{Error, Result};
pub use grappling::{Action, GameState, Outcome, Side, StateKey, StateSpace};
pub use learning::TdAgent;
pub use pipeline::{EpisodeRunner, RunSummary};
