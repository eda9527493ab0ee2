//! Ports (trait boundaries) for pluggable behaviour.
//!
//! The episode loop is written against these traits; concrete positional
//! models and observation sinks are adapters that implement them.

pub mod observer;
pub mod rule;

pub use observer::{EpisodeEnd, EpisodeReport, Observer, StepEvent};
pub use rule::{PassiveRule, PositionalRule, StrictRule};
