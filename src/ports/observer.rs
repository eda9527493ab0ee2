//! Observer port - abstraction for episode observation and data collection
//!
//! This port defines the interface for observing training events,
//! allowing composable data collection without coupling the episode
//! loop to specific output formats or metrics.

use serde::{Deserialize, Serialize};

use crate::{
    Result,
    grappling::{Action, GameState, Outcome, StateKey},
};

/// How an episode finished
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EpisodeEnd {
    /// The outcome variable became non-zero
    Terminal(Outcome),
    /// The per-episode step cap was reached first
    Truncated,
}

/// Everything known about a finished episode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodeReport {
    /// Index of the episode (0-based)
    pub episode: usize,
    pub end: EpisodeEnd,
    /// Reward fed into the backward pass
    pub reward: f64,
    /// Number of actions taken
    pub steps: usize,
}

/// A single action taken during an episode
#[derive(Debug, Clone, Copy)]
pub struct StepEvent<'a> {
    pub episode: usize,
    /// Step number within the episode (0-based)
    pub step: usize,
    /// State before the action
    pub before: &'a GameState,
    pub action: Action,
    /// State reached by the action
    pub after: &'a GameState,
    /// Key appended to the trace for this step
    pub key: StateKey,
}

/// Observer trait for monitoring a training run
///
/// # Event Sequence
///
/// 1. `on_run_start(total_episodes)` - once
/// 2. For each episode:
///    - `on_episode_start(episode)`
///    - `on_step(...)` for each action
///    - `on_episode_end(report)` after the backward pass
/// 3. `on_run_end()` - once
///
/// # Examples
///
/// ```no_run
/// use grapple::ports::{EpisodeReport, Observer};
///
/// struct Counter {
///     episodes: usize,
/// }
///
/// impl Observer for Counter {
///     fn on_episode_end(&mut self, _report: &EpisodeReport) -> grapple::Result<()> {
///         self.episodes += 1;
///         Ok(())
///     }
/// }
/// ```
pub trait Observer: Send {
    fn on_run_start(&mut self, _total_episodes: usize) -> Result<()> {
        Ok(())
    }

    fn on_episode_start(&mut self, _episode: usize) -> Result<()> {
        Ok(())
    }

    /// Called after the action is applied and recorded in the trace.
    fn on_step(&mut self, _event: &StepEvent<'_>) -> Result<()> {
        Ok(())
    }

    /// Called once the episode's values have been updated.
    fn on_episode_end(&mut self, _report: &EpisodeReport) -> Result<()> {
        Ok(())
    }

    fn on_run_end(&mut self) -> Result<()> {
        Ok(())
    }
}
