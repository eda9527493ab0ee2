//! Configuration types for agent creation.

use serde::{Deserialize, Serialize};

use crate::{Error, Result, grappling::STANDARD_STATE_COUNT, transition::TransitionMode};

/// Every tunable of the learning loop.
///
/// # Examples
///
/// ```
/// use grapple::app::AgentConfig;
///
/// let config = AgentConfig::default()
///     .with_seed(42)
///     .with_episodes(10)
///     .with_exploration_rate(0.0);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Step size of the backward update (default 0.2)
    pub learning_rate: f64,
    /// Probability of a uniformly random action (default 0.3)
    pub exploration_rate: f64,
    /// Agent stamina at episode start (default 50)
    pub agent_stamina_max: u32,
    /// Opponent stamina at episode start (default 50)
    pub opponent_stamina_max: u32,
    /// Stamina below which a side becomes fatigued (default 20)
    pub fatigue_threshold: u32,
    /// Episodes per run (default 50)
    pub episodes: usize,
    /// Step cap after which an episode is truncated (default 200)
    pub max_steps_per_episode: usize,
    /// Write the reward straight into the terminal state's entry (default true)
    pub pin_terminal: bool,
    /// Round updated values to this many decimals (default off)
    pub value_precision: Option<u32>,
    /// Deterministic or sampled positional transitions
    pub transition_mode: TransitionMode,
    /// State count the variable domains must multiply out to (default 1728)
    pub expected_state_count: usize,
    /// Random seed for reproducibility
    pub seed: Option<u64>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.2,
            exploration_rate: 0.3,
            agent_stamina_max: 50,
            opponent_stamina_max: 50,
            fatigue_threshold: 20,
            episodes: 50,
            max_steps_per_episode: 200,
            pin_terminal: true,
            value_precision: None,
            transition_mode: TransitionMode::Deterministic,
            expected_state_count: STANDARD_STATE_COUNT,
            seed: None,
        }
    }
}

impl AgentConfig {
    pub fn with_learning_rate(mut self, rate: f64) -> Self {
        self.learning_rate = rate;
        self
    }

    pub fn with_exploration_rate(mut self, rate: f64) -> Self {
        self.exploration_rate = rate;
        self
    }

    /// Set both stamina maxima.
    pub fn with_stamina(mut self, agent: u32, opponent: u32) -> Self {
        self.agent_stamina_max = agent;
        self.opponent_stamina_max = opponent;
        self
    }

    pub fn with_fatigue_threshold(mut self, threshold: u32) -> Self {
        self.fatigue_threshold = threshold;
        self
    }

    pub fn with_episodes(mut self, episodes: usize) -> Self {
        self.episodes = episodes;
        self
    }

    pub fn with_max_steps(mut self, steps: usize) -> Self {
        self.max_steps_per_episode = steps;
        self
    }

    pub fn with_pin_terminal(mut self, pin: bool) -> Self {
        self.pin_terminal = pin;
        self
    }

    pub fn with_value_precision(mut self, decimals: Option<u32>) -> Self {
        self.value_precision = decimals;
        self
    }

    pub fn with_transition_mode(mut self, mode: TransitionMode) -> Self {
        self.transition_mode = mode;
        self
    }

    pub fn with_expected_state_count(mut self, count: usize) -> Self {
        self.expected_state_count = count;
        self
    }

    /// Set the random seed for deterministic behavior.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Check ranges that would make the learning loop meaningless.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] naming the first bad field.
    pub fn validate(&self) -> Result<()> {
        let invalid = |message: String| Err(Error::InvalidConfiguration { message });

        if !(0.0..=1.0).contains(&self.learning_rate) {
            return invalid(format!(
                "learning_rate must be within [0, 1], got {}",
                self.learning_rate
            ));
        }
        if !(0.0..=1.0).contains(&self.exploration_rate) {
            return invalid(format!(
                "exploration_rate must be within [0, 1], got {}",
                self.exploration_rate
            ));
        }
        if self.max_steps_per_episode == 0 {
            return invalid("max_steps_per_episode must be at least 1".to_string());
        }
        if let Some(decimals) = self.value_precision.filter(|&d| d > 12) {
            return invalid(format!(
                "value_precision must be at most 12 decimals, got {decimals}"
            ));
        }
        Ok(())
    }
}
