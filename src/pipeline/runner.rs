//! Episode runner: plays episodes and triggers the backward update

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{
    Result,
    grappling::{GameState, Outcome},
    learning::{TdAgent, Trace},
    ports::{EpisodeEnd, EpisodeReport, Observer, StepEvent},
};

/// Where an episode currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    Running,
    /// The outcome variable is non-zero
    Terminal,
    /// The step cap was reached while still ongoing
    Truncated,
}

/// Result of a training run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Episodes played
    pub episodes: usize,
    pub wins: usize,
    pub losses: usize,
    /// Episodes stopped by the step cap
    pub truncated: usize,
    /// Actions taken over all episodes
    pub total_steps: usize,
    /// Average actions per episode
    pub mean_steps: f64,
}

impl RunSummary {
    fn from_reports(reports: &[EpisodeReport]) -> Self {
        let episodes = reports.len();
        let count = |wanted: EpisodeEnd| reports.iter().filter(|r| r.end == wanted).count();
        let total_steps = reports.iter().map(|r| r.steps).sum::<usize>();
        let mean_steps = if episodes > 0 {
            total_steps as f64 / episodes as f64
        } else {
            0.0
        };

        Self {
            episodes,
            wins: count(EpisodeEnd::Terminal(Outcome::Win)),
            losses: count(EpisodeEnd::Terminal(Outcome::Loss)),
            truncated: count(EpisodeEnd::Truncated),
            total_steps,
            mean_steps,
        }
    }

    /// Save summary to a JSON file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = std::fs::File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }

    /// Load summary from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let summary = serde_json::from_reader(file)?;
        Ok(summary)
    }
}

/// Drives episodes for one agent, notifying observers along the way.
pub struct EpisodeRunner {
    observers: Vec<Box<dyn Observer>>,
    trace: Trace,
    episodes_completed: usize,
}

impl EpisodeRunner {
    pub fn new() -> Self {
        Self {
            observers: Vec::new(),
            trace: Trace::new(),
            episodes_completed: 0,
        }
    }

    /// Add an observer to the runner
    pub fn with_observer(mut self, observer: Box<dyn Observer>) -> Self {
        self.observers.push(observer);
        self
    }

    /// Episodes finished over the runner's lifetime
    pub fn episodes_completed(&self) -> usize {
        self.episodes_completed
    }

    /// Play the number of episodes set in the agent's configuration.
    pub fn run(&mut self, agent: &mut TdAgent) -> Result<RunSummary> {
        let episodes = agent.config().episodes;
        self.run_episodes(agent, episodes)
    }

    /// Play `episodes` episodes in sequence.
    pub fn run_episodes(&mut self, agent: &mut TdAgent, episodes: usize) -> Result<RunSummary> {
        log::info!("starting run of {episodes} episodes");
        for observer in &mut self.observers {
            observer.on_run_start(episodes)?;
        }

        let mut reports = Vec::with_capacity(episodes);
        for _ in 0..episodes {
            reports.push(self.play_episode(agent)?);
        }

        for observer in &mut self.observers {
            observer.on_run_end()?;
        }

        let summary = RunSummary::from_reports(&reports);
        log::info!(
            "run finished: {} wins, {} losses, {} truncated, {:.1} steps/episode",
            summary.wins,
            summary.losses,
            summary.truncated,
            summary.mean_steps
        );
        Ok(summary)
    }

    /// Play one episode from a fresh state and apply the backward update.
    pub fn play_episode(&mut self, agent: &mut TdAgent) -> Result<EpisodeReport> {
        let episode = self.episodes_completed;
        let max_steps = agent.config().max_steps_per_episode;

        self.trace.clear();
        let mut state = agent.initial_state();
        let mut phase = phase_of(&state, 0, max_steps);
        let mut steps = 0;

        for observer in &mut self.observers {
            observer.on_episode_start(episode)?;
        }

        while phase == Phase::Running {
            let action = agent.choose_action(&state)?;
            let (next, key) = agent.step(&state, action)?;
            // The trace records the reached state, not the one acted from.
            self.trace.push(key);

            let event = StepEvent {
                episode,
                step: steps,
                before: &state,
                action,
                after: &next,
                key,
            };
            for observer in &mut self.observers {
                observer.on_step(&event)?;
            }

            state = next;
            steps += 1;
            phase = phase_of(&state, steps, max_steps);
        }

        let reward = agent.learn(&self.trace, &state)?;
        let end = match phase {
            Phase::Terminal => EpisodeEnd::Terminal(state.outcome()),
            _ => EpisodeEnd::Truncated,
        };
        let report = EpisodeReport {
            episode,
            end,
            reward,
            steps,
        };
        log::debug!("episode {episode} ended {end:?} after {steps} steps");

        for observer in &mut self.observers {
            observer.on_episode_end(&report)?;
        }

        self.trace.clear();
        self.episodes_completed += 1;
        Ok(report)
    }
}

impl Default for EpisodeRunner {
    fn default() -> Self {
        Self::new()
    }
}

fn phase_of(state: &GameState, steps: usize, max_steps: usize) -> Phase {
    if state.is_terminal() {
        Phase::Terminal
    } else if steps >= max_steps {
        Phase::Truncated
    } else {
        Phase::Running
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::AgentConfig;

    #[test]
    fn passive_rule_truncates_every_episode() {
        let config = AgentConfig::default()
            .with_seed(5)
            .with_episodes(3)
            .with_max_steps(7);
        let mut agent = TdAgent::new(config).unwrap();
        let mut runner = EpisodeRunner::new();

        let summary = runner.run(&mut agent).unwrap();
        assert_eq!(summary.episodes, 3);
        assert_eq!(summary.truncated, 3);
        assert_eq!(summary.total_steps, 21);
        assert_eq!(runner.episodes_completed(), 3);
        // Zero reward pulled toward zero leaves the table untouched.
        assert!(agent.table().is_zeroed());
    }

    #[test]
    fn zero_episodes_leave_table_zeroed() {
        let mut agent = TdAgent::new(AgentConfig::default().with_seed(1)).unwrap();
        let summary = EpisodeRunner::new().run_episodes(&mut agent, 0).unwrap();
        assert_eq!(summary.episodes, 0);
        assert_eq!(summary.mean_steps, 0.0);
        assert!(agent.table().is_zeroed());
    }

    #[test]
    fn summary_roundtrips_through_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("summary.json");
        let summary = RunSummary {
            episodes: 2,
            wins: 1,
            losses: 0,
            truncated: 1,
            total_steps: 9,
            mean_steps: 4.5,
        };
        summary.save(&path).unwrap();
        assert_eq!(RunSummary::load(&path).unwrap(), summary);
    }
}
