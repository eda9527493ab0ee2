//! Observer implementations for training runs
//!
//! Observers allow composable data collection during training without coupling
//! the episode loop to specific output formats.

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
    sync::{Arc, Mutex, MutexGuard},
};

use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};

use crate::{
    Result,
    grappling::Outcome,
    ports::{EpisodeEnd, EpisodeReport, Observer, StepEvent},
};

/// Console observer - prints every step and each episode's reward
///
/// Output is diagnostic only and not meant to be parsed.
#[derive(Debug, Default)]
pub struct ConsoleObserver;

impl ConsoleObserver {
    pub fn new() -> Self {
        Self
    }
}

impl Observer for ConsoleObserver {
    fn on_step(&mut self, event: &StepEvent<'_>) -> Result<()> {
        println!(
            "current position {} action {}",
            event.before, event.action
        );
        println!("nxt state {}", event.after);
        println!("---------------------");
        Ok(())
    }

    fn on_episode_end(&mut self, report: &EpisodeReport) -> Result<()> {
        match report.end {
            EpisodeEnd::Terminal(_) => println!("Game End Reward {}", report.reward),
            EpisodeEnd::Truncated => println!(
                "Game End Reward {} (step cap reached after {} steps)",
                report.reward, report.steps
            ),
        }
        Ok(())
    }
}

/// Shared observer - forwards events to an observer the caller keeps a handle to
///
/// Lets collected data be read back after the runner has consumed its boxed
/// observers.
pub struct SharedObserver<O> {
    inner: Arc<Mutex<O>>,
}

impl<O: Observer> SharedObserver<O> {
    pub fn new(inner: Arc<Mutex<O>>) -> Self {
        Self { inner }
    }

    fn lock(&self) -> Result<MutexGuard<'_, O>> {
        self.inner
            .lock()
            .map_err(|_| crate::Error::InvalidConfiguration {
                message: "shared observer lock was poisoned".to_string(),
            })
    }
}

impl<O: Observer> Observer for SharedObserver<O> {
    fn on_run_start(&mut self, total_episodes: usize) -> Result<()> {
        self.lock()?.on_run_start(total_episodes)
    }

    fn on_episode_start(&mut self, episode: usize) -> Result<()> {
        self.lock()?.on_episode_start(episode)
    }

    fn on_step(&mut self, event: &StepEvent<'_>) -> Result<()> {
        self.lock()?.on_step(event)
    }

    fn on_episode_end(&mut self, report: &EpisodeReport) -> Result<()> {
        self.lock()?.on_episode_end(report)
    }

    fn on_run_end(&mut self) -> Result<()> {
        self.lock()?.on_run_end()
    }
}

/// Progress bar observer - shows training progress
pub struct ProgressObserver {
    progress_bar: Option<ProgressBar>,
    /// Episodes finished in the current run
    finished: usize,
    wins: usize,
    losses: usize,
    truncated: usize,
}

impl ProgressObserver {
    /// Create a new progress observer
    pub fn new() -> Self {
        Self {
            progress_bar: None,
            finished: 0,
            wins: 0,
            losses: 0,
            truncated: 0,
        }
    }

    fn message(&self) -> String {
        format!("{} L:{} T:{}", self.wins, self.losses, self.truncated)
    }
}

impl Default for ProgressObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl Observer for ProgressObserver {
    fn on_run_start(&mut self, total_episodes: usize) -> Result<()> {
        self.finished = 0;
        self.wins = 0;
        self.losses = 0;
        self.truncated = 0;

        let pb = ProgressBar::new(total_episodes as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} episodes (W:{msg})")
                .map_err(|e| crate::Error::ProgressBarTemplate {
                    message: e.to_string(),
                })?
                .progress_chars("=>-"),
        );
        self.progress_bar = Some(pb);
        Ok(())
    }

    fn on_episode_end(&mut self, report: &EpisodeReport) -> Result<()> {
        self.finished += 1;
        match report.end {
            EpisodeEnd::Terminal(Outcome::Win) => self.wins += 1,
            EpisodeEnd::Terminal(_) => self.losses += 1,
            EpisodeEnd::Truncated => self.truncated += 1,
        }

        // `report.episode` counts over the runner's lifetime, not this run.
        if let Some(pb) = &self.progress_bar {
            pb.set_position(self.finished as u64);
            pb.set_message(self.message());
        }
        Ok(())
    }

    fn on_run_end(&mut self) -> Result<()> {
        if let Some(pb) = &self.progress_bar {
            pb.finish_with_message(self.message());
        }
        Ok(())
    }
}

/// Summary of training metrics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsSummary {
    pub total_episodes: usize,
    pub wins: usize,
    pub losses: usize,
    pub truncated: usize,
    pub win_rate: f64,
    pub avg_episode_length: f64,
    /// Count of each action taken, in scan order
    pub action_counts: Vec<(String, usize)>,
}

/// Metrics observer - tracks outcomes, lengths and action usage
pub struct MetricsObserver {
    wins: usize,
    losses: usize,
    truncated: usize,
    episode_lengths: Vec<usize>,
    action_counts: [usize; crate::grappling::Action::COUNT],
}

impl MetricsObserver {
    /// Create a new metrics observer
    pub fn new() -> Self {
        Self {
            wins: 0,
            losses: 0,
            truncated: 0,
            episode_lengths: Vec::new(),
            action_counts: [0; crate::grappling::Action::COUNT],
        }
    }

    pub fn total_episodes(&self) -> usize {
        self.episode_lengths.len()
    }

    /// Get current win rate
    pub fn win_rate(&self) -> f64 {
        if self.episode_lengths.is_empty() {
            0.0
        } else {
            self.wins as f64 / self.episode_lengths.len() as f64
        }
    }

    /// Get average episode length
    pub fn avg_episode_length(&self) -> f64 {
        if self.episode_lengths.is_empty() {
            0.0
        } else {
            self.episode_lengths.iter().sum::<usize>() as f64 / self.episode_lengths.len() as f64
        }
    }

    /// Get metrics summary
    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            total_episodes: self.total_episodes(),
            wins: self.wins,
            losses: self.losses,
            truncated: self.truncated,
            win_rate: self.win_rate(),
            avg_episode_length: self.avg_episode_length(),
            action_counts: crate::grappling::Action::ALL
                .iter()
                .zip(self.action_counts)
                .map(|(action, count)| (action.name(), count))
                .collect(),
        }
    }
}

impl Default for MetricsObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl Observer for MetricsObserver {
    fn on_step(&mut self, event: &StepEvent<'_>) -> Result<()> {
        self.action_counts[event.action.ordinal()] += 1;
        Ok(())
    }

    fn on_episode_end(&mut self, report: &EpisodeReport) -> Result<()> {
        self.episode_lengths.push(report.steps);
        match report.end {
            EpisodeEnd::Terminal(Outcome::Win) => self.wins += 1,
            EpisodeEnd::Terminal(_) => self.losses += 1,
            EpisodeEnd::Truncated => self.truncated += 1,
        }
        Ok(())
    }
}

/// Observation of a single step during an episode
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepObservation {
    pub step: usize,
    /// State vector before the action
    pub before: Vec<i8>,
    pub action: String,
    /// State vector after the action
    pub after: Vec<i8>,
    pub agent_stamina: u32,
    /// Trace key as `(from, to)` indices
    pub key: (usize, usize),
}

/// Complete observation of one episode
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Observation {
    pub episode: usize,
    pub end: EpisodeEnd,
    pub reward: f64,
    pub steps: Vec<StepObservation>,
}

/// JSONL observer - writes one JSON line per episode
pub struct JsonlObserver {
    writer: BufWriter<File>,
    current_steps: Vec<StepObservation>,
}

impl JsonlObserver {
    /// Create a new JSONL observer
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::create(path)?;
        let writer = BufWriter::new(file);
        Ok(Self {
            writer,
            current_steps: Vec::new(),
        })
    }
}

impl Observer for JsonlObserver {
    fn on_episode_start(&mut self, _episode: usize) -> Result<()> {
        self.current_steps.clear();
        Ok(())
    }

    fn on_step(&mut self, event: &StepEvent<'_>) -> Result<()> {
        self.current_steps.push(StepObservation {
            step: event.step,
            before: event.before.values().to_vec(),
            action: event.action.name(),
            after: event.after.values().to_vec(),
            agent_stamina: event.after.stamina(crate::grappling::Side::Agent),
            key: (event.key.from.value(), event.key.to.value()),
        });
        Ok(())
    }

    fn on_episode_end(&mut self, report: &EpisodeReport) -> Result<()> {
        let observation = Observation {
            episode: report.episode,
            end: report.end,
            reward: report.reward,
            steps: std::mem::take(&mut self.current_steps),
        };
        serde_json::to_writer(&mut self.writer, &observation)?;
        writeln!(self.writer)?;
        Ok(())
    }

    fn on_run_end(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(episode: usize, end: EpisodeEnd, steps: usize) -> EpisodeReport {
        EpisodeReport {
            episode,
            end,
            reward: match end {
                EpisodeEnd::Terminal(outcome) => f64::from(outcome.code()),
                EpisodeEnd::Truncated => 0.0,
            },
            steps,
        }
    }

    #[test]
    fn progress_position_restarts_each_run() {
        let mut observer = ProgressObserver::new();
        observer.on_run_start(2).unwrap();
        observer.on_episode_end(&report(0, EpisodeEnd::Truncated, 3)).unwrap();
        observer.on_episode_end(&report(1, EpisodeEnd::Truncated, 3)).unwrap();
        observer.on_run_end().unwrap();

        // Second run on a runner whose lifetime counter is already at 2.
        observer.on_run_start(2).unwrap();
        observer
            .on_episode_end(&report(2, EpisodeEnd::Terminal(Outcome::Win), 1))
            .unwrap();

        let pb = observer.progress_bar.as_ref().unwrap();
        assert_eq!(pb.position(), 1);
        assert_eq!(pb.length(), Some(2));
        assert_eq!(observer.message(), "1 L:0 T:0");
    }

    #[test]
    fn shared_metrics_are_readable_after_the_run() {
        let metrics = Arc::new(Mutex::new(MetricsObserver::new()));
        let mut shared = SharedObserver::new(Arc::clone(&metrics));
        shared
            .on_episode_end(&report(0, EpisodeEnd::Terminal(Outcome::Win), 4))
            .unwrap();
        shared
            .on_episode_end(&report(1, EpisodeEnd::Terminal(Outcome::Loss), 2))
            .unwrap();
        drop(shared);

        let summary = metrics.lock().unwrap().summary();
        assert_eq!(summary.total_episodes, 2);
        assert_eq!((summary.wins, summary.losses), (1, 1));
        assert_eq!(summary.win_rate, 0.5);
        assert_eq!(summary.avg_episode_length, 3.0);
        assert_eq!(summary.action_counts.len(), crate::grappling::Action::COUNT);
    }
}
