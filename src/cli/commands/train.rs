//! Train command - run TD episodes and print the learned values

use std::{
    fs::File,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use anyhow::{Context, Result, anyhow};
use clap::{Parser, ValueEnum};
use serde::Serialize;
use serde_json::to_writer_pretty;

use crate::{
    app::AgentConfig,
    cli::output::{format_number, print_kv, print_nonzero_values, print_section, print_subsection},
    learning::TdAgent,
    pipeline::{
        ConsoleObserver, EpisodeRunner, JsonlObserver, MetricsObserver, MetricsSummary,
        ProgressObserver, RunSummary, SharedObserver,
    },
    ports::{PassiveRule, PositionalRule, StrictRule},
    transition::TransitionMode,
};

#[derive(Debug, Serialize)]
struct TrainingSummaryFile {
    training: RunSummary,
    metrics: MetricsSummary,
    rule: String,
    config: AgentConfig,
    nonzero_values: usize,
}

fn sanitize_summary_path(raw: &Path) -> PathBuf {
    let mut normalized = raw.to_path_buf();
    let raw_str = raw.as_os_str().to_string_lossy();

    // Trailing separator or no file name means a directory target.
    if raw_str.ends_with(std::path::MAIN_SEPARATOR) || normalized.file_name().is_none() {
        normalized.push("training_summary.json");
        return normalized;
    }

    match normalized.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("json") => normalized,
        _ => {
            normalized.set_extension("json");
            normalized
        }
    }
}

#[derive(Parser, Debug)]
#[command(about = "Train the TD agent", allow_negative_numbers = true)]
pub struct TrainArgs {
    /// Number of training episodes
    #[arg(long, short = 'e', default_value_t = 50)]
    pub episodes: usize,

    /// Step size of the backward update (0.0-1.0)
    #[arg(long, default_value_t = 0.2)]
    pub learning_rate: f64,

    /// Probability of taking a uniformly random action (0.0-1.0)
    #[arg(long, default_value_t = 0.3)]
    pub exploration_rate: f64,

    /// Starting stamina of the agent
    #[arg(long, default_value_t = 50)]
    pub agent_stamina: u32,

    /// Starting stamina of the opponent
    #[arg(long, default_value_t = 50)]
    pub opponent_stamina: u32,

    /// Stamina below which a side becomes fatigued
    #[arg(long, default_value_t = 20)]
    pub fatigue_threshold: u32,

    /// Actions per episode before it is cut off
    #[arg(long, default_value_t = 200)]
    pub max_steps: usize,

    /// Random seed for reproducibility
    #[arg(long)]
    pub seed: Option<u64>,

    /// Positional rule applied after the stamina update
    #[arg(long, value_enum, default_value_t = RuleKind::Passive)]
    pub rule: RuleKind,

    /// Let the positional rule sample its outcome
    #[arg(long, default_value_t = false)]
    pub sampled: bool,

    /// Do not pin the terminal entry to the reward
    #[arg(long, default_value_t = false)]
    pub no_pin_terminal: bool,

    /// Round updated values to this many decimals
    #[arg(long)]
    pub round_values: Option<u32>,

    /// Which part of the value table to print after training
    #[arg(long, value_enum, default_value_t = ValueDisplay::Full)]
    pub values: ValueDisplay,

    /// Suppress per-step console output
    #[arg(long, short = 'q', default_value_t = false)]
    pub quiet: bool,

    /// Show progress bar
    #[arg(long, default_value_t = false)]
    pub progress: bool,

    /// Optional file for JSONL observations
    #[arg(long)]
    pub observations: Option<PathBuf>,

    /// Optional path for writing a summary JSON file
    #[arg(long)]
    pub summary: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RuleKind {
    /// Positional variables are left unchanged
    Passive,
    /// Any action fails with a not-implemented error
    Strict,
}

impl RuleKind {
    fn build(self) -> Box<dyn PositionalRule> {
        match self {
            RuleKind::Passive => Box::new(PassiveRule),
            RuleKind::Strict => Box::new(StrictRule),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ValueDisplay {
    /// Every entry of the table
    Full,
    /// Only entries that moved away from zero
    Nonzero,
    /// Nothing
    None,
}

impl TrainArgs {
    fn config(&self) -> AgentConfig {
        let mode = if self.sampled {
            TransitionMode::Sampled
        } else {
            TransitionMode::Deterministic
        };
        let mut config = AgentConfig::default()
            .with_episodes(self.episodes)
            .with_learning_rate(self.learning_rate)
            .with_exploration_rate(self.exploration_rate)
            .with_stamina(self.agent_stamina, self.opponent_stamina)
            .with_fatigue_threshold(self.fatigue_threshold)
            .with_max_steps(self.max_steps)
            .with_pin_terminal(!self.no_pin_terminal)
            .with_value_precision(self.round_values)
            .with_transition_mode(mode);
        if let Some(seed) = self.seed {
            config = config.with_seed(seed);
        }
        config
    }
}

pub fn execute(args: TrainArgs) -> Result<()> {
    let config = args.config();
    let mut agent = TdAgent::with_rule(config.clone(), args.rule.build())
        .context("failed to construct agent")?;

    let mut runner = EpisodeRunner::new();
    if !args.quiet {
        runner = runner.with_observer(Box::new(ConsoleObserver::new()));
    }
    if args.progress {
        runner = runner.with_observer(Box::new(ProgressObserver::new()));
    }
    if let Some(path) = &args.observations {
        let observer = JsonlObserver::new(path)
            .with_context(|| format!("failed to create {}", path.display()))?;
        runner = runner.with_observer(Box::new(observer));
    }
    let metrics = Arc::new(Mutex::new(MetricsObserver::new()));
    runner = runner.with_observer(Box::new(SharedObserver::new(Arc::clone(&metrics))));

    let summary = runner.run(&mut agent).context("training run failed")?;
    let metrics = metrics
        .lock()
        .map_err(|_| anyhow!("metrics observer lock was poisoned"))?
        .summary();

    print_section("Training Summary");
    print_kv("Episodes", &summary.episodes.to_string());
    print_kv("Wins", &summary.wins.to_string());
    print_kv("Losses", &summary.losses.to_string());
    print_kv("Truncated", &summary.truncated.to_string());
    print_kv("Mean steps", &format!("{:.1}", summary.mean_steps));
    print_kv("Win rate", &format!("{:.1}%", metrics.win_rate * 100.0));
    print_kv("Rule", agent.transition().rule_name());
    print_kv(
        "Non-zero values",
        &format_number(agent.table().nonzero_count()),
    );

    print_subsection("Actions taken");
    for (action, count) in &metrics.action_counts {
        print_kv(action, &format_number(*count));
    }

    match args.values {
        ValueDisplay::Full => {
            print_section("Value Table");
            print!("{}", agent.table());
        }
        ValueDisplay::Nonzero => {
            print_section("Non-zero Values");
            print_nonzero_values(agent.table(), agent.space());
        }
        ValueDisplay::None => {}
    }

    if let Some(raw) = &args.summary {
        let path = sanitize_summary_path(raw);
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let file = File::create(&path)
            .with_context(|| format!("failed to create {}", path.display()))?;
        let payload = TrainingSummaryFile {
            training: summary,
            metrics,
            rule: agent.transition().rule_name().to_string(),
            config,
            nonzero_values: agent.table().nonzero_count(),
        };
        to_writer_pretty(file, &payload)?;
        println!("\nSummary written to {}", path.display());
    }

    Ok(())
}
