//! Training pipeline abstractions
//!
//! This module provides:
//! - The episode runner that plays episodes and triggers learning
//! - Composable observers for printing, progress and data export

pub mod observers;
pub mod runner;

pub use observers::{
    ConsoleObserver, JsonlObserver, MetricsObserver, MetricsSummary, Observation,
    ProgressObserver, SharedObserver, StepObservation,
};
pub use runner::{EpisodeRunner, Phase, RunSummary};

pub use crate::ports::Observer;
