//! Types for the report pipeline.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::ScheduleConfig;

/// Errors that fail a cycle.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Reading from pretix failed.
    #[error("source error: {0}")]
    Source(#[from] crate::pretix::SourceError),

    /// A view could not be derived.
    #[error("view error: {0}")]
    View(#[from] crate::views::ViewError),

    /// Rendering or uploading failed.
    #[error("publish error: {0}")]
    Publish(#[from] crate::publisher::PublishError),
}

/// Result of one cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CycleOutcome {
    /// Data changed and every report was uploaded.
    Published { files: usize },
    /// Data is the same as after the last successful cycle.
    Unchanged,
    /// The cycle failed; the message is the logged error.
    Failed { error: String },
}

impl CycleOutcome {
    /// Metric label.
    pub fn label(&self) -> &'static str {
        match self {
            CycleOutcome::Published { .. } => "published",
            CycleOutcome::Unchanged => "unchanged",
            CycleOutcome::Failed { .. } => "failed",
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, CycleOutcome::Failed { .. })
    }
}

/// Timing of the cycle runner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunnerSchedule {
    /// Time between the end of one cycle and the start of the next.
    pub interval: Duration,
    /// How often the runner checks whether a cycle is due.
    pub check_interval: Duration,
    /// Stop after the first cycle.
    pub run_once: bool,
}

impl From<&ScheduleConfig> for RunnerSchedule {
    fn from(config: &ScheduleConfig) -> Self {
        Self {
            interval: Duration::from_secs(config.interval_minutes * 60),
            check_interval: Duration::from_secs(config.check_interval_seconds),
            run_once: config.run_once,
        }
    }
}

/// What the runner has done so far.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunnerStatus {
    /// Whether the runner loop is active.
    pub running: bool,
    /// Cycles completed, whatever their outcome.
    pub cycles_run: u64,
    pub last_outcome: Option<CycleOutcome>,
    /// End of the most recent cycle.
    pub last_checked: Option<DateTime<Utc>>,
    /// End of the most recent cycle that uploaded reports.
    pub last_published: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
}

impl RunnerStatus {
    /// Record a finished cycle.
    pub fn record(&mut self, outcome: &CycleOutcome, at: DateTime<Utc>) {
        self.cycles_run += 1;
        self.last_checked = Some(at);
        match outcome {
            CycleOutcome::Published { .. } => self.last_published = Some(at),
            CycleOutcome::Failed { error } => self.last_error = Some(error.clone()),
            CycleOutcome::Unchanged => {}
        }
        self.last_outcome = Some(outcome.clone());
    }
}
