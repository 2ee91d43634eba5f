//! Cycle runner: run now, then on a fixed interval until shutdown.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{broadcast, RwLock};
use tokio::time::Instant;
use tracing::{debug, info};

use super::cycle::ReportPipeline;
use super::types::{CycleOutcome, RunnerSchedule, RunnerStatus};

/// Drives a [`ReportPipeline`], one cycle at a time.
pub struct CycleRunner {
    pipeline: ReportPipeline,
    schedule: RunnerSchedule,
    status: Arc<RwLock<RunnerStatus>>,
}

impl CycleRunner {
    pub fn new(pipeline: ReportPipeline, schedule: RunnerSchedule) -> Self {
        Self {
            pipeline,
            schedule,
            status: Arc::new(RwLock::new(RunnerStatus::default())),
        }
    }

    /// Shared handle to the runner status.
    pub fn status(&self) -> Arc<RwLock<RunnerStatus>> {
        Arc::clone(&self.status)
    }

    pub fn pipeline(&self) -> &ReportPipeline {
        &self.pipeline
    }

    /// Run a single cycle and record it.
    pub async fn run_cycle(&mut self) -> CycleOutcome {
        let outcome = self.pipeline.run_cycle().await;
        self.status.write().await.record(&outcome, Utc::now());
        outcome
    }

    /// Run immediately, then whenever the interval has passed since the end
    /// of the previous cycle. Returns after the first cycle when the
    /// schedule says so, or once `shutdown` fires. A cycle in flight is
    /// always finished first.
    pub async fn run(mut self, mut shutdown: broadcast::Receiver<()>) {
        self.status.write().await.running = true;

        self.run_cycle().await;

        if self.schedule.run_once {
            info!("Run once is set. Exiting after a single run.");
            self.status.write().await.running = false;
            return;
        }

        info!(
            "Scheduling cycles every {:?} (checking every {:?})",
            self.schedule.interval, self.schedule.check_interval
        );
        let mut next_due = Instant::now() + self.schedule.interval;

        loop {
            tokio::select! {
                _ = shutdown.recv() => {
                    info!("Cycle runner received shutdown signal");
                    break;
                }
                _ = tokio::time::sleep(self.schedule.check_interval) => {
                    if Instant::now() < next_due {
                        continue;
                    }
                    debug!("Cycle is due");
                    self.run_cycle().await;
                    next_due = Instant::now() + self.schedule.interval;
                }
            }
        }

        self.status.write().await.running = false;
        info!("Cycle runner stopped");
    }
}
