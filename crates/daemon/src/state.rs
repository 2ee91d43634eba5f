use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use p2n_core::RunnerStatus;

/// Shared application state
pub struct AppState {
    event_url: String,
    started_at: DateTime<Utc>,
    status: Arc<RwLock<RunnerStatus>>,
}

impl AppState {
    pub fn new(event_url: String, status: Arc<RwLock<RunnerStatus>>) -> Self {
        Self {
            event_url,
            started_at: Utc::now(),
            status,
        }
    }

    /// pretix event the reports are built from.
    pub fn event_url(&self) -> &str {
        &self.event_url
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Snapshot of the runner status.
    pub async fn runner_status(&self) -> RunnerStatus {
        self.status.read().await.clone()
    }
}
