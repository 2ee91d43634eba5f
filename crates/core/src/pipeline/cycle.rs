//! One fetch, compare, derive and publish pass.

use std::sync::Arc;

use chrono::Utc;
use chrono_tz::Tz;
use tracing::{error, info};

use crate::config::{time_zone, Config, ConfigError, ReportFiles};
use crate::flatten::{flatten, item_index, question_index};
use crate::metrics;
use crate::pretix::PretixSource;
use crate::publisher::{
    docker_image_text, last_updated_text, Publisher, DOCKER_IMAGE_FILE, LAST_UPDATED_FILE,
};
use crate::snapshot::{Change, ChangeDetector};
use crate::table::Table;
use crate::views::{derive_reports, ReportLayout};

use super::types::{CycleOutcome, PipelineError};

/// Report settings a pipeline needs from the configuration.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub location_question: String,
    pub layout: ReportLayout,
    pub files: ReportFiles,
    pub time_zone: Tz,
    pub docker_image: String,
}

impl PipelineSettings {
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        Ok(Self {
            location_question: config.report.location_question.clone(),
            layout: config.report.layout.clone(),
            files: config.report.files.clone(),
            time_zone: time_zone(config)?,
            docker_image: config.report.docker_image.clone(),
        })
    }
}

impl Default for PipelineSettings {
    fn default() -> Self {
        let report = crate::config::ReportConfig::default();
        Self {
            location_question: report.location_question,
            layout: report.layout,
            files: report.files,
            time_zone: chrono_tz::Europe::Berlin,
            docker_image: report.docker_image,
        }
    }
}

/// The report pipeline for one event.
///
/// Owns the snapshot of the last accepted dataset and whether the previous
/// cycle succeeded. Cycles must not overlap, which `&mut self` enforces.
pub struct ReportPipeline {
    source: Arc<dyn PretixSource>,
    publisher: Arc<dyn Publisher>,
    settings: PipelineSettings,
    detector: ChangeDetector,
    last_run_succeeded: bool,
}

impl ReportPipeline {
    pub fn new(
        source: Arc<dyn PretixSource>,
        publisher: Arc<dyn Publisher>,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            source,
            publisher,
            settings,
            detector: ChangeDetector::new(),
            last_run_succeeded: false,
        }
    }

    pub fn last_run_succeeded(&self) -> bool {
        self.last_run_succeeded
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Fetch questions, items and orders and flatten them.
    pub async fn fetch_raw(&self) -> Result<Table, PipelineError> {
        let questions = self.source.fetch_questions().await?;
        let items = self.source.fetch_items().await?;
        let orders = self.source.fetch_orders().await?;

        let raw = flatten(
            &orders,
            &question_index(&questions),
            &item_index(&items),
        );
        info!(
            "Fetched raw data from pretix ({} rows, {} columns).",
            raw.len(),
            raw.columns().len()
        );
        metrics::ROWS_FETCHED.set(raw.len() as i64);

        Ok(raw)
    }

    /// Run one cycle. Never fails: errors are logged and reported as
    /// [`CycleOutcome::Failed`], and the next cycle republishes even
    /// unchanged data.
    pub async fn run_cycle(&mut self) -> CycleOutcome {
        let timer = metrics::CYCLE_DURATION.start_timer();

        let outcome = match self.execute().await {
            Ok(CycleOutcome::Unchanged) => {
                info!("No changes in data detected since last fetch. Skipping upload.");
                if let Err(e) = self.publish_last_updated().await {
                    error!("An error occurred while uploading last updated timestamp: {}", e);
                }
                CycleOutcome::Unchanged
            }
            Ok(outcome) => {
                self.last_run_succeeded = true;
                outcome
            }
            Err(e) => {
                error!("An error occurred during execution: {}", e);
                self.last_run_succeeded = false;
                CycleOutcome::Failed {
                    error: e.to_string(),
                }
            }
        };

        timer.observe_duration();
        metrics::CYCLES_TOTAL
            .with_label_values(&[outcome.label()])
            .inc();
        outcome
    }

    async fn execute(&mut self) -> Result<CycleOutcome, PipelineError> {
        let raw = self.fetch_raw().await?;

        if self.detector.observe(&raw, self.last_run_succeeded) == Change::Unchanged {
            return Ok(CycleOutcome::Unchanged);
        }

        let locations = self
            .source
            .fetch_question_choices_by_text(&self.settings.location_question)
            .await?;
        let reports = derive_reports(
            &raw,
            &locations,
            &self.settings.layout,
            self.settings.time_zone,
        )?;

        let files = &self.settings.files;
        let publisher = &self.publisher;
        let mut published = 0;

        publisher.publish_table(&raw, &files.raw, None, true).await?;
        published += 1;

        publisher
            .publish_table(&reports.roster, &files.roster, None, true)
            .await?;
        published += 1;

        for view in &reports.locations {
            publisher
                .publish_table(
                    &view.table,
                    &view.location,
                    Some(files.locations_subdir.as_str()),
                    false,
                )
                .await?;
            published += 1;
        }

        publisher
            .publish_table(&reports.summary, &files.summary, None, false)
            .await?;
        published += 1;

        self.publish_last_updated().await?;
        publisher
            .publish_text(
                DOCKER_IMAGE_FILE,
                &docker_image_text(&self.settings.docker_image),
                None,
            )
            .await?;
        published += 2;

        info!("Published {} files.", published);
        Ok(CycleOutcome::Published { files: published })
    }

    async fn publish_last_updated(&self) -> Result<(), PipelineError> {
        let now = Utc::now().with_timezone(&self.settings.time_zone);
        self.publisher
            .publish_text(LAST_UPDATED_FILE, &last_updated_text(&now), None)
            .await?;
        Ok(())
    }
}
