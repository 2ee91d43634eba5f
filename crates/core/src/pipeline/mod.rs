//! Report pipeline and its scheduler.
//!
//! A cycle runs strictly in sequence:
//! - **Fetch**: questions, items and orders from pretix, flattened
//! - **Compare**: against the last accepted snapshot, stop if unchanged
//! - **Derive**: roster, location views and summary
//! - **Publish**: every report, then the status files

mod cycle;
mod runner;
mod types;

pub use cycle::{PipelineSettings, ReportPipeline};
pub use runner::CycleRunner;
pub use types::{CycleOutcome, PipelineError, RunnerSchedule, RunnerStatus};
