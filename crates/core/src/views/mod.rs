//! Reports derived from the raw table.
//!
//! All views come from one raw table in a fixed order: the roster first,
//! then the per-location views and the summary, both built from the roster.

mod layout;
mod locations;
mod roster;
mod summary;

pub use layout::{PhoneMerge, ReportLayout, SummaryLayout};
pub use locations::{derive_locations, LocationView};
pub use roster::{derive_roster, format_timestamp, TIMESTAMP_FORMAT};
pub use summary::derive_summary;

use chrono_tz::Tz;
use thiserror::Error;
use tracing::info;

use crate::table::Table;

#[derive(Debug, Error)]
pub enum ViewError {
    #[error("Invalid timestamp: '{0}'")]
    InvalidTimestamp(String),
}

/// Every view published for one cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportSet {
    pub roster: Table,
    pub locations: Vec<LocationView>,
    pub summary: Table,
}

/// Derive the roster, the location views and the summary.
pub fn derive_reports(
    raw: &Table,
    locations: &[String],
    layout: &ReportLayout,
    tz: Tz,
) -> Result<ReportSet, ViewError> {
    let roster = derive_roster(raw, layout, tz)?;
    info!("Sorted raw data ({} of {} rows kept).", roster.len(), raw.len());

    let location_views = derive_locations(&roster, locations, layout);
    info!("Split roster into {} location views.", location_views.len());

    let summary = derive_summary(&roster, locations, layout);

    Ok(ReportSet {
        roster,
        locations: location_views,
        summary,
    })
}
