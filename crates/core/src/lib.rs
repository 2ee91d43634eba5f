pub mod config;
pub mod flatten;
pub mod http;
pub mod metrics;
pub mod pipeline;
pub mod pretix;
pub mod publisher;
pub mod snapshot;
pub mod table;
pub mod testing;
pub mod views;

pub use config::{
    load_config, load_config_from_str, resolve_credentials, validate_config, Config, ConfigError,
    Credentials,
};
pub use flatten::{flatten, item_index, question_index};
pub use http::RetryPolicy;
pub use pipeline::{
    CycleOutcome, CycleRunner, PipelineError, PipelineSettings, ReportPipeline, RunnerSchedule,
    RunnerStatus,
};
pub use pretix::{PretixClient, PretixConfig, PretixSource, SourceError};
pub use publisher::{
    ExcelWriter, NextcloudClient, NextcloudConfig, NextcloudCredentials, NextcloudPublisher,
    PublishError, Publisher,
};
pub use snapshot::{Change, ChangeDetector};
pub use table::{Cell, RowIndex, Table};
pub use views::{derive_reports, ReportLayout, ReportSet, ViewError};
