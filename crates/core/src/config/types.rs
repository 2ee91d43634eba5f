use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

use crate::http::RetryPolicy;
use crate::pretix::PretixConfig;
use crate::publisher::NextcloudConfig;
use crate::views::ReportLayout;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub pretix: PretixConfig,
    #[serde(default)]
    pub nextcloud: NextcloudConfig,
    #[serde(default)]
    pub excel: ExcelConfig,
    #[serde(default)]
    pub schedule: ScheduleConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub report: ReportConfig,
    #[serde(default)]
    pub status: StatusConfig,
    /// Retry policy for both remotes.
    #[serde(default)]
    pub http: RetryPolicy,
}

/// Spreadsheet rendering
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExcelConfig {
    /// Upper bound for data column widths.
    #[serde(default = "default_max_column_width")]
    pub max_column_width: usize,
    /// Directory below the system temp dir for rendered files.
    #[serde(default = "default_temp_dir_name")]
    pub temp_dir_name: String,
}

impl Default for ExcelConfig {
    fn default() -> Self {
        Self {
            max_column_width: default_max_column_width(),
            temp_dir_name: default_temp_dir_name(),
        }
    }
}

fn default_max_column_width() -> usize {
    30
}

fn default_temp_dir_name() -> String {
    "p2n_teencamp".to_string()
}

/// Cycle timing
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScheduleConfig {
    #[serde(default = "default_interval_minutes")]
    pub interval_minutes: u64,
    /// How often the runner wakes up to check whether a cycle is due.
    #[serde(default = "default_check_interval_seconds")]
    pub check_interval_seconds: u64,
    /// Run a single cycle and exit.
    #[serde(default)]
    pub run_once: bool,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            interval_minutes: default_interval_minutes(),
            check_interval_seconds: default_check_interval_seconds(),
            run_once: false,
        }
    }
}

fn default_interval_minutes() -> u64 {
    15
}

fn default_check_interval_seconds() -> u64 {
    60
}

/// Logging
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub level: LogLevel,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    #[serde(alias = "warn")]
    Warning,
    Error,
}

impl LogLevel {
    /// Directive understood by `tracing_subscriber::EnvFilter`.
    pub fn as_filter(&self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warning => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warning" => Ok(LogLevel::Warning),
            "error" => Ok(LogLevel::Error),
            _ => Err("must be one of 'debug', 'info', 'warning' or 'error'".to_string()),
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LogLevel::Warning => "warning",
            other => other.as_filter(),
        };
        f.write_str(name)
    }
}

/// What gets published and how it is shaped
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ReportConfig {
    /// IANA zone for rendered timestamps.
    #[serde(default = "default_time_zone")]
    pub time_zone: String,
    /// Image reference written to the version status file.
    #[serde(default = "default_docker_image")]
    pub docker_image: String,
    /// Question whose answer options list the locations.
    #[serde(default = "default_location_question")]
    pub location_question: String,
    #[serde(default)]
    pub files: ReportFiles,
    #[serde(default)]
    pub layout: ReportLayout,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            time_zone: default_time_zone(),
            docker_image: default_docker_image(),
            location_question: default_location_question(),
            files: ReportFiles::default(),
            layout: ReportLayout::default(),
        }
    }
}

fn default_time_zone() -> String {
    "Europe/Berlin".to_string()
}

fn default_docker_image() -> String {
    "unknown".to_string()
}

fn default_location_question() -> String {
    "Ich melde mich über folgende Ortschaft an".to_string()
}

/// Names of the published files
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ReportFiles {
    #[serde(default = "default_raw_name")]
    pub raw: String,
    #[serde(default = "default_roster_name")]
    pub roster: String,
    #[serde(default = "default_summary_name")]
    pub summary: String,
    /// Subdirectory holding one file per location.
    #[serde(default = "default_locations_subdir")]
    pub locations_subdir: String,
}

impl Default for ReportFiles {
    fn default() -> Self {
        Self {
            raw: default_raw_name(),
            roster: default_roster_name(),
            summary: default_summary_name(),
            locations_subdir: default_locations_subdir(),
        }
    }
}

fn default_raw_name() -> String {
    "Raw_Data".to_string()
}

fn default_roster_name() -> String {
    "Alle".to_string()
}

fn default_summary_name() -> String {
    "Anmeldezahlen".to_string()
}

fn default_locations_subdir() -> String {
    "Nach_Orten".to_string()
}

/// Optional status HTTP endpoint
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StatusConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::from([0, 0, 0, 0])
}

fn default_port() -> u16 {
    8080
}
