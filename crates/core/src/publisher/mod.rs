//! Report publishing: spreadsheets and status files on Nextcloud.

mod excel;
mod nextcloud;
mod sanitize;

pub use excel::{build_workbook, column_widths, index_width, table_headers, ExcelWriter};
pub use nextcloud::{
    join_path, parent_directories, NextcloudClient, NextcloudConfig, NextcloudCredentials,
};
pub use sanitize::{file_name_with_extension, sanitize_file_name, sheet_name};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone};
use thiserror::Error;

use crate::metrics;
use crate::table::Table;

/// Name of the "last updated" status file.
pub const LAST_UPDATED_FILE: &str = "Last_Updated";

/// Name of the image version status file.
pub const DOCKER_IMAGE_FILE: &str = "Docker_Image_Version";

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("Spreadsheet error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Nextcloud returned {status} for {url}: {message}")]
    Status {
        status: u16,
        url: String,
        message: String,
    },

    #[error("Refusing path outside the upload directory: {0}")]
    UnsafePath(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

/// Destination for rendered reports.
#[async_trait]
pub trait Publisher: Send + Sync {
    /// Publish `table` as a spreadsheet named `name` (extension added when
    /// missing), optionally below `subdir`, optionally with filter buttons.
    async fn publish_table(
        &self,
        table: &Table,
        name: &str,
        subdir: Option<&str>,
        add_filters: bool,
    ) -> Result<(), PublishError>;

    /// Publish a small UTF-8 text file.
    async fn publish_text(
        &self,
        name: &str,
        content: &str,
        subdir: Option<&str>,
    ) -> Result<(), PublishError>;
}

/// Content of the "last updated" status file.
pub fn last_updated_text<Tz: TimeZone>(now: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!("Last updated:\n{}", now.format("%d.%m.%Y %H:%M"))
}

/// Content of the image version status file.
pub fn docker_image_text(image: &str) -> String {
    format!("Docker Image Base Version:\n{}", image)
}

/// Renders spreadsheets locally and uploads them over WebDAV.
pub struct NextcloudPublisher {
    client: NextcloudClient,
    excel: ExcelWriter,
}

impl NextcloudPublisher {
    pub fn new(client: NextcloudClient, excel: ExcelWriter) -> Self {
        Self { client, excel }
    }
}

#[async_trait]
impl Publisher for NextcloudPublisher {
    async fn publish_table(
        &self,
        table: &Table,
        name: &str,
        subdir: Option<&str>,
        add_filters: bool,
    ) -> Result<(), PublishError> {
        let file_name = file_name_with_extension(name, "xlsx");
        let path = self.excel.write(table, &file_name, add_filters)?;

        let result = match tokio::fs::read(&path).await {
            Ok(data) => {
                self.client
                    .upload(&file_name, data, subdir.unwrap_or_default())
                    .await
            }
            Err(e) => Err(e.into()),
        };
        self.excel.remove(&path);

        result?;
        metrics::FILES_PUBLISHED.with_label_values(&["xlsx"]).inc();
        Ok(())
    }

    async fn publish_text(
        &self,
        name: &str,
        content: &str,
        subdir: Option<&str>,
    ) -> Result<(), PublishError> {
        let file_name = file_name_with_extension(name, "txt");
        self.client
            .upload(
                &file_name,
                content.as_bytes().to_vec(),
                subdir.unwrap_or_default(),
            )
            .await?;

        metrics::FILES_PUBLISHED.with_label_values(&["txt"]).inc();
        Ok(())
    }
}
