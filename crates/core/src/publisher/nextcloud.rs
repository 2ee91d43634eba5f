//! Nextcloud WebDAV client.

use reqwest::{Client, Method, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::http::{self, send_with_retry, RetryPolicy};

use super::PublishError;

/// Nextcloud connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NextcloudConfig {
    /// Base URL of the Nextcloud instance.
    #[serde(default = "default_url")]
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Name of a docker secret holding the username.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username_secret_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// Name of a docker secret holding the password.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_secret_name: Option<String>,
    /// Directory below the user's files that receives every upload.
    #[serde(default = "default_upload_dir")]
    pub upload_dir: String,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_url() -> String {
    "https://jcloud.swdec.de".to_string()
}

fn default_upload_dir() -> String {
    "Anmeldungen_Teencamp".to_string()
}

fn default_timeout() -> u64 {
    60
}

impl Default for NextcloudConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            username: None,
            username_secret_name: None,
            password: None,
            password_secret_name: None,
            upload_dir: default_upload_dir(),
            timeout_secs: default_timeout(),
        }
    }
}

/// Resolved login for WebDAV.
#[derive(Clone)]
pub struct NextcloudCredentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for NextcloudCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NextcloudCredentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// WebDAV client rooted at the configured upload directory.
pub struct NextcloudClient {
    client: Client,
    base_url: String,
    upload_dir: String,
    credentials: NextcloudCredentials,
    retry: RetryPolicy,
    mkcol: Method,
}

impl NextcloudClient {
    pub fn new(
        config: &NextcloudConfig,
        credentials: NextcloudCredentials,
        retry: RetryPolicy,
    ) -> Result<Self, PublishError> {
        let client = http::build_client(config.timeout_secs)?;
        let mkcol = Method::from_bytes(b"MKCOL")
            .map_err(|e| PublishError::InvalidRequest(e.to_string()))?;

        let base_url = format!(
            "{}/remote.php/dav/files/{}",
            config.url.trim_end_matches('/'),
            urlencoding::encode(&credentials.username)
        );

        Ok(Self {
            client,
            base_url,
            upload_dir: config.upload_dir.trim_matches('/').to_string(),
            credentials,
            retry,
            mkcol,
        })
    }

    /// WebDAV root of the user's files.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full URL of a path relative to the user's files. Every segment is
    /// percent-encoded.
    pub fn url_for(&self, path: &str) -> String {
        let encoded: Vec<String> = segments(path)
            .map(|s| urlencoding::encode(s).into_owned())
            .collect();
        if encoded.is_empty() {
            self.base_url.clone()
        } else {
            format!("{}/{}", self.base_url, encoded.join("/"))
        }
    }

    /// Path of `subdir` below the upload directory.
    fn target_dir(&self, subdir: &str) -> Result<String, PublishError> {
        let path = join_path([self.upload_dir.as_str(), subdir]);
        if segments(&path).any(|s| s == "..") {
            return Err(PublishError::UnsafePath(path));
        }
        Ok(path)
    }

    /// Create `subdir` below the upload directory, parents included.
    pub async fn create_dir(&self, subdir: &str) -> Result<(), PublishError> {
        let dir = self.target_dir(subdir)?;
        if dir.is_empty() {
            return Ok(());
        }

        let status = self.mkcol(&dir).await?;
        match status {
            StatusCode::METHOD_NOT_ALLOWED => {
                debug!("Nextcloud directory already exists ({})", dir);
                Ok(())
            }
            StatusCode::CREATED => {
                info!("Created Nextcloud directory ({})", dir);
                Ok(())
            }
            StatusCode::CONFLICT => {
                debug!(
                    "Parent of Nextcloud directory {} does not exist, creating parents",
                    dir
                );
                for parent in parent_directories(&dir) {
                    let status = self.mkcol(&parent).await?;
                    if status != StatusCode::CREATED && status != StatusCode::METHOD_NOT_ALLOWED {
                        return Err(self.status_error(status, &parent));
                    }
                }
                info!("Created Nextcloud directory ({})", dir);
                Ok(())
            }
            other => Err(self.status_error(other, &dir)),
        }
    }

    /// Upload `data` as `file_name` into `subdir` below the upload directory.
    ///
    /// Directory parts of `file_name` are moved into the subdirectory.
    pub async fn upload(
        &self,
        file_name: &str,
        data: Vec<u8>,
        subdir: &str,
    ) -> Result<(), PublishError> {
        let (file_dir, base_name) = match file_name.rsplit_once('/') {
            Some((dir, name)) => (dir, name),
            None => ("", file_name),
        };
        let subdir = join_path([subdir, file_dir]);
        let dir = self.target_dir(&subdir)?;

        self.create_dir(&subdir).await?;

        let path = join_path([dir.as_str(), base_name]);
        let url = self.url_for(&path);
        debug!("WebDAV PUT {}", url);

        let response = send_with_retry(&self.retry, "nextcloud", || {
            self.client
                .put(&url)
                .basic_auth(&self.credentials.username, Some(&self.credentials.password))
                .body(data.clone())
        })
        .await?;

        let status = response.status();
        if matches!(status.as_u16(), 200 | 201 | 204) {
            info!(
                "File '{}' uploaded successfully.",
                join_path([subdir.as_str(), base_name])
            );
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(PublishError::Status {
                status: status.as_u16(),
                url,
                message: body.chars().take(200).collect(),
            })
        }
    }

    async fn mkcol(&self, path: &str) -> Result<StatusCode, PublishError> {
        let url = self.url_for(path);
        debug!("WebDAV MKCOL {}", url);

        let response = send_with_retry(&self.retry, "nextcloud", || {
            self.client
                .request(self.mkcol.clone(), &url)
                .basic_auth(&self.credentials.username, Some(&self.credentials.password))
        })
        .await?;

        Ok(response.status())
    }

    fn status_error(&self, status: StatusCode, path: &str) -> PublishError {
        PublishError::Status {
            status: status.as_u16(),
            url: self.url_for(path),
            message: "failed to create directory".to_string(),
        }
    }
}

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

/// Join path parts with `/`, dropping empty segments.
pub fn join_path<'a, I>(parts: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    parts
        .into_iter()
        .flat_map(segments)
        .collect::<Vec<_>>()
        .join("/")
}

/// Every ancestor of `path` including itself, top-down: `A/B/C` gives
/// `A`, `A/B`, `A/B/C`.
pub fn parent_directories(path: &str) -> Vec<String> {
    let parts: Vec<&str> = segments(path).collect();
    (1..=parts.len()).map(|n| parts[..n].join("/")).collect()
}
