//! Credentials from config values or docker secrets.

use std::path::Path;

use tracing::debug;

use crate::publisher::NextcloudCredentials;

use super::env::decode_if_base64;
use super::{Config, ConfigError};

/// Directory docker mounts secrets into.
pub const DEFAULT_SECRETS_DIR: &str = "/run/secrets";

/// Everything needed to talk to both remotes.
#[derive(Clone)]
pub struct Credentials {
    pub pretix_token: String,
    pub nextcloud: NextcloudCredentials,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("pretix_token", &"<redacted>")
            .field("nextcloud", &self.nextcloud)
            .finish()
    }
}

/// Resolve the pretix token and the Nextcloud login.
///
/// A direct value wins; otherwise the docker secret named by the matching
/// `*_secret_name` is read from `secrets_dir`.
pub fn resolve_credentials(config: &Config, secrets_dir: &Path) -> Result<Credentials, ConfigError> {
    let pretix_token = resolve(
        config.pretix.api_token.as_deref(),
        config.pretix.api_token_secret_name.as_deref(),
        secrets_dir,
        "PRETIX_API_TOKEN",
    )?;
    let username = resolve(
        config.nextcloud.username.as_deref(),
        config.nextcloud.username_secret_name.as_deref(),
        secrets_dir,
        "NEXTCLOUD_USERNAME",
    )?;
    let password = resolve(
        config.nextcloud.password.as_deref(),
        config.nextcloud.password_secret_name.as_deref(),
        secrets_dir,
        "NEXTCLOUD_PASSWORD",
    )?;

    Ok(Credentials {
        pretix_token,
        nextcloud: NextcloudCredentials { username, password },
    })
}

fn resolve(
    direct: Option<&str>,
    secret_name: Option<&str>,
    secrets_dir: &Path,
    key: &str,
) -> Result<String, ConfigError> {
    if let Some(value) = direct.filter(|v| !v.trim().is_empty()) {
        return Ok(value.to_string());
    }

    debug!("'{}' is not set. Trying docker secret.", key);
    match secret_name.map(str::trim).filter(|n| !n.is_empty()) {
        Some(name) => read_secret(secrets_dir, name),
        None => Err(ConfigError::Missing(format!(
            "'{}' (or alternatively '{}_SECRET_NAME' for docker secrets) is not set",
            key, key
        ))),
    }
}

/// Read a docker secret. Trailing newlines are stripped and `BASE64:`
/// values decoded. An empty secret is an error.
pub fn read_secret(secrets_dir: &Path, name: &str) -> Result<String, ConfigError> {
    let path = secrets_dir.join(name);
    let content = std::fs::read_to_string(&path).map_err(|e| {
        ConfigError::Secret(format!("Error reading secret from {}: {}", path.display(), e))
    })?;

    let secret = decode_if_base64(content.trim_matches('\n'));
    if secret.is_empty() {
        return Err(ConfigError::Secret(format!("Secret '{}' is empty", name)));
    }
    Ok(secret)
}
