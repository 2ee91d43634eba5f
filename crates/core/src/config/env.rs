//! Plain environment variable names, as used by container deployments.

use std::collections::HashMap;

use base64::Engine as _;
use tracing::{error, warn};

use super::{Config, ConfigError, LogLevel};

/// Prefix marking a base64-encoded value.
pub const BASE64_PREFIX: &str = "BASE64:";

/// Where variables are read from.
pub trait EnvSource {
    fn var(&self, name: &str) -> Option<String>;
}

/// The process environment.
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

impl EnvSource for HashMap<String, String> {
    fn var(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

/// Decode `value` if it carries the `BASE64:` prefix. A value that fails to
/// decode is logged and becomes empty.
pub fn decode_if_base64(value: &str) -> String {
    let Some(encoded) = value.trim().strip_prefix(BASE64_PREFIX) else {
        return value.to_string();
    };

    let decoded = base64::engine::general_purpose::STANDARD
        .decode(encoded.trim())
        .map_err(|e| e.to_string())
        .and_then(|bytes| String::from_utf8(bytes).map_err(|e| e.to_string()));

    match decoded {
        Ok(text) => text.trim_matches('\n').to_string(),
        Err(e) => {
            error!("Error decoding base64: {}", e);
            String::new()
        }
    }
}

/// Read a variable: blank means unset, base64 values are decoded.
fn read(env: &impl EnvSource, name: &str, trim: bool) -> Option<String> {
    let raw = env.var(name)?;
    if raw.trim().is_empty() {
        return None;
    }
    let value = if trim { raw.trim() } else { raw.as_str() };
    Some(decode_if_base64(value))
}

fn read_into(env: &impl EnvSource, name: &str, target: &mut String) {
    if let Some(value) = read(env, name, true) {
        *target = value;
    }
}

fn read_optional(env: &impl EnvSource, name: &str, target: &mut Option<String>) {
    if let Some(value) = read(env, name, true) {
        *target = Some(value);
    }
}

/// Integers below `min` or not parsing at all keep the current value.
fn read_int<T>(env: &impl EnvSource, name: &str, min: T, target: &mut T)
where
    T: std::str::FromStr + PartialOrd + std::fmt::Display + Copy,
{
    let Some(value) = read(env, name, true) else {
        return;
    };

    match value.parse::<T>() {
        Ok(n) if n >= min => *target = n,
        Ok(_) => error!(
            "Environment variable '{}' must be at least {}. Using '{}'.",
            name, min, target
        ),
        Err(_) => error!(
            "Environment variable '{}' must be an integer. Using '{}'.",
            name, target
        ),
    }
}

/// Apply the plain environment variables on top of `config`.
pub fn apply_env_overrides(config: &mut Config, env: &impl EnvSource) -> Result<(), ConfigError> {
    let pretix = &mut config.pretix;
    read_into(env, "PRETIX_URL", &mut pretix.url);
    read_into(env, "PRETIX_ORGANIZER_SLUG", &mut pretix.organizer_slug);
    read_into(env, "PRETIX_EVENT_SLUG", &mut pretix.event_slug);
    read_optional(env, "PRETIX_API_TOKEN", &mut pretix.api_token);
    read_optional(
        env,
        "PRETIX_API_TOKEN_SECRET_NAME",
        &mut pretix.api_token_secret_name,
    );

    let nextcloud = &mut config.nextcloud;
    read_into(env, "NEXTCLOUD_URL", &mut nextcloud.url);
    read_optional(env, "NEXTCLOUD_USERNAME", &mut nextcloud.username);
    read_optional(
        env,
        "NEXTCLOUD_USERNAME_SECRET_NAME",
        &mut nextcloud.username_secret_name,
    );
    if let Some(password) = read(env, "NEXTCLOUD_PASSWORD", false) {
        nextcloud.password = Some(password);
    }
    read_optional(
        env,
        "NEXTCLOUD_PASSWORD_SECRET_NAME",
        &mut nextcloud.password_secret_name,
    );
    read_into(env, "NEXTCLOUD_UPLOAD_DIR", &mut nextcloud.upload_dir);

    read_int(
        env,
        "EXCEL_MAX_COLUMN_WIDTH",
        5,
        &mut config.excel.max_column_width,
    );
    read_into(env, "TEMP_DIR_NAME", &mut config.excel.temp_dir_name);

    read_int(
        env,
        "INTERVAL_MINUTES",
        1,
        &mut config.schedule.interval_minutes,
    );
    read_int(
        env,
        "CHECK_INTERVAL_SECONDS",
        1,
        &mut config.schedule.check_interval_seconds,
    );
    if let Some(value) = read(env, "RUN_ONCE", true) {
        config.schedule.run_once = match value.to_lowercase().as_str() {
            "true" => true,
            "false" => false,
            _ => {
                return Err(ConfigError::InvalidValue {
                    key: "RUN_ONCE".to_string(),
                    value,
                    reason: "must be either 'true' or 'false'".to_string(),
                })
            }
        };
    }

    if let Some(value) = read(env, "LOGGING_LEVEL", true) {
        config.logging.level =
            value
                .parse::<LogLevel>()
                .map_err(|reason| ConfigError::InvalidValue {
                    key: "LOGGING_LEVEL".to_string(),
                    value: value.clone(),
                    reason,
                })?;
    }

    read_into(env, "TZ", &mut config.report.time_zone);
    read_into(env, "DOCKER_IMAGE", &mut config.report.docker_image);
    read_into(env, "LOCATION_QUESTION", &mut config.report.location_question);

    Ok(())
}

/// Normalize URLs and the upload directory after all sources are merged.
pub fn normalize(config: &mut Config) {
    config.pretix.url = normalize_url("pretix.url", &config.pretix.url);
    config.nextcloud.url = normalize_url("nextcloud.url", &config.nextcloud.url);
    config.nextcloud.upload_dir = config.nextcloud.upload_dir.trim_matches('/').to_string();
}

fn normalize_url(key: &str, url: &str) -> String {
    let url = url.trim().trim_end_matches('/');
    if url.starts_with("http://") {
        warn!(
            "{} starts with 'http://'. Use https, credentials are sent with every request.",
            key
        );
        url.to_string()
    } else if url.starts_with("https://") {
        url.to_string()
    } else {
        format!("https://{}", url)
    }
}
