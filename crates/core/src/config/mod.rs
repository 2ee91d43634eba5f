mod env;
mod loader;
mod secrets;
mod types;
mod validate;

pub use env::{apply_env_overrides, decode_if_base64, normalize, EnvSource, ProcessEnv};
pub use loader::{load_config, load_config_from_str, load_config_with_env};
pub use secrets::{read_secret, resolve_credentials, Credentials, DEFAULT_SECRETS_DIR};
pub use types::*;
pub use validate::{time_zone, validate_config};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Missing required setting: {0}")]
    Missing(String),

    #[error("Invalid value '{value}' for {key}: {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),

    #[error("Secret error: {0}")]
    Secret(String),
}
