use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use std::path::Path;

use super::env::{apply_env_overrides, normalize, EnvSource, ProcessEnv};
use super::{types::Config, ConfigError};

/// Load configuration: defaults, then the optional TOML file, then
/// `P2N_`-prefixed variables (`P2N_PRETIX__EVENT_SLUG`), then the plain
/// deployment variables (`PRETIX_EVENT_SLUG`).
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    load_config_with_env(path, &ProcessEnv)
}

/// Same as [`load_config`] with the plain variables read from `env`.
pub fn load_config_with_env(
    path: Option<&Path>,
    env: &impl EnvSource,
) -> Result<Config, ConfigError> {
    let mut figment = Figment::from(Serialized::defaults(Config::default()));

    if let Some(path) = path {
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }
        figment = figment.merge(Toml::file(path));
    }

    let mut config: Config = figment
        .merge(Env::prefixed("P2N_").split("__"))
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))?;

    apply_env_overrides(&mut config, env)?;
    normalize(&mut config);

    Ok(config)
}

/// Load configuration from TOML string (useful for testing)
pub fn load_config_from_str(toml_str: &str) -> Result<Config, ConfigError> {
    let mut config: Config =
        toml::from_str(toml_str).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    normalize(&mut config);
    Ok(config)
}
