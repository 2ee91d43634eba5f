use chrono_tz::Tz;

use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Event slug is set
/// - Status port is not 0
/// - Time zone is a known IANA zone
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.pretix.event_slug.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "pretix.event_slug (PRETIX_EVENT_SLUG) is required".to_string(),
        ));
    }

    if config.status.port == 0 {
        return Err(ConfigError::ValidationError(
            "status.port cannot be 0".to_string(),
        ));
    }

    time_zone(config)?;

    Ok(())
}

/// The configured report time zone.
pub fn time_zone(config: &Config) -> Result<Tz, ConfigError> {
    config
        .report
        .time_zone
        .parse::<Tz>()
        .map_err(|_| ConfigError::InvalidValue {
            key: "report.time_zone".to_string(),
            value: config.report.time_zone.clone(),
            reason: "unknown time zone".to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> Config {
        let mut config = Config::default();
        config.pretix.event_slug = "teencamp".to_string();
        config
    }

    #[test]
    fn test_validate_valid_config() {
        assert!(validate_config(&valid()).is_ok());
        assert_eq!(time_zone(&valid()).unwrap(), chrono_tz::Europe::Berlin);
    }

    #[test]
    fn test_validate_missing_event_slug() {
        let result = validate_config(&Config::default());
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_validate_port_zero_fails() {
        let mut config = valid();
        config.status.port = 0;
        let result = validate_config(&config);
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_validate_unknown_time_zone() {
        let mut config = valid();
        config.report.time_zone = "Mars/Olympus".to_string();
        let result = validate_config(&config);
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }
}
