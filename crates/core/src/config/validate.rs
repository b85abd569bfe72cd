use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Locker API key is present
/// - Retry and poll settings are non-zero
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.locker.api_key.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "locker.api_key must be set".to_string(),
        ));
    }

    if config.search.retries == 0 {
        return Err(ConfigError::ValidationError(
            "search.retries cannot be 0".to_string(),
        ));
    }

    if config.transfer.poll_interval_ms == 0 {
        return Err(ConfigError::ValidationError(
            "transfer.poll_interval_ms cannot be 0".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LockerConfig;

    fn config_with_key() -> Config {
        Config {
            locker: LockerConfig {
                api_key: "k".to_string(),
                ..LockerConfig::default()
            },
            ..Config::default()
        }
    }

    #[test]
    fn test_validate_valid_config() {
        assert!(validate_config(&config_with_key()).is_ok());
    }

    #[test]
    fn test_validate_missing_api_key_fails() {
        let result = validate_config(&Config::default());
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_validate_zero_retries_fails() {
        let mut config = config_with_key();
        config.search.retries = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_zero_poll_interval_fails() {
        let mut config = config_with_key();
        config.transfer.poll_interval_ms = 0;
        assert!(validate_config(&config).is_err());
    }
}
