//! Configuration validation
//!
//! Ensures configuration values are within valid ranges before a connection
//! is built from them.

use crate::{ConfigError, ConfigResult, WsFanoutConfig};

/// Validation errors that can occur during config validation
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValidationError {
    MissingRequired { field: String },
    InvalidValue { field: String, reason: String },
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingRequired { field } => {
                write!(f, "Missing required configuration: {}", field)
            }
            Self::InvalidValue { field, reason } => {
                write!(f, "Invalid configuration value for {}: {}", field, reason)
            }
        }
    }
}

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];
const LOG_FORMATS: &[&str] = &["text", "json"];

/// Whether `code` may be written in a close frame (RFC 6455 section 7.4)
pub fn is_sendable_close_status(code: u16) -> bool {
    matches!(code, 1000..=1003 | 1007..=1011 | 3000..=4999)
}

/// Validate the complete configuration
///
/// All problems are collected and reported together.
///
/// # Errors
///
/// Returns `ConfigError::ValidationError` with details if validation fails
pub fn validate_config(config: &WsFanoutConfig) -> ConfigResult<()> {
    let mut errors = Vec::new();

    validate_required_fields(config, &mut errors);
    validate_value_ranges(config, &mut errors);

    if !errors.is_empty() {
        let error_messages = errors
            .iter()
            .map(|e| format!("  - {}", e))
            .collect::<Vec<_>>()
            .join("\n");

        return Err(ConfigError::ValidationError(format!(
            "Configuration validation failed:\n{}",
            error_messages
        )));
    }

    Ok(())
}

fn validate_required_fields(config: &WsFanoutConfig, errors: &mut Vec<ConfigValidationError>) {
    if config.transport.address.is_empty() {
        errors.push(ConfigValidationError::MissingRequired {
            field: "transport.address".to_string(),
        });
    }
}

fn validate_value_ranges(config: &WsFanoutConfig, errors: &mut Vec<ConfigValidationError>) {
    if config.connection.max_message_size == 0 {
        errors.push(ConfigValidationError::InvalidValue {
            field: "connection.max_message_size".to_string(),
            reason: "must be greater than 0".to_string(),
        });
    }

    if !is_sendable_close_status(config.connection.close_status) {
        errors.push(ConfigValidationError::InvalidValue {
            field: "connection.close_status".to_string(),
            reason: format!(
                "{} cannot be sent in a close frame",
                config.connection.close_status
            ),
        });
    }

    if config.transport.read_buffer_size == 0 {
        errors.push(ConfigValidationError::InvalidValue {
            field: "transport.read_buffer_size".to_string(),
            reason: "must be greater than 0".to_string(),
        });
    }

    if !LOG_LEVELS.contains(&config.system.log_level.to_lowercase().as_str()) {
        errors.push(ConfigValidationError::InvalidValue {
            field: "system.log_level".to_string(),
            reason: format!("must be one of {}", LOG_LEVELS.join(", ")),
        });
    }

    if !LOG_FORMATS.contains(&config.system.log_format.to_lowercase().as_str()) {
        errors.push(ConfigValidationError::InvalidValue {
            field: "system.log_format".to_string(),
            reason: "must be 'text' or 'json'".to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&WsFanoutConfig::default()).is_ok());
    }

    #[test]
    fn test_zero_sizes_rejected() {
        let mut config = WsFanoutConfig::default();
        config.connection.max_message_size = 0;
        config.transport.read_buffer_size = 0;

        let err = validate_config(&config).unwrap_err().to_string();
        assert!(err.contains("connection.max_message_size"));
        assert!(err.contains("transport.read_buffer_size"));
    }

    #[test]
    fn test_reserved_close_status_rejected() {
        let mut config = WsFanoutConfig::default();
        config.connection.close_status = 1005;
        assert!(validate_config(&config).is_err());

        config.connection.close_status = 4000;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_missing_address_rejected() {
        let mut config = WsFanoutConfig::default();
        config.transport.address.clear();

        let err = validate_config(&config).unwrap_err().to_string();
        assert!(err.contains("transport.address"));
    }

    #[test]
    fn test_unknown_log_level_rejected() {
        let mut config = WsFanoutConfig::default();
        config.system.log_level = "WARNING".to_string();
        assert!(validate_config(&config).is_err());

        config.system.log_level = "WARN".to_string();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_sendable_close_statuses() {
        assert!(is_sendable_close_status(1000));
        assert!(is_sendable_close_status(1007));
        assert!(!is_sendable_close_status(1005));
        assert!(!is_sendable_close_status(1006));
        assert!(!is_sendable_close_status(1015));
        assert!(!is_sendable_close_status(5000));
    }
}
