// SPDX-FileCopyrightText: 2026 Frontdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation of configuration values.

use thiserror::Error;

use crate::model::FrontdeskConfig;

/// A configuration value that deserialized cleanly but is semantically invalid.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for `{key}`: {detail}")]
    InvalidValue { key: &'static str, detail: String },

    #[error("failed to load configuration: {0}")]
    Load(String),
}

const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Print validation errors to stderr, one per line.
pub fn render_errors(errors: &[ConfigError]) {
    for error in errors {
        eprintln!("frontdesk: configuration error: {error}");
    }
}

/// Validates constraints that serde cannot express.
pub fn validate_config(config: &FrontdeskConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if !VALID_LOG_LEVELS.contains(&config.service.log_level.as_str()) {
        errors.push(ConfigError::InvalidValue {
            key: "service.log_level",
            detail: format!(
                "`{}` is not one of {}",
                config.service.log_level,
                VALID_LOG_LEVELS.join(", ")
            ),
        });
    }

    if config.gateway.models.is_empty() {
        errors.push(ConfigError::InvalidValue {
            key: "gateway.models",
            detail: "fallback list must name at least one model".into(),
        });
    }

    if config.gateway.attempt_timeout_secs == 0 {
        errors.push(ConfigError::InvalidValue {
            key: "gateway.attempt_timeout_secs",
            detail: "per-attempt timeout must be non-zero".into(),
        });
    }

    if config.poller.dedup_capacity == 0 {
        errors.push(ConfigError::InvalidValue {
            key: "poller.dedup_capacity",
            detail: "dedup set capacity must be non-zero".into(),
        });
    }

    if config.poller.poll_interval_secs == 0 {
        errors.push(ConfigError::InvalidValue {
            key: "poller.poll_interval_secs",
            detail: "poll interval must be non-zero".into(),
        });
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}
