// SPDX-FileCopyrightText: 2026 Frontdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Frontdesk service.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup.

use serde::{Deserialize, Serialize};

/// Top-level Frontdesk configuration.
///
/// Loaded from TOML files with environment variable overrides. All
/// sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FrontdeskConfig {
    /// Service identity and HTTP settings.
    #[serde(default)]
    pub service: ServiceConfig,

    /// Completion gateway settings.
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Operator-channel poller settings.
    #[serde(default)]
    pub poller: PollerConfig,
}

/// Service identity and HTTP configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceConfig {
    /// Display name of the service.
    #[serde(default = "default_service_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Address the chat API binds to.
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: default_service_name(),
            log_level: default_log_level(),
            bind_address: default_bind_address(),
        }
    }
}

fn default_service_name() -> String {
    "frontdesk".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_bind_address() -> String {
    "127.0.0.1:5000".to_string()
}

/// Completion gateway configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    /// API key for the completion backend. `None` requires an env override.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Base URL of the chat-completions API.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Ordered fallback list of model identifiers, tried in sequence.
    #[serde(default = "default_models")]
    pub models: Vec<String>,

    /// Per-attempt request timeout in seconds.
    #[serde(default = "default_attempt_timeout_secs")]
    pub attempt_timeout_secs: u64,

    /// Referer URL sent with each request, identifying the deployment.
    #[serde(default)]
    pub referer: Option<String>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            models: default_models(),
            attempt_timeout_secs: default_attempt_timeout_secs(),
            referer: None,
        }
    }
}

fn default_base_url() -> String {
    "https://openrouter.ai/api/v1".to_string()
}

fn default_models() -> Vec<String> {
    vec![
        "google/gemini-2.0-flash-001:free".to_string(),
        "stepfun/step-3.5-flash:free".to_string(),
        "arcee-ai/trinity-large-preview:free".to_string(),
        "google/gemma-3-4b-it:free".to_string(),
    ]
}

fn default_attempt_timeout_secs() -> u64 {
    15
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("frontdesk").join("frontdesk.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("frontdesk.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}

/// Operator-channel poller configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PollerConfig {
    /// Enable the pull path. The webhook push path works regardless.
    #[serde(default = "default_poller_enabled")]
    pub enabled: bool,

    /// Delay between poll cycles in seconds.
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    /// Elongated delay after an unhandled loop-level error, in seconds.
    #[serde(default = "default_error_backoff_secs")]
    pub error_backoff_secs: u64,

    /// Capacity of the recently-seen update-id dedup set.
    #[serde(default = "default_dedup_capacity")]
    pub dedup_capacity: usize,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            enabled: default_poller_enabled(),
            poll_interval_secs: default_poll_interval_secs(),
            error_backoff_secs: default_error_backoff_secs(),
            dedup_capacity: default_dedup_capacity(),
        }
    }
}

fn default_poller_enabled() -> bool {
    true
}

fn default_poll_interval_secs() -> u64 {
    2
}

fn default_error_backoff_secs() -> u64 {
    5
}

fn default_dedup_capacity() -> usize {
    1000
}
