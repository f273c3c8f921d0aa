//! Configuration types for bitbucket-gate
//!
//! This module defines the configuration structure that can be loaded from
//! TOML files and/or environment variables.

use serde::Deserialize;

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Bitbucket provider settings
    pub provider: ProviderSettings,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Bitbucket provider configuration
///
/// Endpoint overrides are optional; anything left unset falls back to the
/// public Bitbucket Cloud endpoints when the provider is built.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    /// OAuth2 authorize endpoint override
    pub login_url: Option<String>,

    /// OAuth2 token-exchange endpoint override
    pub redeem_url: Option<String>,

    /// Email validation endpoint override (also selects the API host)
    pub validate_url: Option<String>,

    /// Requested OAuth2 scope (space separated, default "email")
    pub scope: Option<String>,

    /// Team the caller must be a member of
    pub team: Option<String>,

    /// Repository (`namespace/name`) the caller must be able to contribute to
    pub repository: Option<String>,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Whether to verify SSL certificates
    pub verify_ssl: bool,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            login_url: None,
            redeem_url: None,
            validate_url: None,
            scope: None,
            team: None,
            repository: None,
            timeout_secs: 30,
            verify_ssl: true,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Output format (pretty, json)
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable output
    #[default]
    Pretty,
    /// JSON structured output
    Json,
}
