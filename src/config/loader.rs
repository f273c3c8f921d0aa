//! Configuration loader with layered sources
//!
//! Loads configuration from multiple sources with the following precedence
//! (highest to lowest):
//! 1. Environment variables (BITBUCKET_GATE__*)
//! 2. Convenience variables (BITBUCKET_TEAM, BITBUCKET_REPOSITORY)
//! 3. Configuration file (TOML)
//! 4. Default values

use crate::config::types::{AppConfig, ProviderSettings};
use crate::error::ConfigError;
use crate::provider::ProviderOverrides;
use config::{Config, ConfigBuilder, Environment, File, FileFormat, builder::DefaultState};
use std::path::Path;

/// Default configuration file paths to check (in order)
const DEFAULT_CONFIG_PATHS: &[&str] = &[
    "bitbucket-gate.toml",
    ".bitbucket-gate.toml",
    "~/.config/bitbucket-gate/config.toml",
    "/etc/bitbucket-gate/config.toml",
];

/// Prefix for structured environment overrides
const ENV_PREFIX: &str = "BITBUCKET_GATE";

/// Load configuration from a TOML string (useful for testing)
pub fn load_config_from_str(toml_str: &str) -> Result<AppConfig, ConfigError> {
    let config = Config::builder()
        .add_source(File::from_str(toml_str, FileFormat::Toml))
        .build()
        .map_err(|e| ConfigError::Load(e.to_string()))?;

    let app_config: AppConfig = config
        .try_deserialize()
        .map_err(|e| ConfigError::Load(e.to_string()))?;

    validate_config(&app_config)?;

    Ok(app_config)
}

/// Load configuration from files and environment
pub fn load_config(config_path: Option<&str>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder();

    if let Some(path) = config_path {
        // Explicit path provided - must exist
        if !Path::new(path).exists() {
            return Err(ConfigError::Load(format!(
                "Configuration file not found: {}",
                path
            )));
        }
        builder = builder.add_source(File::new(path, FileFormat::Toml));
    } else {
        // First existing default path wins
        for path in DEFAULT_CONFIG_PATHS {
            let expanded = shellexpand::tilde(path);
            if Path::new(expanded.as_ref()).exists() {
                builder = builder.add_source(File::new(&expanded, FileFormat::Toml));
                break;
            }
        }
    }

    // e.g. BITBUCKET_GATE__PROVIDER__TEAM, BITBUCKET_GATE__LOGGING__FORMAT
    builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true),
    );

    builder = apply_convenience_env(builder, "BITBUCKET_TEAM", "provider.team", "TEAM")?;
    builder = apply_convenience_env(
        builder,
        "BITBUCKET_REPOSITORY",
        "provider.repository",
        "REPOSITORY",
    )?;

    let config = builder
        .build()
        .map_err(|e| ConfigError::Load(e.to_string()))?;

    let app_config: AppConfig = config
        .try_deserialize()
        .map_err(|e| ConfigError::Load(e.to_string()))?;

    validate_config(&app_config)?;

    Ok(app_config)
}

/// Apply a short-form variable unless the prefixed form is already set.
fn apply_convenience_env(
    builder: ConfigBuilder<DefaultState>,
    var: &str,
    key: &str,
    provider_field: &str,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let prefixed = format!("{ENV_PREFIX}__PROVIDER__{provider_field}");
    if std::env::var_os(&prefixed).is_some() {
        return Ok(builder);
    }

    match std::env::var(var) {
        Ok(value) => builder
            .set_override(key, value)
            .map_err(|e| ConfigError::Load(e.to_string())),
        Err(_) => Ok(builder),
    }
}

/// Validate configuration values
fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    validate_provider(&config.provider)
}

fn validate_provider(provider: &ProviderSettings) -> Result<(), ConfigError> {
    if provider.timeout_secs == 0 {
        return Err(ConfigError::Invalid {
            message: "provider.timeout_secs must be greater than 0".to_string(),
        });
    }

    // Same endpoint rules the provider applies when it is built
    ProviderOverrides::from_settings(provider).map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_config_from_str_basic() {
        let toml = r#"
[provider]
team = "acme"
repository = "acme/app"

[logging]
level = "debug"
format = "json"
"#;

        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.provider.team.as_deref(), Some("acme"));
        assert_eq!(config.provider.repository.as_deref(), Some("acme/app"));
        assert_eq!(config.logging.level, "debug");
        assert_eq!(
            config.logging.format,
            crate::config::types::LogFormat::Json
        );
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = load_config_from_str("").unwrap();
        assert!(config.provider.login_url.is_none());
        assert_eq!(config.provider.timeout_secs, 30);
    }

    #[test]
    fn test_invalid_url_error() {
        let toml = r#"
[provider]
validate_url = "api.bitbucket.org/2.0/user/emails"
"#;

        let result = load_config_from_str(toml);
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn test_empty_url_is_treated_as_unset() {
        let toml = r#"
[provider]
login_url = ""
"#;

        assert!(load_config_from_str(toml).is_ok());
    }

    #[test]
    fn test_blank_url_is_treated_as_unset() {
        let toml = r#"
[provider]
login_url = "   "
"#;

        let config = load_config_from_str(toml).unwrap();
        let overrides = ProviderOverrides::from_settings(&config.provider).unwrap();
        assert!(overrides.login_url.is_none());
    }

    #[test]
    fn test_uppercase_scheme_accepted() {
        let toml = r#"
[provider]
validate_url = "HTTPS://api.bitbucket.org/2.0/user/emails"
"#;

        let config = load_config_from_str(toml).unwrap();
        let overrides = ProviderOverrides::from_settings(&config.provider).unwrap();
        assert_eq!(overrides.validate_url.unwrap().scheme(), "https");
    }

    #[test]
    fn test_non_http_scheme_rejected() {
        let toml = r#"
[provider]
login_url = "ftp://bitbucket.org/site/oauth2/authorize"
"#;

        let result = load_config_from_str(toml);
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let config = AppConfig {
            provider: ProviderSettings {
                timeout_secs: 0,
                ..Default::default()
            },
            ..Default::default()
        };

        let result = validate_config(&config);
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
    }
}
