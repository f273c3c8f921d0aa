//! Provider endpoints and scope
//!
//! Operator overrides are merged over the Bitbucket Cloud defaults. An
//! endpoint that was configured is never replaced.

use crate::config::ProviderSettings;
use crate::error::ConfigError;
use crate::provider::scope::Scope;
use reqwest::Url;

/// Display name of the provider
pub const PROVIDER_NAME: &str = "Bitbucket";

/// Default OAuth2 authorize endpoint
pub const DEFAULT_LOGIN_URL: &str = "https://bitbucket.org/site/oauth2/authorize";

/// Default OAuth2 token-exchange endpoint
pub const DEFAULT_REDEEM_URL: &str = "https://bitbucket.org/site/oauth2/access_token";

/// Default email validation endpoint
pub const DEFAULT_VALIDATE_URL: &str = "https://api.bitbucket.org/2.0/user/emails";

/// Partially filled provider data as supplied by the operator
#[derive(Debug, Clone, Default)]
pub struct ProviderOverrides {
    pub login_url: Option<Url>,
    pub redeem_url: Option<Url>,
    pub validate_url: Option<Url>,
    pub scope: Option<String>,
}

impl ProviderOverrides {
    /// Parse the endpoint overrides from configuration.
    ///
    /// Values are trimmed and blank ones count as unset. A set value must be
    /// an absolute `http` or `https` URL; the scheme is matched without case.
    pub fn from_settings(settings: &ProviderSettings) -> Result<Self, ConfigError> {
        Ok(Self {
            login_url: parse_override("provider.login_url", settings.login_url.as_deref())?,
            redeem_url: parse_override("provider.redeem_url", settings.redeem_url.as_deref())?,
            validate_url: parse_override(
                "provider.validate_url",
                settings.validate_url.as_deref(),
            )?,
            scope: settings.scope.clone(),
        })
    }
}

fn parse_override(field: &str, value: Option<&str>) -> Result<Option<Url>, ConfigError> {
    let Some(raw) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };

    let url = Url::parse(raw).map_err(|e| ConfigError::Invalid {
        message: format!("{field} is not a valid URL ({raw}): {e}"),
    })?;
    // Url lowercases the scheme while parsing
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::Invalid {
            message: format!("{field} must be an http:// or https:// URL, got: {raw}"),
        });
    }
    Ok(Some(url))
}

/// Provider endpoints and requested scope after defaulting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderData {
    pub provider_name: &'static str,
    pub login_url: Url,
    pub redeem_url: Url,
    pub validate_url: Url,
    pub scope: Scope,
}

impl ProviderData {
    /// Fill every unset field with its Bitbucket default
    pub fn with_defaults(overrides: ProviderOverrides) -> Self {
        Self {
            provider_name: PROVIDER_NAME,
            login_url: overrides
                .login_url
                .unwrap_or_else(|| static_url(DEFAULT_LOGIN_URL)),
            redeem_url: overrides
                .redeem_url
                .unwrap_or_else(|| static_url(DEFAULT_REDEEM_URL)),
            validate_url: overrides
                .validate_url
                .unwrap_or_else(|| static_url(DEFAULT_VALIDATE_URL)),
            scope: Scope::parse_or_default(overrides.scope.as_deref()),
        }
    }
}

impl Default for ProviderData {
    fn default() -> Self {
        Self::with_defaults(ProviderOverrides::default())
    }
}

fn static_url(url: &'static str) -> Url {
    Url::parse(url).expect("built-in endpoint URL is valid")
}
