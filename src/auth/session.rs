//! Session state handed to the provider by the gateway
//!
//! The gateway redeems and refreshes tokens itself; by the time a session
//! reaches this crate it already carries a usable access token.

use crate::error::AuthError;
use std::fmt;
use std::sync::Arc;

/// OAuth2 access token that never shows up in logs.
///
/// `Debug` and `Display` print `[REDACTED]`; the raw value is only reachable
/// through [`AccessToken::expose_secret`].
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(Arc<str>);

impl AccessToken {
    /// Wrap a token, rejecting empty values
    pub fn new(token: impl Into<String>) -> Result<Self, AuthError> {
        let token = token.into();
        if token.is_empty() {
            return Err(AuthError::InvalidToken);
        }
        Ok(Self(token.into()))
    }

    /// Raw token value, for building the request credential only
    #[inline]
    pub fn expose_secret(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl fmt::Display for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

/// Read-only view of a gateway session
#[derive(Debug, Clone)]
pub struct SessionState {
    access_token: AccessToken,
}

impl SessionState {
    /// Create a session from a raw access token
    pub fn new(access_token: impl Into<String>) -> Result<Self, AuthError> {
        Ok(Self {
            access_token: AccessToken::new(access_token)?,
        })
    }

    /// Create a session from an optional token, e.g. a CLI flag or env var
    pub fn from_optional(access_token: Option<String>) -> Result<Self, AuthError> {
        match access_token {
            Some(token) => Self::new(token),
            None => Err(AuthError::NotConfigured),
        }
    }

    pub fn access_token(&self) -> &AccessToken {
        &self.access_token
    }
}
