//! Error types for bitbucket-gate
//!
//! This module defines the error hierarchy used throughout the crate.
//! A gate that refuses access is not an error: denials are reported through
//! [`crate::provider::Resolution`]. Everything here means the check itself
//! could not be completed.

use std::fmt;
use thiserror::Error;

/// Top-level application error
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Bitbucket API error: {0}")]
    Bitbucket(#[from] BitbucketError),

    #[error("Authorization check failed: {0}")]
    Provider(#[from] ProviderError),

    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),
}

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(String),

    #[error("Invalid configuration: {message}")]
    Invalid { message: String },

}

/// Bitbucket API transport and decode errors
#[derive(Error, Debug)]
pub enum BitbucketError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Bitbucket API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Rate limited, retry after {retry_after} seconds")]
    RateLimited { retry_after: u64 },

    #[error("Resource not found: {resource}")]
    NotFound { resource: String },

    #[error("Unauthorized: invalid or expired access token")]
    Unauthorized,

    #[error("Forbidden: token lacks the scope required for {action}")]
    Forbidden { action: String },

    #[error("Invalid response from Bitbucket: {0}")]
    InvalidResponse(String),
}

impl BitbucketError {
    /// Create an appropriate error from an HTTP status code and response body
    pub fn from_response(status: u16, body: &str) -> Self {
        match status {
            401 => BitbucketError::Unauthorized,
            403 => BitbucketError::Forbidden {
                action: "this lookup".into(),
            },
            404 => BitbucketError::NotFound {
                resource: "requested resource".into(),
            },
            429 => BitbucketError::RateLimited { retry_after: 60 },
            _ => BitbucketError::Api {
                status,
                message: if body.is_empty() {
                    format!("HTTP {}", status)
                } else {
                    body.to_string()
                },
            },
        }
    }
}

/// Pipeline phase in which a lookup failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Fetching the caller's email addresses
    Email,
    /// Fetching the caller's team memberships
    Team,
    /// Fetching the caller's repositories in the required namespace
    Repository,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Email => "email",
            Stage::Team => "team",
            Stage::Repository => "repository",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A remote lookup failed and the authorization check was aborted
#[derive(Error, Debug)]
#[error("{stage} lookup failed: {source}")]
pub struct ProviderError {
    pub stage: Stage,
    #[source]
    pub source: BitbucketError,
}

impl ProviderError {
    pub fn new(stage: Stage, source: BitbucketError) -> Self {
        Self { stage, source }
    }
}

/// Session/authentication errors
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("No access token supplied")]
    NotConfigured,

    #[error("Invalid access token: token is empty")]
    InvalidToken,
}

/// Result type alias for the application
pub type Result<T> = std::result::Result<T, AppError>;

/// Result type alias for Bitbucket API operations
pub type BitbucketResult<T> = std::result::Result<T, BitbucketError>;
