//! Bitbucket identity gate
//!
//! Identity resolution and access gating for the Bitbucket OAuth2 provider
//! of an authenticating reverse proxy.
//!
//! ## Authorization Pipeline
//!
//! ```text
//! emails → team gate (optional) → repository gate (optional) → primary email
//! ```
//!
//! - A failed lookup aborts the check with an error
//! - A gate that refuses the caller ends the check with [`provider::Resolution::Denied`]
//! - Otherwise the first primary email is returned
//!
//! ## Example Configuration
//!
//! ```toml
//! [provider]
//! team = "acme"                 # require membership in team "acme"
//! repository = "acme/app"       # require contributor access to acme/app
//! # validate_url = "https://api.bitbucket.org/2.0/user/emails"
//!
//! [logging]
//! level = "info"
//! format = "json"
//! ```

pub mod auth;
pub mod bitbucket;
pub mod config;
pub mod error;
pub mod provider;

// Re-export main types
pub use auth::{IdentityProvider, SessionState, create_provider};
pub use config::{AppConfig, load_config};
pub use error::{AppError, Result};
pub use provider::{BitbucketProvider, Resolution};
