//! Identity provider trait
//!
//! The gateway talks to every identity provider through this trait, so a
//! provider can be stored as `Box<dyn IdentityProvider>` next to others.

use crate::auth::session::SessionState;
use crate::error::ProviderError;
use crate::provider::ProviderData;
// async_trait required for dyn-compatibility with Box<dyn IdentityProvider>
use async_trait::async_trait;

/// Identity provider trait
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Human-readable provider name (for logging)
    fn name(&self) -> &'static str;

    /// Endpoints and scope after defaulting
    fn data(&self) -> &ProviderData;

    /// Resolve the session to an email address.
    ///
    /// Returns the primary email when access is granted and an empty string
    /// when a gate denied access or no primary email exists. An empty string
    /// must never be read as "granted".
    async fn email_address(&self, session: &SessionState) -> Result<String, ProviderError>;
}

/// Box type alias for identity providers
pub type BoxedIdentityProvider = Box<dyn IdentityProvider>;
