//! Authentication module
//!
//! Session state received from the gateway, the provider trait the gateway
//! calls through, and the factory that builds the configured provider.

pub mod provider;
pub mod session;

pub use provider::{BoxedIdentityProvider, IdentityProvider};
pub use session::{AccessToken, SessionState};

use crate::bitbucket::BitbucketClient;
use crate::config::ProviderSettings;
use crate::error::Result;
use crate::provider::{BitbucketProvider, ProviderData, ProviderOverrides};

/// Build the Bitbucket provider described by configuration
pub fn build_bitbucket_provider(settings: &ProviderSettings) -> Result<BitbucketProvider> {
    let overrides = ProviderOverrides::from_settings(settings)?;
    let client = BitbucketClient::new(settings)?;

    let mut builder = BitbucketProvider::builder(ProviderData::with_defaults(overrides), client);
    if let Some(team) = &settings.team {
        builder = builder.team(team.clone());
    }
    if let Some(repository) = &settings.repository {
        builder = builder.repository(repository.clone());
    }

    Ok(builder.build()?)
}

/// Create a boxed identity provider from configuration
pub fn create_provider(settings: &ProviderSettings) -> Result<BoxedIdentityProvider> {
    Ok(Box::new(build_bitbucket_provider(settings)?))
}
