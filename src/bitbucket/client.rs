//! Bitbucket API client
//!
//! Performs authenticated GET requests and decodes JSON bodies. The access
//! token travels as the `access_token` query parameter. No retries are
//! attempted: one failure is terminal for the calling check.

use crate::auth::AccessToken;
use crate::config::ProviderSettings;
use crate::error::{BitbucketError, BitbucketResult};
use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, instrument};

/// Query parameter carrying the access token
pub const ACCESS_TOKEN_PARAM: &str = "access_token";

/// Bitbucket API client
#[derive(Debug, Clone)]
pub struct BitbucketClient {
    http: Client,
}

impl BitbucketClient {
    /// Create a new client from provider settings
    pub fn new(settings: &ProviderSettings) -> BitbucketResult<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(90))
            .danger_accept_invalid_certs(!settings.verify_ssl)
            .user_agent(format!("bitbucket-gate/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(BitbucketError::Request)?;

        Ok(Self { http })
    }

    /// Attach the access token to a request URL
    fn authenticate(mut url: Url, token: &AccessToken) -> Url {
        url.query_pairs_mut()
            .append_pair(ACCESS_TOKEN_PARAM, token.expose_secret());
        url
    }

    /// Map non-success statuses to typed errors
    async fn handle_response(response: Response) -> BitbucketResult<Response> {
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();

        Err(BitbucketError::from_response(status.as_u16(), &body))
    }

    /// Make an authenticated GET request and decode the JSON body
    #[instrument(skip(self, url, token), fields(endpoint = %url.path()))]
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        token: &AccessToken,
    ) -> BitbucketResult<T> {
        let url = Self::authenticate(url, token);

        self.fetch(&url).await.inspect_err(|e| {
            debug!(
                request = %format!("GET {}", redact_url(&url)),
                error = %e,
                "Bitbucket request failed"
            )
        })
    }

    async fn fetch<T: DeserializeOwned>(&self, url: &Url) -> BitbucketResult<T> {
        let response = self.http.get(url.clone()).send().await?;
        let response = Self::handle_response(response).await?;

        response.json().await.map_err(|e| {
            BitbucketError::InvalidResponse(format!("Failed to parse response: {}", e))
        })
    }
}

/// Render a URL for logging with the access token value masked
pub fn redact_url(url: &Url) -> String {
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| {
            let v = if k == ACCESS_TOKEN_PARAM {
                "REDACTED".to_string()
            } else {
                v.into_owned()
            };
            (k.into_owned(), v)
        })
        .collect();

    let mut redacted = url.clone();
    if pairs.is_empty() {
        return redacted.to_string();
    }
    redacted.query_pairs_mut().clear().extend_pairs(pairs);
    redacted.to_string()
}
