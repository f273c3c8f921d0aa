//! Bitbucket identity provider
//!
//! Resolution runs three lookups in a fixed order, all with the same
//! access token:
//!
//! ```text
//! Start → EmailFetched → [TeamChecked] → [RepositoryChecked] → Resolved
//!              │               │                 │
//!              └── Failed      ├── Failed        ├── Failed
//!                              └── Denied        └── Denied
//! ```
//!
//! The gates run before the primary email is selected, and a gate that
//! refuses the caller ends the check immediately. Any failed lookup aborts
//! the whole check with a [`ProviderError`].

use crate::auth::{AccessToken, IdentityProvider, SessionState};
use crate::bitbucket::{BitbucketClient, EmailRecord, Page, RepositoryAccess, TeamMembership};
use crate::error::{ConfigError, ProviderError, Stage};
use crate::provider::data::ProviderData;
use crate::provider::resolution::{
    Denial, GateOutcome, Resolution, has_repository_access, is_team_member, is_valid_namespace,
    repository_namespace, select_primary,
};
use crate::provider::scope::{REPOSITORY_SCOPE, TEAM_SCOPE};
use async_trait::async_trait;
use reqwest::Url;
use tracing::{debug, info, instrument, warn};

/// Path of the team membership listing on the API host
pub const TEAMS_PATH: &str = "/2.0/teams";

/// Path prefix of the repository listing on the API host
pub const REPOSITORIES_PATH: &str = "/2.0/repositories";

/// Bitbucket provider with optional team and repository gates.
///
/// Immutable once built; share it behind an `Arc` across concurrent checks.
#[derive(Debug, Clone)]
pub struct BitbucketProvider {
    data: ProviderData,
    team: Option<String>,
    repository: Option<String>,
    client: BitbucketClient,
}

/// Builder for [`BitbucketProvider`]
#[derive(Debug, Clone)]
pub struct BitbucketProviderBuilder {
    data: ProviderData,
    team: Option<String>,
    repository: Option<String>,
    client: BitbucketClient,
}

impl BitbucketProviderBuilder {
    /// Require membership in `team`.
    ///
    /// Adds the `team` scope token once, however often this is called. An
    /// empty name removes the constraint.
    pub fn team(mut self, team: impl Into<String>) -> Self {
        let team = team.into();
        if team.is_empty() {
            self.team = None;
            return self;
        }
        self.data.scope.insert(TEAM_SCOPE);
        self.team = Some(team);
        self
    }

    /// Require contributor access to `repository` (`namespace/name`).
    ///
    /// Adds the `repository` scope token once, however often this is
    /// called. An empty name removes the constraint.
    pub fn repository(mut self, repository: impl Into<String>) -> Self {
        let repository = repository.into();
        if repository.is_empty() {
            self.repository = None;
            return self;
        }
        self.data.scope.insert(REPOSITORY_SCOPE);
        self.repository = Some(repository);
        self
    }

    /// Finish the provider.
    ///
    /// Fails when the repository namespace would not map to a single path
    /// segment of the repository listing (empty, `.`, `..` and the like).
    pub fn build(self) -> Result<BitbucketProvider, ConfigError> {
        if let Some(repository) = &self.repository {
            let namespace = repository_namespace(repository);
            if !is_valid_namespace(namespace) {
                return Err(ConfigError::Invalid {
                    message: format!(
                        "provider.repository has an unusable namespace '{namespace}': {repository}"
                    ),
                });
            }
            if !repository.contains('/') {
                warn!(
                    repository = %repository,
                    "Repository has no namespace separator, the whole value is used as namespace"
                );
            }
        }

        Ok(BitbucketProvider {
            data: self.data,
            team: self.team,
            repository: self.repository,
            client: self.client,
        })
    }
}

impl BitbucketProvider {
    /// Start building a provider over already-defaulted provider data
    pub fn builder(data: ProviderData, client: BitbucketClient) -> BitbucketProviderBuilder {
        BitbucketProviderBuilder {
            data,
            team: None,
            repository: None,
            client,
        }
    }

    pub fn team(&self) -> Option<&str> {
        self.team.as_deref()
    }

    pub fn repository(&self) -> Option<&str> {
        self.repository.as_deref()
    }

    /// Same scheme, host and port as the validate endpoint, different path
    fn api_url(&self, path: &str) -> Url {
        let mut url = self.data.validate_url.clone();
        url.set_path(path);
        url.set_query(None);
        url.set_fragment(None);
        url
    }

    /// Team listing endpoint, filtered to memberships with at least member role
    pub fn teams_url(&self) -> Url {
        let mut url = self.api_url(TEAMS_PATH);
        url.query_pairs_mut().append_pair("role", "member");
        url
    }

    /// Repository listing endpoint for the namespace of `repository`,
    /// filtered to contributor role and to the exact full name
    pub fn repositories_url(&self, repository: &str) -> Url {
        let namespace = repository_namespace(repository);
        let mut url = self.api_url(&format!("{REPOSITORIES_PATH}/{namespace}"));
        url.query_pairs_mut()
            .append_pair("role", "contributor")
            .append_pair("q", &format!("full_name=\"{repository}\""));
        url
    }

    /// Run the full check for a session
    #[instrument(skip_all, fields(provider = self.data.provider_name))]
    pub async fn resolve(&self, session: &SessionState) -> Result<Resolution, ProviderError> {
        let emails = self.fetch_emails(session.access_token()).await?;

        if let GateOutcome::Denied(denial) = self.check_team(session).await? {
            info!(reason = %denial, "Team membership test failed, access denied");
            return Ok(Resolution::Denied(denial));
        }

        if let GateOutcome::Denied(denial) = self.check_repository(session).await? {
            info!(reason = %denial, "Repository access test failed, access denied");
            return Ok(Resolution::Denied(denial));
        }

        let resolution = select_primary(&emails);
        if matches!(resolution, Resolution::NoPrimaryEmail) {
            info!(count = emails.len(), "No primary email among returned addresses");
        }
        Ok(resolution)
    }

    async fn fetch_emails(&self, token: &AccessToken) -> Result<Vec<EmailRecord>, ProviderError> {
        let page: Page<EmailRecord> = self
            .client
            .get_json(self.data.validate_url.clone(), token)
            .await
            .map_err(|e| ProviderError::new(Stage::Email, e))?;

        debug!(count = page.values.len(), "Fetched email addresses");
        Ok(page.values)
    }

    /// Team gate: skipped when no team is configured
    pub async fn check_team(&self, session: &SessionState) -> Result<GateOutcome, ProviderError> {
        let Some(team) = self.team.as_deref() else {
            return Ok(GateOutcome::Skipped);
        };

        info!(team = %team, "Filtering against membership in team");
        let page: Page<TeamMembership> = self
            .client
            .get_json(self.teams_url(), session.access_token())
            .await
            .map_err(|e| ProviderError::new(Stage::Team, e))?;
        debug!(count = page.values.len(), "Fetched team memberships");

        if is_team_member(&page.values, team) {
            Ok(GateOutcome::Passed)
        } else {
            Ok(GateOutcome::Denied(Denial::NotTeamMember {
                team: team.to_string(),
            }))
        }
    }

    /// Repository gate: skipped when no repository is configured
    pub async fn check_repository(
        &self,
        session: &SessionState,
    ) -> Result<GateOutcome, ProviderError> {
        let Some(repository) = self.repository.as_deref() else {
            return Ok(GateOutcome::Skipped);
        };

        info!(repository = %repository, "Filtering against access to repository");
        let page: Page<RepositoryAccess> = self
            .client
            .get_json(self.repositories_url(repository), session.access_token())
            .await
            .map_err(|e| ProviderError::new(Stage::Repository, e))?;
        debug!(count = page.values.len(), "Fetched accessible repositories");

        if has_repository_access(&page.values, repository) {
            Ok(GateOutcome::Passed)
        } else {
            Ok(GateOutcome::Denied(Denial::NoRepositoryAccess {
                repository: repository.to_string(),
            }))
        }
    }
}

#[async_trait]
impl IdentityProvider for BitbucketProvider {
    fn name(&self) -> &'static str {
        self.data.provider_name
    }

    fn data(&self) -> &ProviderData {
        &self.data
    }

    async fn email_address(&self, session: &SessionState) -> Result<String, ProviderError> {
        self.resolve(session).await.map(Resolution::into_email)
    }
}
