//! Outcomes of an authorization check
//!
//! A check ends in exactly one of three ways: the caller resolved to an
//! email, a gate denied the caller, or the caller has no primary email.
//! Lookup failures are errors and never produce a [`Resolution`].

use crate::bitbucket::{EmailRecord, RepositoryAccess, TeamMembership};
use std::fmt;

/// Why a gate refused the caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Denial {
    /// The caller is not a member of the required team
    NotTeamMember { team: String },
    /// The caller cannot contribute to the required repository
    NoRepositoryAccess { repository: String },
}

impl fmt::Display for Denial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Denial::NotTeamMember { team } => {
                write!(f, "not a member of team '{team}'")
            }
            Denial::NoRepositoryAccess { repository } => {
                write!(f, "no contributor access to repository '{repository}'")
            }
        }
    }
}

/// Result of a single gate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateOutcome {
    /// No constraint configured for this gate
    Skipped,
    /// Constraint configured and satisfied
    Passed,
    /// Constraint configured and not satisfied
    Denied(Denial),
}

/// Final outcome of a completed check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Every configured gate passed; carries the primary email
    Resolved(String),
    /// Every configured gate passed but no email is marked primary
    NoPrimaryEmail,
    /// A gate refused the caller
    Denied(Denial),
}

impl Resolution {
    /// The resolved email, if any
    pub fn email(&self) -> Option<&str> {
        match self {
            Resolution::Resolved(email) if !email.is_empty() => Some(email),
            _ => None,
        }
    }

    /// Whether the caller may pass
    pub fn is_granted(&self) -> bool {
        self.email().is_some()
    }

    /// Collapse to the gateway's sentinel form: the email, or "" when not granted
    pub fn into_email(self) -> String {
        match self {
            Resolution::Resolved(email) => email,
            Resolution::NoPrimaryEmail | Resolution::Denied(_) => String::new(),
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resolution::Resolved(email) => write!(f, "resolved to {email}"),
            Resolution::NoPrimaryEmail => f.write_str("no primary email"),
            Resolution::Denied(denial) => write!(f, "denied: {denial}"),
        }
    }
}

/// First email marked primary
pub fn select_primary(emails: &[EmailRecord]) -> Resolution {
    emails
        .iter()
        .find(|e| e.is_primary)
        .map(|e| Resolution::Resolved(e.email.clone()))
        .unwrap_or(Resolution::NoPrimaryEmail)
}

/// Exact, case-sensitive team identifier match
pub fn is_team_member(teams: &[TeamMembership], team: &str) -> bool {
    teams.iter().any(|t| t.username == team)
}

/// Exact full-name match; a namespace or prefix match is not enough
pub fn has_repository_access(repositories: &[RepositoryAccess], repository: &str) -> bool {
    repositories.iter().any(|r| r.full_name == repository)
}

/// Namespace part of `namespace/name`: everything before the first `/`
pub fn repository_namespace(repository: &str) -> &str {
    repository
        .split_once('/')
        .map_or(repository, |(namespace, _)| namespace)
}

/// Whether `namespace` stays one literal path segment under the repository
/// listing. URL parsing drops tabs and newlines, reads `\` as `/` and
/// collapses `.`/`..` (also spelled `%2e`), so those are refused.
pub fn is_valid_namespace(namespace: &str) -> bool {
    if namespace.is_empty() || namespace.chars().any(|c| c.is_control() || c == '\\') {
        return false;
    }
    let decoded = namespace.to_ascii_lowercase().replace("%2e", ".");
    decoded != "." && decoded != ".."
}
