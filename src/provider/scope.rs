//! OAuth2 scope as a set of whitespace-delimited tokens

use std::fmt;

/// Scope requested when none is configured
pub const DEFAULT_SCOPE: &str = "email";

/// Scope token required to list team memberships
pub const TEAM_SCOPE: &str = "team";

/// Scope token required to list repositories
pub const REPOSITORY_SCOPE: &str = "repository";

/// Ordered, duplicate-free set of scope tokens.
///
/// Membership is decided per token, so `myteam` does not count as `team`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scope {
    tokens: Vec<String>,
}

impl Scope {
    /// Parse a space-separated scope string, dropping repeated tokens
    pub fn parse(scope: &str) -> Self {
        let mut parsed = Self::default();
        for token in scope.split_whitespace() {
            parsed.insert(token);
        }
        parsed
    }

    /// Parse `scope`, falling back to [`DEFAULT_SCOPE`] when it is blank
    pub fn parse_or_default(scope: Option<&str>) -> Self {
        let parsed = Self::parse(scope.unwrap_or_default());
        if parsed.is_empty() {
            Self::parse(DEFAULT_SCOPE)
        } else {
            parsed
        }
    }

    pub fn contains(&self, token: &str) -> bool {
        self.tokens.iter().any(|t| t == token)
    }

    /// Append `token` unless already present. Returns true if it was added.
    pub fn insert(&mut self, token: &str) -> bool {
        if token.is_empty() || self.contains(token) {
            return false;
        }
        self.tokens.push(token.to_string());
        true
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.tokens.iter().map(String::as_str)
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.tokens.join(" "))
    }
}
