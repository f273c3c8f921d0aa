//! Bitbucket API response types
//!
//! Only the fields the gates look at are modeled; everything else in the
//! payloads is ignored. Missing fields decode to their empty value rather
//! than failing, so a sparse but well-formed response still yields a result.

use serde::Deserialize;

/// Paginated list envelope (`{"values": [...], "next": ...}`)
///
/// Only the first page is consulted.
#[derive(Debug, Clone, Deserialize)]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub values: Vec<T>,
}

/// Entry of `GET /2.0/user/emails`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EmailRecord {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub is_primary: bool,
}

/// Entry of `GET /2.0/teams?role=member`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TeamMembership {
    /// Team identifier (the team's account username)
    #[serde(default)]
    pub username: String,
}

/// Entry of `GET /2.0/repositories/{namespace}?role=contributor`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RepositoryAccess {
    /// `namespace/name`
    #[serde(default)]
    pub full_name: String,
}
