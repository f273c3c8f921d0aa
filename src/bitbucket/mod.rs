//! Bitbucket API module
//!
//! A minimal typed client for the three Bitbucket Cloud listings the gates
//! consult: the caller's emails, teams and repositories.

pub mod client;
pub mod types;

pub use client::{BitbucketClient, redact_url};
pub use types::*;
