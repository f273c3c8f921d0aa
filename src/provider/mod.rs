//! Provider module
//!
//! Endpoint defaults, the scope token set, and the Bitbucket provider with
//! its authorization pipeline.

pub mod bitbucket;
pub mod data;
pub mod resolution;
pub mod scope;

pub use bitbucket::{BitbucketProvider, BitbucketProviderBuilder};
pub use data::{ProviderData, ProviderOverrides};
pub use resolution::{Denial, GateOutcome, Resolution};
pub use scope::Scope;
