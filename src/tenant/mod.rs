//! Tenant coordinates and registry.
//!
//! A tenant is one storefront with its own repository on the remote blob
//! store. The registry itself belongs to the surrounding application; this
//! crate only reads from it (and stages edited configs into it).

pub mod registry;

use serde::{Deserialize, Serialize};

pub use registry::{CachedTenantRegistry, StoreEntry, TenantRegistry};

/// Branch used when a tenant does not name one.
pub const DEFAULT_BRANCH: &str = "main";

/// Identifier of a storefront tenant.
pub type TenantId = String;

/// Where a tenant's configuration lives on the remote store.
///
/// Serialized in the shape the storefront admin has always stored:
/// `{username, repo, branch, token}`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
pub struct TenantCoordinates {
    /// Repository owner.
    #[serde(rename = "username", default)]
    pub owner: String,

    /// Repository name.
    #[serde(default)]
    pub repo: String,

    /// Branch holding the configuration. Empty means [`DEFAULT_BRANCH`].
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub branch: String,

    /// Credential for authenticated calls (metadata read and write).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Raw-content host override; the resolver's configured host otherwise.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
}

impl TenantCoordinates {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
            ..Self::default()
        }
    }

    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = branch.into();
        self
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Both owner and repository are set.
    pub fn is_configured(&self) -> bool {
        !self.owner.trim().is_empty() && !self.repo.trim().is_empty()
    }

    /// `owner/repo`.
    pub fn namespace(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }

    /// Effective branch name.
    pub fn branch(&self) -> &str {
        if self.branch.is_empty() {
            DEFAULT_BRANCH
        } else {
            &self.branch
        }
    }

    /// The credential token, if one is set and non-blank.
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref().filter(|t| !t.trim().is_empty())
    }

    /// Raw-content host for this tenant, without a trailing slash.
    pub fn raw_host<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.host.as_deref().unwrap_or(fallback).trim_end_matches('/')
    }
}
