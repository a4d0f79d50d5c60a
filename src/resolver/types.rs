//! Resolution types and error definitions.

use std::sync::Arc;
use thiserror::Error;

use crate::cache::CacheError;
use crate::catalog::{CatalogError, StoreConfig};
use crate::remote::RemoteError;

/// Where the active configuration came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigSource {
    /// Fetched from the tenant's remote store (or the default endpoint).
    Remote,
    /// Read from the local fallback copy.
    Cache,
    /// Built-in document; nothing else was available.
    Default,
    /// Set explicitly by a local save or a publish.
    Saved,
}

impl ConfigSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfigSource::Remote => "remote",
            ConfigSource::Cache => "cache",
            ConfigSource::Default => "default",
            ConfigSource::Saved => "saved",
        }
    }
}

/// One published configuration value.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub config: Arc<StoreConfig>,
    pub source: ConfigSource,
    /// Increases by one with every publish into the resolved state.
    pub generation: u64,
}

/// Errors from the save and publish flows.
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("config failed validation: {}", join(.0))]
    Invalid(Vec<CatalogError>),

    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error(transparent)]
    Cache(#[from] CacheError),
}

impl PublishError {
    /// The remote blob changed since its version token was read.
    pub fn is_conflict(&self) -> bool {
        matches!(self, PublishError::Remote(e) if e.is_conflict())
    }
}

fn join(errors: &[CatalogError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
