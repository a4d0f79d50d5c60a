//! Startup orchestration.
//!
//! # Responsibilities
//! - Open the local cache named in settings
//! - Initialize all components in dependency order
//! - Run the first resolution pass
//!
//! # Design Decisions
//! - Fail fast on setup errors; degrade, never fail, on resolution
//! - Components share one `LocalCache` handle

use std::sync::Arc;
use thiserror::Error;

use crate::cache::LocalCache;
use crate::catalog::StoreConfig;
use crate::config::ResolverSettings;
use crate::remote::{BlobStoreClient, RemoteError};
use crate::repair::ConsistencyRepair;
use crate::resolver::{ConfigResolver, Resolution};
use crate::tenant::{CachedTenantRegistry, TenantRegistry};

/// Errors that abort startup.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to build remote client: {0}")]
    Remote(#[from] RemoteError),
}

/// Everything the application needs to read and edit its configuration.
pub struct StoreContext {
    settings: ResolverSettings,
    cache: LocalCache,
    registry: CachedTenantRegistry,
    remote: BlobStoreClient,
    resolver: Arc<ConfigResolver>,
    repair: ConsistencyRepair,
}

impl StoreContext {
    /// Build every component from `settings` without touching the network.
    pub fn new(settings: ResolverSettings) -> Result<Self, StartupError> {
        let cache = match &settings.cache.path {
            Some(path) => LocalCache::open(path),
            None => LocalCache::in_memory(),
        };
        Self::with_cache(settings, cache)
    }

    /// Build every component around an existing cache.
    pub fn with_cache(settings: ResolverSettings, cache: LocalCache) -> Result<Self, StartupError> {
        let registry = CachedTenantRegistry::new(cache.clone());
        let remote = BlobStoreClient::new(&settings)?;
        let resolver = Arc::new(ConfigResolver::new(
            remote.clone(),
            cache.clone(),
            Arc::new(registry.clone()) as Arc<dyn TenantRegistry>,
            settings.resolver.write_through,
        ));
        let repair = ConsistencyRepair::new(cache.clone(), settings.remote.raw_host.clone());

        tracing::debug!(
            cache_entries = cache.len(),
            write_through = settings.resolver.write_through,
            "Store context initialized"
        );

        Ok(Self {
            settings,
            cache,
            registry,
            remote,
            resolver,
            repair,
        })
    }

    /// Build the context and run the first resolution pass.
    pub async fn start(settings: ResolverSettings) -> Result<(Self, Arc<Resolution>), StartupError> {
        let context = Self::new(settings)?;
        let resolution = context.resolver.resolve().await;
        Ok((context, resolution))
    }

    pub fn settings(&self) -> &ResolverSettings {
        &self.settings
    }

    pub fn cache(&self) -> &LocalCache {
        &self.cache
    }

    pub fn registry(&self) -> &CachedTenantRegistry {
        &self.registry
    }

    pub fn remote(&self) -> &BlobStoreClient {
        &self.remote
    }

    /// Shared resolver handle.
    pub fn resolver(&self) -> Arc<ConfigResolver> {
        self.resolver.clone()
    }

    pub fn repair(&self) -> &ConsistencyRepair {
        &self.repair
    }

    /// Read accessor for call sites that only need the active configuration.
    pub fn current(&self) -> Option<Arc<StoreConfig>> {
        self.resolver.current()
    }
}
