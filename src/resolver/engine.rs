//! Configuration resolution.
//!
//! # Responsibilities
//! - Run the remote → cache → built-in fallback chain
//! - Publish the winner into the resolved state
//! - Save edits locally and publish them to the remote store
//!
//! # Design Decisions
//! - `resolve()` never fails; quality degrades, availability does not
//! - The remote attempt is always awaited before the cache is consulted
//! - The cache is a whole-document fallback; fields are never merged
//! - Remote and cached documents are repaired (stray sizes/colors dropped);
//!   user edits are validated and rejected instead
//! - One resolution at a time: callers arriving mid-pass share its result.
//!   Only a resolution pass can be joined; saves, publishes and explicit
//!   loads never stand in for one
//! - An active tenant whose record cannot be read skips the remote tier
//!   rather than reading the default endpoint
//! - A write conflict is returned to the caller, never retried here

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::Instrument;
use uuid::Uuid;

use crate::cache::{LocalCache, STORE_CONFIG_KEY};
use crate::catalog::{builtin_config, sanitize_catalog, validate_catalog, StoreConfig};
use crate::observability::metrics;
use crate::remote::{BlobStoreClient, RemoteResult, RemoteWriteResult};
use crate::resolver::state::ResolvedConfigState;
use crate::resolver::types::{ConfigSource, PublishError, Resolution};
use crate::tenant::{TenantCoordinates, TenantRegistry};

/// Resolves and publishes the active storefront configuration.
///
/// Saves and publishes do not wait for an in-flight resolution; whichever
/// finishes last defines the resolved state.
pub struct ConfigResolver {
    remote: BlobStoreClient,
    cache: LocalCache,
    registry: Arc<dyn TenantRegistry>,
    state: ResolvedConfigState,
    write_through: bool,
    /// Held for the duration of a resolution pass; holds the last pass's result.
    in_flight: Mutex<Option<Arc<Resolution>>>,
    /// Completed resolution passes.
    passes: AtomicU64,
}

impl ConfigResolver {
    pub fn new(
        remote: BlobStoreClient,
        cache: LocalCache,
        registry: Arc<dyn TenantRegistry>,
        write_through: bool,
    ) -> Self {
        Self {
            remote,
            cache,
            registry,
            state: ResolvedConfigState::new(),
            write_through,
            in_flight: Mutex::new(None),
            passes: AtomicU64::new(0),
        }
    }

    /// Handle to the resolved state, for readers that outlive a call.
    pub fn state(&self) -> &ResolvedConfigState {
        &self.state
    }

    /// The active configuration, `None` before the first resolution.
    pub fn current(&self) -> Option<Arc<StoreConfig>> {
        self.state.current()
    }

    /// Run one resolution pass and publish its result.
    ///
    /// If another pass is already running, waits for it and returns its
    /// result instead of starting a second one.
    pub async fn resolve(&self) -> Arc<Resolution> {
        let observed = self.passes.load(Ordering::Acquire);
        let mut last_pass = self.in_flight.lock().await;

        if self.passes.load(Ordering::Acquire) != observed {
            if let Some(done) = last_pass.as_ref() {
                tracing::debug!(generation = done.generation, "Joined in-flight resolution");
                return done.clone();
            }
        }

        let pass_id = Uuid::new_v4();
        let resolution = self
            .resolve_pass()
            .instrument(tracing::info_span!("resolve", %pass_id))
            .await;
        *last_pass = Some(resolution.clone());
        self.passes.fetch_add(1, Ordering::Release);
        resolution
    }

    async fn resolve_pass(&self) -> Arc<Resolution> {
        let remote = match self.registry.active_coordinates() {
            Ok(active) => {
                if let Some((tenant, coords)) = &active {
                    tracing::debug!(tenant = %tenant, namespace = %coords.namespace(), "Resolving for tenant");
                } else {
                    tracing::debug!("No tenant coordinates, using default endpoint");
                }
                self.fetch_remote(active.as_ref().map(|(_, coords)| coords)).await
            }
            Err(e) => {
                tracing::warn!(
                    tenant = ?self.registry.active_tenant(),
                    error = %e,
                    "Active tenant unreadable, skipping remote tier"
                );
                None
            }
        };

        let cached = self.read_cached();

        let (config, source) = match (remote, cached) {
            (Some(remote), _) => {
                if self.write_through {
                    if let Err(e) = self.cache.set(STORE_CONFIG_KEY, &remote) {
                        tracing::warn!(error = %e, "Failed to cache remote config");
                    }
                }
                (remote, ConfigSource::Remote)
            }
            (None, Some(cached)) => (cached, ConfigSource::Cache),
            (None, None) => {
                tracing::warn!("No remote or cached config, using built-in defaults");
                (builtin_config(), ConfigSource::Default)
            }
        };

        metrics::record_resolution(source.as_str());
        let resolution = self.state.publish(config, source);
        tracing::info!(
            source = source.as_str(),
            generation = resolution.generation,
            products = resolution.config.products.len(),
            "Configuration resolved"
        );
        resolution
    }

    async fn fetch_remote(&self, coords: Option<&TenantCoordinates>) -> Option<StoreConfig> {
        match self.remote.fetch(coords).await {
            Ok(mut config) => {
                repair_catalog(&mut config, ConfigSource::Remote);
                Some(config)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Remote config unavailable");
                None
            }
        }
    }

    fn read_cached(&self) -> Option<StoreConfig> {
        match self.cache.get::<StoreConfig>(STORE_CONFIG_KEY) {
            Ok(Some(mut config)) => {
                repair_catalog(&mut config, ConfigSource::Cache);
                Some(config)
            }
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(error = %e, "Cached config unusable, ignoring");
                None
            }
        }
    }

    /// Fetch from explicit coordinates and publish on success.
    ///
    /// Unlike [`resolve`](Self::resolve) this reports failure and leaves the
    /// resolved state alone. It does not wait for, or count as, a resolution
    /// pass.
    pub async fn load_remote_with(
        &self,
        coords: &TenantCoordinates,
    ) -> RemoteResult<Arc<Resolution>> {
        let mut config = self.remote.fetch(Some(coords)).await?;
        repair_catalog(&mut config, ConfigSource::Remote);
        metrics::record_resolution(ConfigSource::Remote.as_str());
        let resolution = self.state.publish(config, ConfigSource::Remote);
        tracing::info!(
            namespace = %coords.namespace(),
            generation = resolution.generation,
            "Configuration loaded from explicit coordinates"
        );
        Ok(resolution)
    }

    /// Validate `config`, store it as the local fallback copy and make it the
    /// active configuration.
    pub fn save_local(&self, config: StoreConfig) -> Result<Arc<Resolution>, PublishError> {
        validate_catalog(&config).map_err(PublishError::Invalid)?;
        self.cache.set(STORE_CONFIG_KEY, &config)?;
        let resolution = self.state.publish(config, ConfigSource::Saved);
        tracing::info!(generation = resolution.generation, "Configuration saved locally");
        Ok(resolution)
    }

    /// Write `config` to the active tenant's remote store, then stage it
    /// locally and make it the active configuration.
    ///
    /// A [`RemoteError::WriteConflict`](crate::remote::RemoteError::WriteConflict)
    /// means someone else wrote first; nothing local changes and the caller
    /// decides whether to re-resolve and retry.
    pub async fn publish(&self, config: StoreConfig) -> Result<RemoteWriteResult, PublishError> {
        validate_catalog(&config).map_err(PublishError::Invalid)?;
        let (tenant, coords) = self
            .registry
            .active_coordinates()?
            .ok_or(crate::remote::RemoteError::NoCoordinates)?;

        let result = self.remote.write(&config, &coords).await?;

        // The remote is now authoritative; local staging failures only cost
        // the offline fallback.
        if let Err(e) = self.cache.set(STORE_CONFIG_KEY, &config) {
            tracing::warn!(error = %e, "Failed to cache published config");
        }
        if let Err(e) = self.registry.stage_config(&tenant, &config) {
            tracing::warn!(tenant = %tenant, error = %e, "Failed to stage published config");
        }

        let resolution = self.state.publish(config, ConfigSource::Saved);
        tracing::info!(
            tenant = %tenant,
            generation = resolution.generation,
            version = ?result.version,
            "Configuration published"
        );
        Ok(result)
    }
}

/// Drop out-of-vocabulary sizes/colors from a fetched or cached document.
fn repair_catalog(config: &mut StoreConfig, origin: ConfigSource) {
    let issues = sanitize_catalog(config);
    if let Some(first) = issues.first() {
        tracing::warn!(
            origin = origin.as_str(),
            issues = issues.len(),
            first = %first,
            "Repaired inconsistent catalog"
        );
    }
}
