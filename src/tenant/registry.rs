//! Tenant registry access.
//!
//! # Responsibilities
//! - Answer "which tenant is active, and where does it live?"
//! - Stage edited configs into the tenant's cached entry
//!
//! # Design Decisions
//! - `TenantRegistry` is the read seam the resolver depends on
//! - The shipped implementation reads the `stores`/`currentStore` cache keys
//!   written by the surrounding application
//! - Entries are decoded one tenant and one field at a time: a bad record
//!   only affects that tenant, and a bad staged config reads as absent
//! - Writes touch a single field of a single entry; everything else is
//!   written back as it was read

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::cache::{CacheError, CacheResult, LocalCache, CURRENT_STORE_KEY, STORES_KEY};
use crate::catalog::StoreConfig;
use crate::tenant::{TenantCoordinates, TenantId};

const CONFIG_FIELD: &str = "config";
const COORDINATES_FIELD: &str = "github";

/// Read access to the tenant registry.
pub trait TenantRegistry: Send + Sync {
    /// Id of the active tenant, if one is selected.
    fn active_tenant(&self) -> Option<TenantId>;

    /// Remote coordinates registered for `tenant`.
    ///
    /// `Ok(None)` when none are registered, `Err` when the record exists but
    /// cannot be read.
    fn coordinates(&self, tenant: &str) -> CacheResult<Option<TenantCoordinates>>;

    /// The active tenant and its coordinates, when both exist and the
    /// coordinates name a repository.
    fn active_coordinates(&self) -> CacheResult<Option<(TenantId, TenantCoordinates)>> {
        let Some(tenant) = self.active_tenant() else {
            return Ok(None);
        };
        let coords = self.coordinates(&tenant)?;
        Ok(coords.filter(|c| c.is_configured()).map(|c| (tenant, c)))
    }

    /// Record `config` as the tenant's latest configuration. Registries that
    /// do not hold configurations ignore it.
    fn stage_config(&self, _tenant: &str, _config: &StoreConfig) -> CacheResult<()> {
        Ok(())
    }
}

/// One tenant's cached record.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct StoreEntry {
    /// Last staged configuration for this tenant.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<StoreConfig>,

    /// Remote coordinates.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github: Option<TenantCoordinates>,

    /// Fields owned by the surrounding application, kept as-is.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl StoreEntry {
    /// Decode a raw entry field by field. Fields that fail to decode are
    /// logged and read as absent.
    fn from_raw(tenant: &str, mut fields: Map<String, Value>) -> Self {
        let config = fields
            .remove(CONFIG_FIELD)
            .and_then(|raw| decode_field(tenant, CONFIG_FIELD, raw));
        let github = fields
            .remove(COORDINATES_FIELD)
            .and_then(|raw| decode_field(tenant, COORDINATES_FIELD, raw));
        Self {
            config,
            github,
            extra: fields,
        }
    }
}

fn decode_field<T: serde::de::DeserializeOwned>(tenant: &str, field: &str, raw: Value) -> Option<T> {
    match serde_json::from_value::<Option<T>>(raw) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(tenant = %tenant, field = %field, error = %e, "Tenant entry field unreadable, ignoring");
            None
        }
    }
}

fn corrupt(tenant: &str, field: Option<&str>, source: serde_json::Error) -> CacheError {
    let key = match field {
        Some(field) => format!("{}.{}.{}", STORES_KEY, tenant, field),
        None => format!("{}.{}", STORES_KEY, tenant),
    };
    CacheError::Corrupt { key, source }
}

/// Registry backed by the local cache.
#[derive(Clone)]
pub struct CachedTenantRegistry {
    cache: LocalCache,
}

impl CachedTenantRegistry {
    pub fn new(cache: LocalCache) -> Self {
        Self { cache }
    }

    /// Every tenant's record, undecoded.
    fn raw_stores(&self) -> CacheResult<Map<String, Value>> {
        Ok(self.cache.get(STORES_KEY)?.unwrap_or_default())
    }

    /// One tenant's record as a JSON object.
    fn raw_entry(&self, tenant: &str) -> CacheResult<Option<Map<String, Value>>> {
        let Some(value) = self.raw_stores()?.remove(tenant) else {
            return Ok(None);
        };
        serde_json::from_value(value)
            .map(Some)
            .map_err(|source| corrupt(tenant, None, source))
    }

    /// All tenant entries. Entries that are not objects are skipped.
    pub fn stores(&self) -> CacheResult<BTreeMap<TenantId, StoreEntry>> {
        let mut stores = BTreeMap::new();
        for (tenant, value) in self.raw_stores()? {
            match serde_json::from_value::<Map<String, Value>>(value) {
                Ok(fields) => {
                    let entry = StoreEntry::from_raw(&tenant, fields);
                    stores.insert(tenant, entry);
                }
                Err(e) => {
                    tracing::warn!(tenant = %tenant, error = %e, "Tenant entry unreadable, skipping");
                }
            }
        }
        Ok(stores)
    }

    /// A single tenant entry.
    pub fn entry(&self, tenant: &str) -> CacheResult<Option<StoreEntry>> {
        Ok(self
            .raw_entry(tenant)?
            .map(|fields| StoreEntry::from_raw(tenant, fields)))
    }

    /// Select the active tenant.
    pub fn set_active(&self, tenant: &str) -> CacheResult<()> {
        self.cache.set_raw(CURRENT_STORE_KEY, tenant.to_string())
    }

    /// Register or replace a tenant's coordinates.
    pub fn set_coordinates(&self, tenant: &str, coords: TenantCoordinates) -> CacheResult<()> {
        self.set_field(tenant, COORDINATES_FIELD, &coords)
    }

    /// Replace one field of `tenant`'s record, creating the record if needed.
    fn set_field<T: Serialize>(&self, tenant: &str, field: &str, value: &T) -> CacheResult<()> {
        let value = serde_json::to_value(value).map_err(|source| CacheError::Serialize {
            key: format!("{}.{}.{}", STORES_KEY, tenant, field),
            source,
        })?;

        let mut stores = self.raw_stores()?;
        let entry = stores
            .entry(tenant.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !entry.is_object() {
            tracing::warn!(tenant = %tenant, "Replacing unreadable tenant entry");
            *entry = Value::Object(Map::new());
        }
        if let Value::Object(fields) = entry {
            fields.insert(field.to_string(), value);
        }
        self.cache.set(STORES_KEY, &stores)
    }
}

impl TenantRegistry for CachedTenantRegistry {
    fn active_tenant(&self) -> Option<TenantId> {
        self.cache
            .get_raw(CURRENT_STORE_KEY)
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
    }

    fn coordinates(&self, tenant: &str) -> CacheResult<Option<TenantCoordinates>> {
        let Some(mut fields) = self.raw_entry(tenant)? else {
            return Ok(None);
        };
        match fields.remove(COORDINATES_FIELD) {
            Some(raw) => serde_json::from_value(raw)
                .map_err(|source| corrupt(tenant, Some(COORDINATES_FIELD), source)),
            None => Ok(None),
        }
    }

    fn stage_config(&self, tenant: &str, config: &StoreConfig) -> CacheResult<()> {
        self.set_field(tenant, CONFIG_FIELD, config)
    }
}
