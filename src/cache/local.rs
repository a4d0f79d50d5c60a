//! Durable key-value cache.
//!
//! Values are stored as serialized JSON text per key, the same shape a
//! browser's local storage holds. Every write is persisted before returning.

use dashmap::DashMap;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Global fallback storefront document.
pub const STORE_CONFIG_KEY: &str = "storeConfig";
/// Tenant id → `{config, github}` entries.
pub const STORES_KEY: &str = "stores";
/// Id of the active tenant.
pub const CURRENT_STORE_KEY: &str = "currentStore";

/// Errors raised by the local cache.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cached value for '{key}' is corrupt: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize value for '{key}': {source}")]
    Serialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

pub type CacheResult<T> = Result<T, CacheError>;

/// Distinguishes temp files of concurrent persists within one process.
static TEMP_SEQ: AtomicU64 = AtomicU64::new(0);

/// A shared, file-backed key-value cache.
///
/// Cloning is cheap and every clone sees the same entries.
#[derive(Clone, Default)]
pub struct LocalCache {
    inner: Arc<DashMap<String, String>>,
    persistence_path: Option<PathBuf>,
    /// Orders persists across clones so the file never regresses.
    persist_lock: Arc<Mutex<()>>,
}

impl LocalCache {
    /// Create an empty cache that is never written to disk.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Open a cache backed by `path`.
    ///
    /// A missing file is an empty cache. An unreadable or unparseable file is
    /// also treated as empty (and overwritten on the next write).
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let cache = Self {
            persistence_path: Some(path.clone()),
            ..Self::default()
        };

        if !path.exists() {
            return cache;
        }

        match Self::read_file(&path) {
            Ok(entries) => {
                for (k, v) in entries {
                    cache.inner.insert(k, v);
                }
                tracing::info!(path = %path.display(), entries = cache.inner.len(), "Loaded local cache");
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Local cache file unreadable, starting empty");
            }
        }
        cache
    }

    fn read_file(path: &Path) -> Result<BTreeMap<String, String>, Box<dyn std::error::Error>> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }

    /// Raw text stored under `key`.
    pub fn get_raw(&self, key: &str) -> Option<String> {
        self.inner.get(key).map(|r| r.value().clone())
    }

    /// Store raw text under `key` and persist.
    pub fn set_raw(&self, key: &str, value: String) -> CacheResult<()> {
        self.inner.insert(key.to_string(), value);
        self.persist()
    }

    /// Remove `key` and persist. Returns whether it was present.
    pub fn remove(&self, key: &str) -> CacheResult<bool> {
        let removed = self.inner.remove(key).is_some();
        if removed {
            self.persist()?;
        }
        Ok(removed)
    }

    /// Decode the value under `key`.
    ///
    /// `Ok(None)` when absent, `Err(Corrupt)` when present but undecodable.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> CacheResult<Option<T>> {
        let Some(raw) = self.get_raw(key) else {
            return Ok(None);
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|source| CacheError::Corrupt {
                key: key.to_string(),
                source,
            })
    }

    /// Encode `value` under `key` and persist.
    pub fn set<T: Serialize>(&self, key: &str, value: &T) -> CacheResult<()> {
        let raw = serde_json::to_string(value).map_err(|source| CacheError::Serialize {
            key: key.to_string(),
            source,
        })?;
        self.set_raw(key, raw)
    }

    /// Number of keys held.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Write every entry to the backing file, if any.
    ///
    /// Writes to a sibling temp file and renames it over the target so a
    /// crash never leaves a half-written cache. Every call gets its own temp
    /// file, and the snapshot is taken under the persist lock.
    fn persist(&self) -> CacheResult<()> {
        let Some(path) = &self.persistence_path else {
            return Ok(());
        };

        let _persisting = self
            .persist_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let map: BTreeMap<String, String> = self
            .inner
            .iter()
            .map(|r| (r.key().clone(), r.value().clone()))
            .collect();
        let bytes = serde_json::to_vec_pretty(&map).map_err(|source| CacheError::Serialize {
            key: "*".to_string(),
            source,
        })?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err(parent))?;
        }

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let temp_path = path.with_file_name(format!(
            ".{}.{}.{}.tmp",
            file_name,
            std::process::id(),
            TEMP_SEQ.fetch_add(1, Ordering::Relaxed)
        ));

        let mut file = File::create(&temp_path).map_err(io_err(&temp_path))?;
        file.write_all(&bytes).map_err(io_err(&temp_path))?;
        file.sync_all().map_err(io_err(&temp_path))?;
        fs::rename(&temp_path, path).map_err(io_err(path))?;

        tracing::debug!(path = %path.display(), entries = map.len(), "Persisted local cache");
        Ok(())
    }
}

fn io_err(path: &Path) -> impl FnOnce(std::io::Error) -> CacheError {
    let path = path.to_path_buf();
    move |source| CacheError::Io { path, source }
}
