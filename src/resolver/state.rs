//! The currently active configuration.
//!
//! Replaced wholesale on every publish; readers get an `Arc` snapshot and
//! never observe a half-updated value.

use arc_swap::ArcSwapOption;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::catalog::StoreConfig;
use crate::resolver::types::{ConfigSource, Resolution};

/// Shared holder of the resolved configuration.
///
/// Cloning is cheap and every clone observes the same value.
#[derive(Clone)]
pub struct ResolvedConfigState {
    inner: Arc<ArcSwapOption<Resolution>>,
    generation: Arc<AtomicU64>,
}

impl Default for ResolvedConfigState {
    fn default() -> Self {
        Self {
            inner: Arc::new(ArcSwapOption::empty()),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }
}

impl ResolvedConfigState {
    pub fn new() -> Self {
        Self::default()
    }

    /// The active configuration, `None` before the first resolution.
    pub fn current(&self) -> Option<Arc<StoreConfig>> {
        self.inner.load_full().map(|r| r.config.clone())
    }

    /// The active configuration with its source and generation.
    pub fn snapshot(&self) -> Option<Arc<Resolution>> {
        self.inner.load_full()
    }

    /// Number of publishes so far.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    pub(crate) fn publish(&self, config: StoreConfig, source: ConfigSource) -> Arc<Resolution> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let resolution = Arc::new(Resolution {
            config: Arc::new(config),
            source,
            generation,
        });
        self.inner.store(Some(resolution.clone()));
        resolution
    }
}
