//! Local cache module.

pub mod local;

pub use local::{
    CacheError, CacheResult, LocalCache, CURRENT_STORE_KEY, STORES_KEY, STORE_CONFIG_KEY,
};
