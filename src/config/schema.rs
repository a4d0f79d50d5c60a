//! Settings schema definitions.
//!
//! This module defines how the resolver itself is configured: where the
//! remote store lives, how long to wait for it, and where the local cache is
//! kept. All types derive Serde traits for deserialization from TOML.

use serde::{Deserialize, Serialize};

/// Root settings for the resolver.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ResolverSettings {
    /// Remote blob store endpoints.
    pub remote: RemoteSettings,

    /// Timeout configuration.
    pub timeouts: TimeoutSettings,

    /// Retry configuration for remote reads.
    pub retries: RetrySettings,

    /// Local cache settings.
    pub cache: CacheSettings,

    /// Resolution behaviour.
    pub resolver: ResolutionSettings,

    /// Observability settings.
    pub observability: ObservabilitySettings,
}

/// Remote blob store endpoints.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RemoteSettings {
    /// Host serving raw blob content (`{raw_host}/{owner}/{repo}/{branch}/{path}`).
    pub raw_host: String,

    /// Host serving the contents API (`{api_host}/repos/{owner}/{repo}/contents/{path}`).
    pub api_host: String,

    /// Blob path inside the repository.
    pub config_path: String,

    /// Document fetched when no tenant is configured.
    pub default_config_url: String,

    /// User-Agent sent with every request (the contents API rejects requests without one).
    pub user_agent: String,
}

impl Default for RemoteSettings {
    fn default() -> Self {
        Self {
            raw_host: "https://raw.githubusercontent.com".to_string(),
            api_host: "https://api.github.com".to_string(),
            config_path: "config.json".to_string(),
            default_config_url:
                "https://raw.githubusercontent.com/ahcene43/WAW/main/config.json".to_string(),
            user_agent: concat!("storefront-config/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Timeout configuration for remote calls.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutSettings {
    /// Connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// Total request timeout in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutSettings {
    fn default() -> Self {
        Self {
            connect_secs: 5,
            request_secs: 15,
        }
    }
}

/// Retry configuration. Applies to reads only; writes are never retried.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RetrySettings {
    /// Enable retries.
    pub enabled: bool,

    /// Maximum number of attempts, including the first.
    pub max_attempts: u32,

    /// Base delay for exponential backoff in milliseconds.
    pub base_delay_ms: u64,

    /// Maximum delay for exponential backoff in milliseconds.
    pub max_delay_ms: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            enabled: true,
            max_attempts: 3,
            base_delay_ms: 200,
            max_delay_ms: 2000,
        }
    }
}

impl RetrySettings {
    /// Attempts to make for one logical read.
    pub fn attempts(&self) -> u32 {
        if self.enabled {
            self.max_attempts.max(1)
        } else {
            1
        }
    }
}

/// Local cache settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheSettings {
    /// Path of the cache file. `None` keeps the cache in memory only.
    pub path: Option<String>,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            path: Some("storefront-cache.json".to_string()),
        }
    }
}

/// Resolution behaviour.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ResolutionSettings {
    /// Store a successful remote fetch as the local fallback copy.
    pub write_through: bool,
}

impl Default for ResolutionSettings {
    fn default() -> Self {
        Self {
            write_through: true,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilitySettings {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit JSON log lines instead of the human-readable format.
    pub json: bool,
}

impl Default for ObservabilitySettings {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json: false,
        }
    }
}
