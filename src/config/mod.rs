//! Resolver settings subsystem.
//!
//! # Data Flow
//! ```text
//! settings file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ResolverSettings (validated, immutable)
//!     → handed to the startup routine, which builds every component from it
//! ```
//!
//! # Design Decisions
//! - Settings are immutable once loaded
//! - All fields have defaults to allow minimal files
//! - Validation separates syntactic (serde) from semantic checks
//!
//! These are the resolver's own settings. The storefront document it
//! resolves lives in [`crate::catalog`].

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_settings, parse_settings, ConfigError};
pub use schema::{
    CacheSettings, ObservabilitySettings, RemoteSettings, ResolutionSettings, ResolverSettings,
    RetrySettings, TimeoutSettings,
};
