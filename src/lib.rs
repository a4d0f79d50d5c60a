//! Storefront configuration resolver.
//!
//! Determines the effective catalog/pricing/store configuration for a
//! multi-tenant storefront by trying the tenant's remote store first, then a
//! locally cached copy, then a built-in document. Also publishes edited
//! configuration back to the remote store with optimistic concurrency and
//! repairs image links after a tenant moves repositories.
//!
//! ```text
//!   TenantRegistry ──▶ ConfigResolver ──▶ BlobStoreClient ──▶ remote store
//!                           │    │
//!                           │    └──────▶ LocalCache (fallback + staging)
//!                           ▼
//!                  ResolvedConfigState ◀── readers
//!
//!   ConsistencyRepair ──▶ LocalCache (tenant entries)
//! ```
//!
//! # Concurrency contract
//! Resolution passes are serialized: concurrent `resolve()` callers share the
//! in-flight pass. Local saves and publishes are not serialized against a
//! running pass; the last publish into the state wins.

pub mod cache;
pub mod catalog;
pub mod config;
pub mod lifecycle;
pub mod observability;
pub mod remote;
pub mod repair;
pub mod resilience;
pub mod resolver;
pub mod tenant;

pub use catalog::StoreConfig;
pub use config::ResolverSettings;
pub use lifecycle::StoreContext;
pub use resolver::{ConfigResolver, ConfigSource, Resolution};
