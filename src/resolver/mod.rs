//! Configuration resolution subsystem.
//!
//! # Data Flow
//! ```text
//! resolve():
//!     TenantRegistry → coordinates (or default endpoint)
//!     → tier 1: BlobStoreClient::fetch (awaited first)
//!     → tier 2: LocalCache "storeConfig" (always read, used only if tier 1 failed)
//!     → tier 3: built-in document
//!     → ResolvedConfigState (atomic swap)
//!
//! publish():
//!     validate → BlobStoreClient::write (token read + PUT)
//!     → LocalCache "storeConfig" + tenant entry → ResolvedConfigState
//! ```

pub mod engine;
pub mod state;
pub mod types;

pub use engine::ConfigResolver;
pub use state::ResolvedConfigState;
pub use types::{ConfigSource, PublishError, Resolution};
