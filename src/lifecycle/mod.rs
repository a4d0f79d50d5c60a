//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Settings → Open cache → Build registry, remote client, resolver, repair
//!     → First resolution pass → StoreContext handed to the application
//! ```
//!
//! # Design Decisions
//! - Ordered startup: settings first, then storage, then network clients
//! - Only an invalid HTTP client setup is fatal; resolution itself never is
//! - The context is an owned value passed around, not a global

pub mod startup;

pub use startup::{StartupError, StoreContext};
