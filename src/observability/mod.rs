//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! resolver / remote client / repair produce:
//!     → logging.rs (structured log events, one span per resolution pass)
//!     → metrics.rs (counters)
//! ```
//!
//! # Design Decisions
//! - Structured fields, never interpolated messages, for machine parsing
//! - Each resolution pass carries a `pass_id` so its tier logs correlate
//! - The library never installs a subscriber or recorder on its own

pub mod logging;
pub mod metrics;

pub use logging::init_logging;
