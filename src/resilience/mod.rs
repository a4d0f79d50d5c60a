//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Remote read:
//!     → request timeout (set on the HTTP client)
//!     → on transport error or 5xx: backoff.rs, then retry
//!     → attempts exhausted: caller falls through to the next tier
//!
//! Remote write:
//!     → request timeout only; never retried here
//! ```
//!
//! # Design Decisions
//! - Every external call has a deadline
//! - Only reads are retried; a write conflict goes back to the caller
//! - Jittered backoff keeps many clients from retrying in lockstep

pub mod backoff;

pub use backoff::{calculate_backoff, retry_delay};
