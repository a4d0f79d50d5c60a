//! Metrics collection.
//!
//! # Responsibilities
//! - Define resolver metrics (resolution tiers, remote calls, repairs)
//! - Record through the `metrics` facade; the host application chooses the
//!   recorder/exporter
//!
//! # Metrics
//! - `storefront_config_resolutions_total` (counter): passes by winning source
//! - `storefront_config_remote_reads_total` (counter): reads by outcome
//! - `storefront_config_remote_writes_total` (counter): writes by outcome
//! - `storefront_config_images_rewritten_total` (counter): repaired links
//!
//! # Design Decisions
//! - Without an installed recorder every call is a no-op

use metrics::counter;

/// Record which tier a resolution pass ended on.
pub fn record_resolution(source: &'static str) {
    counter!("storefront_config_resolutions_total", "source" => source).increment(1);
}

/// Record the outcome of one remote read attempt.
pub fn record_remote_read(outcome: &'static str) {
    counter!("storefront_config_remote_reads_total", "outcome" => outcome).increment(1);
}

/// Record the outcome of a remote write.
pub fn record_remote_write(outcome: &'static str) {
    counter!("storefront_config_remote_writes_total", "outcome" => outcome).increment(1);
}

/// Record image links rewritten by a repair.
pub fn record_images_rewritten(count: usize) {
    counter!("storefront_config_images_rewritten_total").increment(count as u64);
}
