//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber for binaries built on this crate
//!
//! # Design Decisions
//! - `RUST_LOG` wins over the configured level when set
//! - JSON output is opt-in via settings

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::ObservabilitySettings;

/// Install the global subscriber. Calling it twice is harmless; the second
/// call leaves the first subscriber in place.
pub fn init_logging(settings: &ObservabilitySettings) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "storefront_config={level},{level}",
            level = settings.log_level
        ))
    });

    let registry = tracing_subscriber::registry().with(filter);
    let result = if settings.json {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()
    } else {
        registry.with(tracing_subscriber::fmt::layer()).try_init()
    };

    if let Err(e) = result {
        tracing::debug!(error = %e, "Tracing subscriber already installed");
    }
}
