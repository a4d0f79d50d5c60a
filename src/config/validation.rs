//! Settings validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check endpoint URLs parse and use http(s)
//! - Validate value ranges (timeouts > 0, retry delays ordered)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ResolverSettings → Result<(), Vec<ValidationError>>

use thiserror::Error;
use url::Url;

use crate::config::schema::ResolverSettings;

/// A single settings problem.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} is not a valid http(s) URL: {value}")]
    InvalidUrl { field: &'static str, value: String },

    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    #[error("retries.base_delay_ms ({base}) exceeds retries.max_delay_ms ({max})")]
    BackoffRange { base: u64, max: u64 },

    #[error("remote.config_path must not be empty")]
    EmptyConfigPath,

    #[error("unknown log level '{0}'")]
    LogLevel(String),
}

/// Validate settings, collecting every problem.
pub fn validate_settings(settings: &ResolverSettings) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let remote = &settings.remote;
    for (field, value) in [
        ("remote.raw_host", &remote.raw_host),
        ("remote.api_host", &remote.api_host),
        ("remote.default_config_url", &remote.default_config_url),
    ] {
        if !is_http_url(value) {
            errors.push(ValidationError::InvalidUrl {
                field,
                value: value.clone(),
            });
        }
    }
    if remote.config_path.trim_matches('/').is_empty() {
        errors.push(ValidationError::EmptyConfigPath);
    }

    if settings.timeouts.connect_secs == 0 {
        errors.push(ValidationError::Zero("timeouts.connect_secs"));
    }
    if settings.timeouts.request_secs == 0 {
        errors.push(ValidationError::Zero("timeouts.request_secs"));
    }

    let retries = &settings.retries;
    if retries.enabled {
        if retries.max_attempts == 0 {
            errors.push(ValidationError::Zero("retries.max_attempts"));
        }
        if retries.base_delay_ms > retries.max_delay_ms {
            errors.push(ValidationError::BackoffRange {
                base: retries.base_delay_ms,
                max: retries.max_delay_ms,
            });
        }
    }

    let level = settings.observability.log_level.to_ascii_lowercase();
    if !matches!(level.as_str(), "trace" | "debug" | "info" | "warn" | "error") {
        errors.push(ValidationError::LogLevel(
            settings.observability.log_level.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn is_http_url(value: &str) -> bool {
    Url::parse(value)
        .map(|u| matches!(u.scheme(), "http" | "https") && u.has_host())
        .unwrap_or(false)
}
