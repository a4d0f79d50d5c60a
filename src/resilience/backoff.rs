//! Exponential backoff with jitter.

use rand::Rng;
use std::time::Duration;

use crate::config::RetrySettings;

/// Calculate exponential backoff delay with jitter.
///
/// `attempt` counts retries already made; the first retry is attempt 1.
pub fn calculate_backoff(attempt: u32, base_ms: u64, max_ms: u64) -> Duration {
    if attempt == 0 {
        return Duration::from_millis(0);
    }

    let exponential_base = 2u64.saturating_pow(attempt - 1);
    let capped_delay = base_ms.saturating_mul(exponential_base).min(max_ms);

    // Up to 10% jitter
    let jitter_range = capped_delay / 10;
    let jitter = if jitter_range > 0 {
        rand::thread_rng().gen_range(0..jitter_range)
    } else {
        0
    };

    Duration::from_millis(capped_delay + jitter)
}

/// Delay before retry number `attempt` under `settings`.
pub fn retry_delay(settings: &RetrySettings, attempt: u32) -> Duration {
    calculate_backoff(attempt, settings.base_delay_ms, settings.max_delay_ms)
}
