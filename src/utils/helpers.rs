//! Helper functions and utilities
//!
//! This module contains common helper functions used throughout the application.

use std::time::Duration;

/// Derive a URL slug from an event title
///
/// Lower-cases the title, replaces spaces with hyphens and strips
/// everything that is not ASCII alphanumeric or a hyphen.
pub fn slugify(title: &str) -> String {
    title
        .to_lowercase()
        .chars()
        .map(|c| if c == ' ' { '-' } else { c })
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-')
        .collect()
}

/// Compute a backoff delay for a retry attempt with random jitter
///
/// Doubles the base delay per attempt and caps the total at one second
/// so contended registrations never stall callers for long.
pub fn retry_delay(attempt: u32, base_ms: u64) -> Duration {
    use rand::Rng;
    let exponential = base_ms.saturating_mul(1u64 << attempt.min(6));
    let jitter = rand::thread_rng().gen_range(0..=base_ms.max(1));
    Duration::from_millis((exponential + jitter).min(1_000))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Beach Cleanup Day"), "beach-cleanup-day");
        assert_eq!(slugify("Food Drive 2025!"), "food-drive-2025");
        assert_eq!(slugify("already-clean"), "already-clean");
        assert_eq!(slugify("Caf\u{e9} Night"), "caf-night");
        assert_eq!(slugify(""), "");
    }

    #[test]
    fn test_retry_delay_bounds() {
        for attempt in 0..10 {
            let delay = retry_delay(attempt, 25);
            assert!(delay <= Duration::from_millis(1_000));
        }
        assert!(retry_delay(1, 25) >= Duration::from_millis(50));
    }

    proptest! {
        #[test]
        fn slugify_output_is_url_safe(title in ".*") {
            let slug = slugify(&title);
            prop_assert!(slug.chars().all(|c| c.is_ascii_alphanumeric() || c == '-'));
        }

        #[test]
        fn slugify_is_idempotent(title in ".*") {
            let once = slugify(&title);
            prop_assert_eq!(slugify(&once), once);
        }
    }
}
