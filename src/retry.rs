//! Retry policy for failed download attempts
//!
//! The scheduler never gives up on an entry by default: every failure puts
//! the entry back in the queue and the next attempt waits the plain attempt
//! delay. [`RetryConfig`] can opt into growing delays, jitter, an attempt
//! cap, and dropping failures that [`IsRetryable`] classifies as permanent.
//!
//! # Example
//!
//! ```
//! use photo_dl::config::RetryConfig;
//! use std::time::Duration;
//!
//! let policy = RetryConfig {
//!     backoff_multiplier: 2.0,
//!     max_delay: Duration::from_secs(1),
//!     ..RetryConfig::default()
//! };
//!
//! let base = Duration::from_millis(100);
//! assert_eq!(policy.delay_after_failure(base, 1), Duration::from_millis(100));
//! assert_eq!(policy.delay_after_failure(base, 3), Duration::from_millis(400));
//! assert_eq!(policy.delay_after_failure(base, 10), Duration::from_secs(1));
//! ```

use crate::config::RetryConfig;
use crate::error::Error;
use rand::Rng;
use std::time::Duration;

/// Trait for errors that can be classified as retryable or not
///
/// Transient failures (timeouts, refused connections, 5xx, 429) should return `true`.
/// Permanent failures (malformed URL, 404, permission denied) should return `false`.
pub trait IsRetryable {
    /// Returns true if the error is transient and the operation should be retried
    fn is_retryable(&self) -> bool;
}

impl IsRetryable for Error {
    fn is_retryable(&self) -> bool {
        match self {
            // A malformed URL or a redirect loop fails the same way every time
            Error::Fetch { source, .. } => !(source.is_builder() || source.is_redirect()),
            Error::HttpStatus { status, .. } => is_transient_status(*status),
            Error::Write { source, .. } | Error::Io(source) => matches!(
                source.kind(),
                std::io::ErrorKind::TimedOut
                    | std::io::ErrorKind::Interrupted
                    | std::io::ErrorKind::WouldBlock
                    | std::io::ErrorKind::WriteZero
            ),
            Error::Config { .. }
            | Error::SourceOpen { .. }
            | Error::SourceRead { .. }
            | Error::SourceNotFound(_)
            | Error::NotTextFile(_)
            | Error::FolderCreate { .. }
            | Error::NoSources
            | Error::NoEntries
            | Error::Serialization(_) => false,
        }
    }
}

/// 5xx, 408 Request Timeout and 429 Too Many Requests are worth another try
fn is_transient_status(status: u16) -> bool {
    matches!(status, 408 | 429 | 500..=599)
}

impl RetryConfig {
    /// Delay to wait after an entry's `failures`-th consecutive failure
    ///
    /// The first failure waits `base`; each further failure multiplies it by
    /// `backoff_multiplier`, capped at `max_delay` but never shorter than
    /// `base`. With the default multiplier of 1.0 this is always `base`.
    pub fn delay_after_failure(&self, base: Duration, failures: u32) -> Duration {
        // 0 * inf would be NaN
        if base.is_zero() {
            return base;
        }

        let exponent = i32::try_from(failures.saturating_sub(1)).unwrap_or(i32::MAX);
        let scaled = base.as_secs_f64() * self.backoff_multiplier.powi(exponent);
        let max = self.max_delay.as_secs_f64();
        let capped = if scaled.is_finite() { scaled.min(max) } else { max };
        let delay = Duration::from_secs_f64(capped.max(0.0)).max(base);

        if self.jitter { add_jitter(delay) } else { delay }
    }

    /// Whether an entry that has now failed `failures` times should be abandoned
    pub fn gives_up<E: IsRetryable>(&self, failures: u32, error: &E) -> bool {
        if self.abandon_permanent && !error.is_retryable() {
            return true;
        }
        self.max_attempts.is_some_and(|max| failures >= max)
    }
}

/// Add random jitter to a delay to spread out retries
///
/// Jitter is uniformly distributed between 0% and 100% of the delay.
/// This means the actual delay will be between `delay` and `2 * delay`.
fn add_jitter(delay: Duration) -> Duration {
    let mut rng = rand::thread_rng();
    let jitter_factor: f64 = rng.gen_range(0.0..=1.0);
    let jittered_secs = delay.as_secs_f64() * (1.0 + jitter_factor);
    Duration::from_secs_f64(jittered_secs)
}
