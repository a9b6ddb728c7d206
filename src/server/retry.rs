//! # Outbound Call Policy
//!
//! Every outbound call (verification, email) runs under a [`RetryPolicy`]:
//! - Each attempt is bounded by a timeout; an elapsed timeout fails closed
//! - Only transient failures (unreachable upstream, timeout, upstream 5xx)
//!   may be retried, and at most once
//! - Semantic rejections (bad token, rejected address) are returned immediately
//!
//! The default policy makes a single attempt.

use log::warn;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

/// Hard cap on attempts per outbound call: the original try plus one retry.
pub const MAX_ATTEMPTS_CAP: u32 = 2;

/// Errors that know whether trying again could change the outcome.
pub trait Transient {
    fn is_transient(&self) -> bool;
}

/// Retry configuration, loaded from the `[retry]` table.
///
/// # Example TOML
///
/// ```toml
/// [retry]
/// max_attempts = 2
/// backoff_ms = 250
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Total attempts including the first one (clamped to `1..=2`)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Base delay before the retry; up to half of it again is added as jitter
    #[serde(default = "default_backoff_ms")]
    pub backoff_ms: u64,
}

fn default_max_attempts() -> u32 {
    1
}

fn default_backoff_ms() -> u64 {
    250
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            backoff_ms: default_backoff_ms(),
        }
    }
}

impl RetryPolicy {
    /// Policy that never retries.
    pub fn single_attempt() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    pub fn attempts(&self) -> u32 {
        self.max_attempts.clamp(1, MAX_ATTEMPTS_CAP)
    }

    fn backoff(&self) -> Duration {
        let jitter = if self.backoff_ms > 1 {
            rand::thread_rng().gen_range(0..=self.backoff_ms / 2)
        } else {
            0
        };
        Duration::from_millis(self.backoff_ms + jitter)
    }

    /// Runs `op` with a per-attempt `timeout`, retrying transient failures.
    ///
    /// # Arguments
    /// - `label`: Name of the upstream, used in log lines
    /// - `timeout`: Upper bound for a single attempt
    /// - `on_timeout`: Builds the error returned when an attempt times out
    /// - `op`: Produces a fresh future for each attempt
    ///
    /// # Returns
    /// The first success, the first non-transient error, or the last error
    /// once attempts are exhausted.
    pub async fn run<T, E, F, Fut>(
        &self,
        label: &str,
        timeout: Duration,
        on_timeout: impl Fn() -> E,
        mut op: F,
    ) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Transient + Display,
    {
        let attempts = self.attempts();
        let mut attempt = 1;

        loop {
            let result = match tokio::time::timeout(timeout, op()).await {
                Ok(result) => result,
                Err(_) => Err(on_timeout()),
            };

            match result {
                Ok(value) => return Ok(value),
                Err(e) if e.is_transient() && attempt < attempts => {
                    warn!(
                        "🔄 {} attempt {}/{} failed ({}), retrying",
                        label, attempt, attempts, e
                    );
                    tokio::time::sleep(self.backoff()).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
