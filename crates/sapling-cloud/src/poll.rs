//! Bounded fixed-interval polling

use crate::error::Result;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;

const DEFAULT_MAX_ATTEMPTS: u32 = 60;
const DEFAULT_INTERVAL_SECS: u64 = 5;

/// How often and how many times to check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    /// Number of checks before giving up
    pub max_attempts: u32,

    /// Sleep between checks
    pub interval: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            interval: Duration::from_secs(DEFAULT_INTERVAL_SECS),
        }
    }
}

impl PollConfig {
    pub fn new(max_attempts: u32, interval: Duration) -> Self {
        Self {
            max_attempts,
            interval,
        }
    }

    /// Upper bound on the time spent sleeping
    pub fn budget(&self) -> Duration {
        self.interval * self.max_attempts.saturating_sub(1)
    }
}

/// Call `check` until it reports `true` or the attempts run out
///
/// Returns `Ok(true)` on the first success and `Ok(false)` once the budget
/// is exhausted. A check error ends polling immediately and is returned
/// unchanged.
pub async fn poll_until<F, Fut>(config: &PollConfig, what: &str, mut check: F) -> Result<bool>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<bool>>,
{
    for attempt in 1..=config.max_attempts {
        if check().await? {
            tracing::debug!("{} after {} attempt(s)", what, attempt);
            return Ok(true);
        }

        if attempt < config.max_attempts {
            tracing::info!(
                "Waiting for {} ({}/{}), sleeping for {:?}...",
                what,
                attempt,
                config.max_attempts,
                config.interval
            );
            sleep(config.interval).await;
        }
    }

    tracing::warn!("Gave up waiting for {} after {} attempts", what, config.max_attempts);
    Ok(false)
}
