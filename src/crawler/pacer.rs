//! Global request pacing
//!
//! The crawl talks to one site through a single clock: every fetch waits
//! until at least `min_interval` has passed since the previous fetch
//! completed. Sleeps are cut short by cancellation.

use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Enforces the minimum interval between consecutive fetches
#[derive(Debug)]
pub struct Pacer {
    min_interval: Duration,
    last_fetch: Option<Instant>,
}

impl Pacer {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_fetch: None,
        }
    }

    /// Time left before the next fetch may start
    pub fn time_until_ready(&self) -> Duration {
        match self.last_fetch {
            Some(last) => self.min_interval.saturating_sub(last.elapsed()),
            None => Duration::ZERO,
        }
    }

    /// Waits until the next fetch is allowed
    ///
    /// Returns `false` if `cancel` fired while waiting.
    pub async fn wait(&self, cancel: &CancellationToken) -> bool {
        let remaining = self.time_until_ready();
        if remaining.is_zero() {
            return !cancel.is_cancelled();
        }

        tracing::trace!("Pacing: sleeping {:?}", remaining);
        sleep_or_cancel(remaining, cancel).await
    }

    /// Records that a fetch just completed
    pub fn mark(&mut self) {
        self.last_fetch = Some(Instant::now());
    }
}

/// Sleeps for `duration` unless cancelled first
///
/// Returns `true` if the full duration elapsed.
pub async fn sleep_or_cancel(duration: Duration, cancel: &CancellationToken) -> bool {
    tokio::select! {
        _ = cancel.cancelled() => false,
        _ = tokio::time::sleep(duration) => true,
    }
}
