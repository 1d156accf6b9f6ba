//! Request pacing for remote providers.

use std::time::Duration;

use tokio::sync::Mutex;

/// Enforces a fixed delay before each remote call.
///
/// Callers that share one limiter are serialized: the delay is slept while
/// the gate is held, so two concurrent requests are spaced by at least one
/// full delay.
#[derive(Debug)]
pub struct RateLimiter {
    delay: Duration,
    gate: Mutex<()>,
}

impl RateLimiter {
    /// Creates a limiter with the given delay between requests.
    #[must_use]
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            gate: Mutex::new(()),
        }
    }

    /// Creates a limiter from a delay in milliseconds.
    #[must_use]
    pub fn from_millis(millis: u64) -> Self {
        Self::new(Duration::from_millis(millis))
    }

    /// Returns the configured delay.
    #[must_use]
    pub const fn delay(&self) -> Duration {
        self.delay
    }

    /// Waits until a request may be sent.
    pub async fn wait(&self) {
        let _guard = self.gate.lock().await;
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(Duration::from_secs(1))
    }
}
