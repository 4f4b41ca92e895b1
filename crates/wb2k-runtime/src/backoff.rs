//! Reconnect retry accounting and backoff policy.

use std::time::Duration;

/// Delay curve applied between failed reconnect attempts. Kept behind a
/// trait so the curve can be swapped without touching the state machine.
pub trait BackoffPolicy: Send + Sync {
    /// Delay before retrying after the given failed attempt (1-based).
    fn delay(&self, attempt: u32) -> Duration;
}

/// Exponential backoff from a constant base with a capped exponent, so the
/// interval stays a bounded function of the base rather than growing without
/// limit.
#[derive(Debug, Clone)]
pub struct CappedExponentialBackoff {
    base: Duration,
    max_exponent: u32,
}

impl CappedExponentialBackoff {
    pub fn new(base: Duration, max_exponent: u32) -> Self {
        Self { base, max_exponent }
    }
}

impl Default for CappedExponentialBackoff {
    fn default() -> Self {
        Self::new(Duration::from_millis(500), 6)
    }
}

impl BackoffPolicy for CappedExponentialBackoff {
    fn delay(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(self.max_exponent);
        let scale = 2_u32.saturating_pow(exponent);
        self.base.saturating_mul(scale)
    }
}

/// Consecutive-failure counter with a fixed budget. Resets to zero on any
/// successful reconnect or clean read cycle, so isolated transient failures
/// never accumulate toward the fatal threshold.
#[derive(Debug)]
pub struct RetryState {
    attempts: u32,
    max_retries: u32,
}

impl RetryState {
    pub fn new(max_retries: u32) -> Self {
        Self {
            attempts: 0,
            max_retries,
        }
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn reset(&mut self) {
        self.attempts = 0;
    }

    /// Records one failed reconnect attempt. Returns `true` while budget
    /// remains; `false` means the budget is exhausted and the caller must
    /// terminate.
    pub fn record_failure(&mut self) -> bool {
        self.attempts = self.attempts.saturating_add(1);
        self.attempts <= self.max_retries
    }
}
