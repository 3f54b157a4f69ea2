//! Exponential backoff for transient HTTP failures
//!
//! `Backoff` is a small state machine: it counts attempts and, after each
//! failure, says whether to try again and how long to wait first.

use std::time::Duration;

/// How many attempts to make and how fast the wait grows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one
    pub max_attempts: u32,
    /// The wait after failed attempt `n` is `base_delay * 2^n`
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Delay to wait after `attempt` (1-based) has failed
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.base_delay
            .saturating_mul(2u32.saturating_pow(attempt))
    }
}

/// What to do after a failed attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryStep {
    /// Sleep for `delay`, then make attempt number `next_attempt`
    Retry { next_attempt: u32, delay: Duration },
    /// No attempts left; `attempts` were made in total
    Exhausted { attempts: u32 },
}

/// Attempt counter driven by a [`RetryPolicy`]
#[derive(Debug, Clone)]
pub struct Backoff {
    policy: RetryPolicy,
    attempt: u32,
}

impl Backoff {
    /// Starts at attempt 1
    pub fn new(policy: RetryPolicy) -> Self {
        Self { policy, attempt: 1 }
    }

    /// The attempt currently in flight (1-based)
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    /// Records a failure of the current attempt and moves to the next state
    pub fn on_failure(&mut self) -> RetryStep {
        // A zero budget still allows the attempt that just failed.
        let max_attempts = self.policy.max_attempts.max(1);
        if self.attempt >= max_attempts {
            return RetryStep::Exhausted {
                attempts: self.attempt,
            };
        }

        let delay = self.policy.delay_after(self.attempt);
        self.attempt += 1;
        RetryStep::Retry {
            next_attempt: self.attempt,
            delay,
        }
    }
}
