use crate::backoff::{ExponentialBackoff, IntervalFunction};
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default number of attempts, including the first one.
pub const DEFAULT_MAX_ATTEMPTS: usize = 3;

/// Default delay before the first retry.
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(1000);

/// Attempt budget and backoff seed for one executor.
///
/// A policy is validated when it is created, so any `RetryPolicy` value has
/// `max_attempts >= 1`. It deserializes from
/// `{ "max_attempts": 3, "base_delay_ms": 1000 }` with both fields optional.
///
/// ```
/// use retry_backoff::RetryPolicy;
/// use std::time::Duration;
///
/// let policy = RetryPolicy::new(4, Duration::from_millis(250)).unwrap();
/// assert_eq!(policy.delay_for(1), Duration::from_millis(250));
/// assert_eq!(policy.delay_for(3), Duration::from_millis(1000));
///
/// assert!(RetryPolicy::new(0, Duration::ZERO).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawPolicy", into = "RawPolicy")]
pub struct RetryPolicy {
    max_attempts: usize,
    base_delay: Duration,
}

impl RetryPolicy {
    /// Creates a policy, rejecting a zero attempt budget.
    pub fn new(max_attempts: usize, base_delay: Duration) -> Result<Self, ConfigError> {
        if max_attempts == 0 {
            return Err(ConfigError::ZeroMaxAttempts);
        }
        Ok(Self {
            max_attempts,
            base_delay,
        })
    }

    /// Total attempts allowed, including the first.
    pub fn max_attempts(&self) -> usize {
        self.max_attempts
    }

    /// Delay before the first retry.
    pub fn base_delay(&self) -> Duration {
        self.base_delay
    }

    /// Delay after the given 1-based failed attempt: `base_delay * 2^(attempt - 1)`.
    pub fn delay_for(&self, attempt: usize) -> Duration {
        ExponentialBackoff::new(self.base_delay).next_interval(attempt)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: DEFAULT_BASE_DELAY,
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawPolicy {
    #[serde(default = "default_max_attempts")]
    max_attempts: usize,
    #[serde(default = "default_base_delay_ms")]
    base_delay_ms: u64,
}

fn default_max_attempts() -> usize {
    DEFAULT_MAX_ATTEMPTS
}

fn default_base_delay_ms() -> u64 {
    DEFAULT_BASE_DELAY.as_millis() as u64
}

impl TryFrom<RawPolicy> for RetryPolicy {
    type Error = ConfigError;

    fn try_from(raw: RawPolicy) -> Result<Self, Self::Error> {
        RetryPolicy::new(raw.max_attempts, Duration::from_millis(raw.base_delay_ms))
    }
}

impl From<RetryPolicy> for RawPolicy {
    fn from(policy: RetryPolicy) -> Self {
        Self {
            max_attempts: policy.max_attempts,
            base_delay_ms: u64::try_from(policy.base_delay.as_millis()).unwrap_or(u64::MAX),
        }
    }
}
