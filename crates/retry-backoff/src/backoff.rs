//! Interval functions that decide how long to wait between attempts.

use std::fmt;
use std::time::Duration;

/// Computes the delay to wait after a failed attempt.
///
/// `attempt` is the 1-based index of the attempt that just failed, so the
/// first retry is scheduled with `next_interval(1)`.
pub trait IntervalFunction: Send + Sync {
    /// Returns the delay before the attempt following `attempt`.
    fn next_interval(&self, attempt: usize) -> Duration;
}

/// Exponential backoff: `initial * multiplier^(attempt - 1)`.
///
/// With the default multiplier of 2.0 the delays run `initial`, `2 * initial`,
/// `4 * initial`, and so on. Results saturate at `max_interval` when one is set,
/// and at [`Duration::MAX`] otherwise.
#[derive(Debug, Clone)]
pub struct ExponentialBackoff {
    initial_interval: Duration,
    multiplier: f64,
    max_interval: Option<Duration>,
}

impl ExponentialBackoff {
    /// Creates a doubling backoff starting at `initial_interval`.
    pub fn new(initial_interval: Duration) -> Self {
        Self {
            initial_interval,
            multiplier: 2.0,
            max_interval: None,
        }
    }

    /// Sets the growth factor applied per attempt.
    ///
    /// Values below 1.0 are clamped to 1.0 so delays never shrink.
    pub fn multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = if multiplier.is_finite() {
            multiplier.max(1.0)
        } else {
            1.0
        };
        self
    }

    /// Caps every computed delay at `max_interval`.
    pub fn max_interval(mut self, max_interval: Duration) -> Self {
        self.max_interval = Some(max_interval);
        self
    }

    fn uncapped(&self, attempt: usize) -> Duration {
        if self.initial_interval.is_zero() {
            return Duration::ZERO;
        }
        let exponent = attempt.saturating_sub(1);

        // Exact integer arithmetic for the doubling case.
        if self.multiplier == 2.0 {
            return u32::try_from(exponent)
                .ok()
                .and_then(|exp| 2u32.checked_pow(exp))
                .and_then(|factor| self.initial_interval.checked_mul(factor))
                .unwrap_or(Duration::MAX);
        }

        let exp = i32::try_from(exponent).unwrap_or(i32::MAX);
        let scaled = self.initial_interval.as_secs_f64() * self.multiplier.powi(exp);
        Duration::try_from_secs_f64(scaled).unwrap_or(Duration::MAX)
    }
}

impl IntervalFunction for ExponentialBackoff {
    fn next_interval(&self, attempt: usize) -> Duration {
        let delay = self.uncapped(attempt);
        match self.max_interval {
            Some(max) => delay.min(max),
            None => delay,
        }
    }
}

/// The same delay between every attempt.
#[derive(Debug, Clone, Copy)]
pub struct FixedInterval {
    interval: Duration,
}

impl FixedInterval {
    /// Creates a fixed interval.
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

impl IntervalFunction for FixedInterval {
    fn next_interval(&self, _attempt: usize) -> Duration {
        self.interval
    }
}

/// An interval function backed by a closure.
pub struct FnInterval<F> {
    f: F,
}

impl<F> FnInterval<F>
where
    F: Fn(usize) -> Duration + Send + Sync,
{
    /// Wraps `f`, which receives the 1-based attempt that failed.
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> IntervalFunction for FnInterval<F>
where
    F: Fn(usize) -> Duration + Send + Sync,
{
    fn next_interval(&self, attempt: usize) -> Duration {
        (self.f)(attempt)
    }
}

impl<F> fmt::Debug for FnInterval<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnInterval").finish_non_exhaustive()
    }
}
