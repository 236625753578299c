//! Pluggable waiting between attempts.
//!
//! The executor never calls a timer directly; it asks its [`Sleeper`] to wait.
//! Production code uses [`TokioSleeper`]. Tests swap in [`InstantSleeper`] or
//! [`RecordingSleeper`] so a retry sequence with multi-second backoff finishes
//! immediately and the requested delays can be asserted exactly.

use futures::future::{self, BoxFuture, FutureExt};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Performs the wait between two attempts.
pub trait Sleeper: Send + Sync {
    /// Returns a future that completes once `delay` has elapsed.
    fn sleep(&self, delay: Duration) -> BoxFuture<'static, ()>;
}

/// Waits on the Tokio timer. This is the default sleeper.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

impl Sleeper for TokioSleeper {
    fn sleep(&self, delay: Duration) -> BoxFuture<'static, ()> {
        if delay.is_zero() {
            return future::ready(()).boxed();
        }
        tokio::time::sleep(delay).boxed()
    }
}

/// Completes immediately regardless of the requested delay.
#[derive(Debug, Clone, Copy, Default)]
pub struct InstantSleeper;

impl Sleeper for InstantSleeper {
    fn sleep(&self, _delay: Duration) -> BoxFuture<'static, ()> {
        future::ready(()).boxed()
    }
}

/// Completes immediately and remembers every requested delay.
///
/// Clones share the same record, so keep one handle for assertions and hand
/// another to the executor.
#[derive(Debug, Clone, Default)]
pub struct RecordingSleeper {
    delays: Arc<Mutex<Vec<Duration>>>,
}

impl RecordingSleeper {
    /// Creates a sleeper with an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the delays requested so far, oldest first.
    pub fn delays(&self) -> Vec<Duration> {
        self.lock().clone()
    }

    /// Returns how many waits were requested.
    pub fn count(&self) -> usize {
        self.lock().len()
    }

    /// Returns the sum of all requested delays, saturating at [`Duration::MAX`].
    pub fn total(&self) -> Duration {
        self.lock()
            .iter()
            .fold(Duration::ZERO, |total, delay| total.saturating_add(*delay))
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Duration>> {
        // A poisoned record is still a valid list of durations.
        self.delays.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Sleeper for RecordingSleeper {
    fn sleep(&self, delay: Duration) -> BoxFuture<'static, ()> {
        self.lock().push(delay);
        future::ready(()).boxed()
    }
}
