//! Observability hooks for retry sequences.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Events emitted while an executor runs an action.
#[derive(Debug, Clone)]
pub enum RetryEvent {
    /// An attempt failed and another one is scheduled after `delay`.
    Retry {
        pattern_name: String,
        timestamp: Instant,
        /// 1-based index of the attempt that failed.
        attempt: usize,
        delay: Duration,
    },
    /// The action succeeded, on the first try or after retries.
    Success {
        pattern_name: String,
        timestamp: Instant,
        attempts: usize,
    },
    /// The attempt budget ran out; the last error goes back to the caller.
    Error {
        pattern_name: String,
        timestamp: Instant,
        attempts: usize,
    },
}

impl RetryEvent {
    /// Short name of the event kind.
    pub fn event_type(&self) -> &'static str {
        match self {
            RetryEvent::Retry { .. } => "Retry",
            RetryEvent::Success { .. } => "Success",
            RetryEvent::Error { .. } => "Error",
        }
    }

    /// When the event was emitted.
    pub fn timestamp(&self) -> Instant {
        match self {
            RetryEvent::Retry { timestamp, .. }
            | RetryEvent::Success { timestamp, .. }
            | RetryEvent::Error { timestamp, .. } => *timestamp,
        }
    }

    /// Name of the executor that emitted the event.
    pub fn pattern_name(&self) -> &str {
        match self {
            RetryEvent::Retry { pattern_name, .. }
            | RetryEvent::Success { pattern_name, .. }
            | RetryEvent::Error { pattern_name, .. } => pattern_name,
        }
    }
}

/// Receives [`RetryEvent`]s.
pub trait RetryListener: Send + Sync {
    fn on_event(&self, event: &RetryEvent);
}

impl<F> RetryListener for F
where
    F: Fn(&RetryEvent) + Send + Sync,
{
    fn on_event(&self, event: &RetryEvent) {
        self(event)
    }
}

/// The listeners registered on one executor.
#[derive(Clone, Default)]
pub(crate) struct Listeners {
    inner: Vec<Arc<dyn RetryListener>>,
}

impl Listeners {
    pub(crate) fn add<L>(&mut self, listener: L)
    where
        L: RetryListener + 'static,
    {
        self.inner.push(Arc::new(listener));
    }

    /// Delivers `event` to every listener. A panicking listener is skipped so
    /// the others and the retry sequence itself carry on.
    pub(crate) fn emit(&self, event: &RetryEvent) {
        for listener in &self.inner {
            let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                listener.on_event(event);
            }));
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub(crate) fn len(&self) -> usize {
        self.inner.len()
    }
}

impl fmt::Debug for Listeners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listeners")
            .field("count", &self.inner.len())
            .finish()
    }
}
