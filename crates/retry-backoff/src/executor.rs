use crate::config::{RetryConfig, RetryExecutorBuilder};
use crate::events::RetryEvent;
use crate::layer::RetryLayer;
use crate::policy::RetryPolicy;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

#[cfg(feature = "metrics")]
use metrics::{counter, describe_counter, describe_histogram, histogram};
#[cfg(feature = "metrics")]
use std::sync::Once;
#[cfg(feature = "tracing")]
use tracing::{debug, trace};

#[cfg(feature = "metrics")]
static METRICS_INIT: Once = Once::new();

#[cfg(feature = "metrics")]
fn describe_metrics() {
    METRICS_INIT.call_once(|| {
        describe_counter!(
            "retry_calls_total",
            "Total number of executions, labeled by final result"
        );
        describe_counter!(
            "retry_attempts_total",
            "Total number of retries scheduled after a failed attempt"
        );
        describe_histogram!(
            "retry_attempts",
            "Number of attempts made per execution"
        );
    });
}

/// What happens after one attempt finishes.
///
/// `RetryScheduled` and `Failed` both carry the attempt's error; only the
/// former leaves room in the attempt budget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome<T, E> {
    /// The attempt produced a value. Terminal.
    Succeeded(T),
    /// The attempt failed and `next_attempt` runs after `delay`.
    RetryScheduled {
        next_attempt: usize,
        delay: Duration,
        error: E,
    },
    /// The last permitted attempt failed. Terminal.
    Failed(E),
}

impl<T, E> AttemptOutcome<T, E> {
    /// Returns true for `Succeeded` and `Failed`.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, AttemptOutcome::RetryScheduled { .. })
    }
}

/// Runs an async action, retrying failures with backoff until the attempt
/// budget runs out.
///
/// Attempts run strictly one after another. Between two attempts the
/// executor waits for the delay returned by its interval function, by default
/// `base_delay * 2^(attempt - 1)`. When the last attempt fails, its error is
/// returned exactly as the action produced it.
///
/// The executor holds no per-call state. Clones share configuration and any
/// number of `execute` calls may run concurrently.
///
/// # Examples
///
/// ```
/// use retry_backoff::{RecordingSleeper, RetryExecutor};
/// use std::time::Duration;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let sleeper = RecordingSleeper::new();
/// let executor = RetryExecutor::builder()
///     .max_attempts(3)
///     .base_delay(Duration::from_millis(1000))
///     .sleeper(sleeper.clone())
///     .build()
///     .unwrap();
///
/// let mut calls = 0;
/// let result: Result<&str, &str> = executor
///     .execute(|| {
///         calls += 1;
///         let outcome = if calls < 3 { Err("not yet") } else { Ok("done") };
///         async move { outcome }
///     })
///     .await;
///
/// assert_eq!(result, Ok("done"));
/// assert_eq!(
///     sleeper.delays(),
///     vec![Duration::from_millis(1000), Duration::from_millis(2000)]
/// );
/// # }
/// ```
#[derive(Clone)]
pub struct RetryExecutor {
    config: Arc<RetryConfig>,
}

impl RetryExecutor {
    /// Creates an executor for `policy` with exponential backoff and the Tokio timer.
    pub fn new(policy: RetryPolicy) -> Self {
        Self::from_config(RetryConfig::new(policy))
    }

    /// Creates a new builder.
    pub fn builder() -> RetryExecutorBuilder {
        RetryExecutorBuilder::new()
    }

    pub(crate) fn from_config(config: RetryConfig) -> Self {
        #[cfg(feature = "metrics")]
        describe_metrics();

        Self {
            config: Arc::new(config),
        }
    }

    /// The attempt budget and base delay.
    pub fn policy(&self) -> RetryPolicy {
        self.config.policy
    }

    /// The name used in events, logs and metrics.
    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// Wraps a Tower service so each call runs through this executor.
    pub fn layer(&self) -> RetryLayer {
        RetryLayer::new(self.clone())
    }

    /// Decides what follows the 1-based `attempt` that produced `result`.
    pub fn step<T, E>(&self, attempt: usize, result: Result<T, E>) -> AttemptOutcome<T, E> {
        match result {
            Ok(value) => AttemptOutcome::Succeeded(value),
            Err(error) if attempt >= self.config.policy.max_attempts() => {
                AttemptOutcome::Failed(error)
            }
            Err(error) => AttemptOutcome::RetryScheduled {
                next_attempt: attempt + 1,
                delay: self.config.interval_fn.next_interval(attempt),
                error,
            },
        }
    }

    /// Runs `action` until it succeeds or the attempt budget is spent.
    ///
    /// `action` may be called up to `max_attempts` times, so its side effects
    /// must be safe to repeat. Dropping the returned future stops the sequence
    /// at its next suspension point; wrap it in `tokio::time::timeout` to put a
    /// deadline on the whole sequence.
    pub async fn execute<T, E, F, Fut>(&self, mut action: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let mut attempt = 1;

        loop {
            #[cfg(feature = "tracing")]
            trace!(retry = %self.config.name, attempt, "running attempt");

            let result = action().await;
            let delay = match self.step(attempt, result) {
                AttemptOutcome::Succeeded(value) => {
                    self.record_success(attempt);
                    return Ok(value);
                }
                AttemptOutcome::Failed(error) => {
                    self.record_exhausted(attempt);
                    return Err(error);
                }
                AttemptOutcome::RetryScheduled {
                    next_attempt,
                    delay,
                    ..
                } => {
                    self.record_retry(attempt, delay);
                    attempt = next_attempt;
                    delay
                }
            };

            self.config.sleeper.sleep(delay).await;
        }
    }

    fn record_success(&self, attempts: usize) {
        #[cfg(feature = "tracing")]
        trace!(retry = %self.config.name, attempts, "action succeeded");

        #[cfg(feature = "metrics")]
        {
            counter!("retry_calls_total", "retry" => self.config.name.clone(), "result" => "success")
                .increment(1);
            histogram!("retry_attempts", "retry" => self.config.name.clone())
                .record(attempts as f64);
        }

        self.emit(|pattern_name, timestamp| RetryEvent::Success {
            pattern_name,
            timestamp,
            attempts,
        });
    }

    fn record_exhausted(&self, attempts: usize) {
        #[cfg(feature = "tracing")]
        debug!(retry = %self.config.name, attempts, "attempt budget exhausted");

        #[cfg(feature = "metrics")]
        {
            counter!("retry_calls_total", "retry" => self.config.name.clone(), "result" => "exhausted")
                .increment(1);
            histogram!("retry_attempts", "retry" => self.config.name.clone())
                .record(attempts as f64);
        }

        self.emit(|pattern_name, timestamp| RetryEvent::Error {
            pattern_name,
            timestamp,
            attempts,
        });
    }

    fn record_retry(&self, attempt: usize, delay: Duration) {
        #[cfg(feature = "tracing")]
        debug!(retry = %self.config.name, attempt, ?delay, "attempt failed, retry scheduled");

        #[cfg(feature = "metrics")]
        counter!("retry_attempts_total", "retry" => self.config.name.clone()).increment(1);

        self.emit(|pattern_name, timestamp| RetryEvent::Retry {
            pattern_name,
            timestamp,
            attempt,
            delay,
        });
    }

    fn emit(&self, event: impl FnOnce(String, Instant) -> RetryEvent) {
        if self.config.listeners.is_empty() {
            return;
        }
        let event = event(self.config.name.clone(), Instant::now());
        self.config.listeners.emit(&event);
    }
}

impl Default for RetryExecutor {
    /// Three attempts, 1000ms base delay, Tokio timer.
    fn default() -> Self {
        Self::new(RetryPolicy::default())
    }
}

impl fmt::Debug for RetryExecutor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryExecutor")
            .field("name", &self.config.name)
            .field("policy", &self.config.policy)
            .field("listeners", &self.config.listeners.len())
            .finish_non_exhaustive()
    }
}
