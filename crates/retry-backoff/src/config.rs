use crate::backoff::{ExponentialBackoff, FixedInterval, IntervalFunction};
use crate::error::ConfigError;
use crate::events::{Listeners, RetryEvent, RetryListener};
use crate::executor::RetryExecutor;
use crate::policy::{RetryPolicy, DEFAULT_BASE_DELAY, DEFAULT_MAX_ATTEMPTS};
use crate::sleeper::{Sleeper, TokioSleeper};
use std::sync::Arc;
use std::time::Duration;

/// Shared configuration behind a [`RetryExecutor`].
pub(crate) struct RetryConfig {
    pub(crate) policy: RetryPolicy,
    pub(crate) interval_fn: Arc<dyn IntervalFunction>,
    pub(crate) sleeper: Arc<dyn Sleeper>,
    pub(crate) listeners: Listeners,
    pub(crate) name: String,
}

impl RetryConfig {
    /// Doubling backoff from the policy's base delay on the Tokio timer.
    pub(crate) fn new(policy: RetryPolicy) -> Self {
        Self {
            policy,
            interval_fn: Arc::new(ExponentialBackoff::new(policy.base_delay())),
            sleeper: Arc::new(TokioSleeper),
            listeners: Listeners::default(),
            name: DEFAULT_NAME.to_string(),
        }
    }
}

const DEFAULT_NAME: &str = "<unnamed>";

/// Builder for [`RetryExecutor`].
pub struct RetryExecutorBuilder {
    max_attempts: usize,
    base_delay: Duration,
    interval_fn: Option<Arc<dyn IntervalFunction>>,
    sleeper: Arc<dyn Sleeper>,
    listeners: Listeners,
    name: String,
}

impl Default for RetryExecutorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RetryExecutorBuilder {
    /// Creates a new builder with defaults.
    ///
    /// Defaults:
    /// - max_attempts: 3
    /// - base_delay: 1000ms, doubled after every failed attempt
    /// - sleeper: [`TokioSleeper`]
    /// - name: `"<unnamed>"`
    pub fn new() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: DEFAULT_BASE_DELAY,
            interval_fn: None,
            sleeper: Arc::new(TokioSleeper),
            listeners: Listeners::default(),
            name: DEFAULT_NAME.to_string(),
        }
    }

    /// Starts from an already validated policy.
    pub fn policy(mut self, policy: RetryPolicy) -> Self {
        self.max_attempts = policy.max_attempts();
        self.base_delay = policy.base_delay();
        self
    }

    /// Sets the attempt budget.
    ///
    /// This includes the initial attempt, so max_attempts=3 means
    /// 1 initial attempt + 2 retries. Zero is rejected by [`build`](Self::build).
    pub fn max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Sets the delay before the first retry of the default exponential backoff.
    pub fn base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }

    /// Uses doubling backoff from `initial_interval`.
    ///
    /// Same as [`base_delay`](Self::base_delay) but also drops any fixed or
    /// custom interval set earlier. A later `base_delay` call moves the seed.
    pub fn exponential_backoff(mut self, initial_interval: Duration) -> Self {
        self.base_delay = initial_interval;
        self.interval_fn = None;
        self
    }

    /// Waits the same `interval` between every attempt.
    pub fn fixed_backoff(mut self, interval: Duration) -> Self {
        self.interval_fn = Some(Arc::new(FixedInterval::new(interval)));
        self
    }

    /// Sets a custom interval function.
    pub fn backoff<I>(mut self, interval_fn: I) -> Self
    where
        I: IntervalFunction + 'static,
    {
        self.interval_fn = Some(Arc::new(interval_fn));
        self
    }

    /// Replaces the sleeper used between attempts.
    ///
    /// ```
    /// use retry_backoff::{RecordingSleeper, RetryExecutor};
    ///
    /// let sleeper = RecordingSleeper::new();
    /// let executor = RetryExecutor::builder()
    ///     .sleeper(sleeper.clone())
    ///     .build()
    ///     .unwrap();
    /// ```
    pub fn sleeper<S>(mut self, sleeper: S) -> Self
    where
        S: Sleeper + 'static,
    {
        self.sleeper = Arc::new(sleeper);
        self
    }

    /// Sets the name for this executor (used in events, logs and metrics).
    pub fn name<S: Into<String>>(mut self, name: S) -> Self {
        self.name = name.into();
        self
    }

    /// Registers a listener for every [`RetryEvent`].
    pub fn listener<L>(mut self, listener: L) -> Self
    where
        L: RetryListener + 'static,
    {
        self.listeners.add(listener);
        self
    }

    /// Registers a callback run before each inter-attempt wait.
    ///
    /// # Callback Signature
    /// `Fn(usize, Duration)`: the 1-based attempt that just failed and the delay
    /// before the next one.
    pub fn on_retry<F>(mut self, f: F) -> Self
    where
        F: Fn(usize, Duration) + Send + Sync + 'static,
    {
        self.listeners.add(move |event: &RetryEvent| {
            if let RetryEvent::Retry { attempt, delay, .. } = event {
                f(*attempt, *delay);
            }
        });
        self
    }

    /// Registers a callback run when the action succeeds.
    ///
    /// # Callback Signature
    /// `Fn(usize)`: total attempts made, 1 meaning success on the first try.
    pub fn on_success<F>(mut self, f: F) -> Self
    where
        F: Fn(usize) + Send + Sync + 'static,
    {
        self.listeners.add(move |event: &RetryEvent| {
            if let RetryEvent::Success { attempts, .. } = event {
                f(*attempts);
            }
        });
        self
    }

    /// Registers a callback run when the attempt budget is exhausted.
    ///
    /// # Callback Signature
    /// `Fn(usize)`: total attempts made, equal to `max_attempts`.
    pub fn on_error<F>(mut self, f: F) -> Self
    where
        F: Fn(usize) + Send + Sync + 'static,
    {
        self.listeners.add(move |event: &RetryEvent| {
            if let RetryEvent::Error { attempts, .. } = event {
                f(*attempts);
            }
        });
        self
    }

    /// Validates the settings and builds the executor.
    pub fn build(self) -> Result<RetryExecutor, ConfigError> {
        let policy = RetryPolicy::new(self.max_attempts, self.base_delay)?;
        let interval_fn = self
            .interval_fn
            .unwrap_or_else(|| Arc::new(ExponentialBackoff::new(policy.base_delay())));

        Ok(RetryExecutor::from_config(RetryConfig {
            policy,
            interval_fn,
            sleeper: self.sleeper,
            listeners: self.listeners,
            name: self.name,
        }))
    }
}
