//! Retry async actions with exponential backoff.
//!
//! A [`RetryExecutor`] runs a caller-supplied action, and when it fails,
//! waits and tries again until the action succeeds or the attempt budget is
//! spent. The final failure is handed back exactly as the action returned it.
//!
//! # Features
//!
//! - **Attempt budget**: `max_attempts` (default 3) counts the first attempt
//! - **Backoff**: `base_delay * 2^(attempt - 1)` by default (1000ms, 2000ms,
//!   4000ms, ...), or a fixed interval, or any [`IntervalFunction`]
//! - **Pluggable sleeper**: swap the Tokio timer for [`RecordingSleeper`] or
//!   [`InstantSleeper`] in tests
//! - **Event system**: `on_retry`, `on_success` and `on_error` hooks
//! - **Tower integration**: [`RetryLayer`] retries any cloneable service
//! - **Serde configuration**: [`RetryPolicy`] loads from config files
//!
//! # Examples
//!
//! ```
//! use retry_backoff::RetryExecutor;
//! use std::time::Duration;
//!
//! # #[derive(Debug)]
//! # struct ElementNotFound;
//! # async fn click(_selector: &str) -> Result<(), ElementNotFound> { Ok(()) }
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let executor = RetryExecutor::builder()
//!     .max_attempts(3)
//!     .base_delay(Duration::from_millis(1000))
//!     .name("products-link")
//!     .on_retry(|attempt, delay| {
//!         println!("attempt {} failed, retrying in {:?}", attempt, delay);
//!     })
//!     .build()?;
//!
//! executor.execute(|| click("a[href='/products']")).await.ok();
//! # Ok(())
//! # }
//! ```

mod backoff;
mod config;
mod error;
mod events;
mod executor;
mod layer;
mod policy;
mod service;
mod sleeper;

pub use backoff::{ExponentialBackoff, FixedInterval, FnInterval, IntervalFunction};
pub use config::RetryExecutorBuilder;
pub use error::ConfigError;
pub use events::{RetryEvent, RetryListener};
pub use executor::{AttemptOutcome, RetryExecutor};
pub use layer::RetryLayer;
pub use policy::{RetryPolicy, DEFAULT_BASE_DELAY, DEFAULT_MAX_ATTEMPTS};
pub use service::Retry;
pub use sleeper::{InstantSleeper, RecordingSleeper, Sleeper, TokioSleeper};

use std::future::Future;
use std::time::Duration;

/// Runs `action` once through a default executor built from the arguments.
///
/// The outer `Result` reports an invalid configuration; the inner one is the
/// action's own outcome.
///
/// ```
/// use retry_backoff::retry_with_backoff;
/// use std::time::Duration;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let outcome = retry_with_backoff(1, Duration::from_millis(500), || async {
///     Err::<(), _>("subscribe button missing")
/// })
/// .await;
///
/// assert_eq!(outcome, Ok(Err("subscribe button missing")));
/// # }
/// ```
pub async fn retry_with_backoff<T, E, F, Fut>(
    max_attempts: usize,
    base_delay: Duration,
    action: F,
) -> Result<Result<T, E>, ConfigError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let policy = RetryPolicy::new(max_attempts, base_delay)?;
    Ok(RetryExecutor::new(policy).execute(action).await)
}
