use crate::{Retry, RetryExecutor};
use tower::Layer;

/// A Tower [`Layer`] that runs every request through a [`RetryExecutor`].
///
/// Each attempt sends a clone of the request to a clone of the inner service,
/// so both must be `Clone`. Errors reach the caller unchanged.
///
/// # Examples
///
/// ```
/// use retry_backoff::{RetryExecutor, RetryLayer};
/// use tower::ServiceBuilder;
/// use std::time::Duration;
///
/// # #[derive(Debug, Clone)]
/// # struct MyError;
/// let executor = RetryExecutor::builder()
///     .max_attempts(5)
///     .exponential_backoff(Duration::from_millis(100))
///     .build()
///     .unwrap();
///
/// let service = ServiceBuilder::new()
///     .layer(RetryLayer::new(executor))
///     .service(tower::service_fn(|req: String| async move {
///         Ok::<_, MyError>(req)
///     }));
/// ```
#[derive(Clone, Debug)]
pub struct RetryLayer {
    executor: RetryExecutor,
}

impl RetryLayer {
    /// Creates a new `RetryLayer` driven by `executor`.
    pub fn new(executor: RetryExecutor) -> Self {
        Self { executor }
    }

    /// The executor applied to each request.
    pub fn executor(&self) -> &RetryExecutor {
        &self.executor
    }
}

impl<S> Layer<S> for RetryLayer {
    type Service = Retry<S>;

    fn layer(&self, service: S) -> Self::Service {
        Retry::new(service, self.executor.clone())
    }
}
