use crate::RetryExecutor;
use futures::future::{BoxFuture, Either};
use std::task::{Context, Poll};
use tower::{Service, ServiceExt};

/// A Tower [`Service`] that retries failed requests through a [`RetryExecutor`].
#[derive(Clone, Debug)]
pub struct Retry<S> {
    inner: S,
    executor: RetryExecutor,
}

impl<S> Retry<S> {
    /// Creates a new `Retry` service wrapping the given service.
    pub fn new(inner: S, executor: RetryExecutor) -> Self {
        Self { inner, executor }
    }

    /// Returns a reference to the inner service.
    pub fn get_ref(&self) -> &S {
        &self.inner
    }
}

impl<S, Req> Service<Req> for Retry<S>
where
    S: Service<Req> + Clone + Send + 'static,
    S::Future: Send + 'static,
    S::Response: Send + 'static,
    S::Error: Send + 'static,
    Req: Clone + Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Req) -> Self::Future {
        // Take the service that `poll_ready` reserved and leave a clone behind.
        let clone = self.inner.clone();
        let mut service = std::mem::replace(&mut self.inner, clone);
        let executor = self.executor.clone();

        let mut first = Some(service.call(req.clone()));

        Box::pin(async move {
            executor
                .execute(move || match first.take() {
                    Some(future) => Either::Left(future),
                    // Retries drive a fresh clone to readiness.
                    None => Either::Right(service.clone().oneshot(req.clone())),
                })
                .await
        })
    }
}
