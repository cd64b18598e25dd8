use crate::ResilientExecutor;
use futures::future::BoxFuture;
use pricewatch_core::{CallError, ResilienceError};
use std::sync::Arc;
use std::task::{Context, Poll};
use tower::{Layer, Service, ServiceExt};

/// Applies a [`ResilientExecutor`] to every request sent through a service.
///
/// The wrapped service must fail with [`CallError`] so that failures can be
/// classified. Requests are cloned for each attempt.
#[derive(Clone, Debug)]
pub struct ResilientCallLayer {
    executor: ResilientExecutor,
    dependency: Arc<str>,
}

impl ResilientCallLayer {
    /// All calls through the layer are attributed to `dependency`.
    pub fn new(executor: ResilientExecutor, dependency: impl Into<Arc<str>>) -> Self {
        Self {
            executor,
            dependency: dependency.into(),
        }
    }
}

impl<S> Layer<S> for ResilientCallLayer {
    type Service = ResilientCall<S>;

    fn layer(&self, inner: S) -> Self::Service {
        ResilientCall {
            inner,
            executor: self.executor.clone(),
            dependency: Arc::clone(&self.dependency),
        }
    }
}

/// Service produced by [`ResilientCallLayer`].
#[derive(Clone, Debug)]
pub struct ResilientCall<S> {
    inner: S,
    executor: ResilientExecutor,
    dependency: Arc<str>,
}

impl<S, Req> Service<Req> for ResilientCall<S>
where
    S: Service<Req, Error = CallError> + Clone + Send + 'static,
    S::Future: Send + 'static,
    S::Response: Send + 'static,
    Req: Clone + Send + 'static,
{
    type Response = S::Response;
    type Error = ResilienceError;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        // Readiness is awaited per attempt so that a failing readiness check
        // counts against the attempt instead of escaping the retry loop.
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Req) -> Self::Future {
        let inner = self.inner.clone();
        let executor = self.executor.clone();
        let dependency = Arc::clone(&self.dependency);

        Box::pin(async move {
            executor
                .execute(&dependency, move || {
                    let service = inner.clone();
                    let req = req.clone();
                    async move { service.oneshot(req).await }
                })
                .await
        })
    }
}
