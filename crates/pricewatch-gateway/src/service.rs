//! Tower integration: a gateway in front of a record-store service.

use crate::gateway::ResilienceGateway;
use crate::record::{RecordPage, RecordQuery};
use crate::request::GatewayRequest;
use futures::future::BoxFuture;
use pricewatch_core::{CallError, ResilienceError};
use std::task::{Context, Poll};
use tower::{Layer, Service, ServiceExt};

/// Puts a [`ResilienceGateway`] in front of a record-store service.
///
/// ```
/// use pricewatch_core::CallError;
/// use pricewatch_gateway::{
///     GatewayLayer, GatewayRequest, OperationProfile, RecordPage, RecordQuery, ResilienceGateway,
/// };
/// use std::time::Duration;
/// use tower::{service_fn, ServiceBuilder, ServiceExt};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let gateway = ResilienceGateway::builder()
///     .operation("list_products", OperationProfile::read(100, Duration::from_secs(60)))
///     .build();
///
/// let record_store = service_fn(|_query: RecordQuery| async {
///     Ok::<_, CallError>(RecordPage::new(Vec::new(), 0))
/// });
///
/// let service = ServiceBuilder::new()
///     .layer(GatewayLayer::new(gateway))
///     .service(record_store);
///
/// let page = service
///     .oneshot(GatewayRequest::new("list_products", "client-1"))
///     .await
///     .unwrap();
/// assert_eq!(page.total, 0);
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct GatewayLayer {
    gateway: ResilienceGateway<RecordPage>,
}

impl GatewayLayer {
    pub fn new(gateway: ResilienceGateway<RecordPage>) -> Self {
        Self { gateway }
    }
}

impl<S> Layer<S> for GatewayLayer {
    type Service = GatewayService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        GatewayService {
            inner,
            gateway: self.gateway.clone(),
        }
    }
}

/// Service produced by [`GatewayLayer`].
#[derive(Clone, Debug)]
pub struct GatewayService<S> {
    inner: S,
    gateway: ResilienceGateway<RecordPage>,
}

impl<S> GatewayService<S> {
    pub fn gateway(&self) -> &ResilienceGateway<RecordPage> {
        &self.gateway
    }
}

impl<S> Service<GatewayRequest> for GatewayService<S>
where
    S: Service<RecordQuery, Response = RecordPage, Error = CallError> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = RecordPage;
    type Error = ResilienceError;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        // The record store's readiness is awaited inside each attempt.
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: GatewayRequest) -> Self::Future {
        let inner = self.inner.clone();
        let gateway = self.gateway.clone();

        Box::pin(async move {
            let query = RecordQuery::from(&request);
            gateway
                .call(&request, move || {
                    let service = inner.clone();
                    let query = query.clone();
                    async move { service.oneshot(query).await }
                })
                .await
        })
    }
}
