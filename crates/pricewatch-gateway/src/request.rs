use pricewatch_cache::CacheKey;
use std::collections::BTreeMap;

/// One inbound call to the gateway.
///
/// ```
/// use pricewatch_gateway::GatewayRequest;
///
/// let request = GatewayRequest::new("list_products", "client-7")
///     .param("store", "42")
///     .param("page", "1");
///
/// assert_eq!(request.cache_key().as_str(), "list_products:page=1&store=42");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayRequest {
    /// Logical operation name; selects the rate limit, TTL and invalidations.
    pub operation: String,
    /// Identity the rate limit is applied to.
    pub client_id: String,
    /// Query filters and pagination.
    pub params: BTreeMap<String, String>,
    /// Overrides the dependency configured for the operation.
    pub dependency: Option<String>,
}

impl GatewayRequest {
    pub fn new(operation: impl Into<String>, client_id: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            client_id: client_id.into(),
            params: BTreeMap::new(),
            dependency: None,
        }
    }

    pub fn param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    pub fn dependency(mut self, dependency: impl Into<String>) -> Self {
        self.dependency = Some(dependency.into());
        self
    }

    /// Normalized cache key for this request.
    pub fn cache_key(&self) -> CacheKey {
        CacheKey::new(&self.operation, &self.params)
    }
}
