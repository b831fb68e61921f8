//! Top-level request dispatch.
//!
//! Resolves the matched template against the route table, then hands the
//! request to the origin's cached proxy handle. Unrouted requests get the
//! fixed "not allowed" envelope and never touch a backend.

use std::sync::Arc;
use std::time::Instant;

use axum::body::Body;
use axum::http::{Request, Response, StatusCode};

use crate::http::envelope::CallerEnvelope;
use crate::observability::metrics;
use crate::proxy::ProxyCache;
use crate::routing::RouteTable;

/// Status for requests with no configured route.
pub const NOT_ALLOWED_STATUS: StatusCode = StatusCode::NOT_FOUND;

#[derive(Debug, Clone)]
pub struct Dispatcher {
    routes: Arc<RouteTable>,
    cache: Arc<ProxyCache>,
}

impl Dispatcher {
    pub fn new(routes: Arc<RouteTable>, cache: Arc<ProxyCache>) -> Self {
        Self { routes, cache }
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    pub fn cache(&self) -> &Arc<ProxyCache> {
        &self.cache
    }

    /// Handle one request given the template the router matched.
    pub async fn handle(&self, template: Option<&str>, request: Request<Body>) -> Response<Body> {
        let start_time = Instant::now();
        let method = request.method().to_string();
        let path = request.uri().path().to_string();

        tracing::debug!(method = %method, path = %path, template = ?template, "Dispatching request");

        let Some(target) = template.and_then(|t| self.routes.lookup(t)) else {
            tracing::warn!(method = %method, path = %path, "No route matched");
            metrics::record_request(&method, NOT_ALLOWED_STATUS.as_u16(), "none", start_time);
            return not_allowed();
        };

        let proxy = match self.cache.get_or_create(target.origin()) {
            Ok(proxy) => proxy,
            Err(e) => {
                tracing::error!(origin = %target.origin(), error = %e, "Failed to create proxy handle");
                metrics::record_request(&method, 502, target.origin(), start_time);
                return CallerEnvelope::failure("Upstream request failed")
                    .into_response_with(StatusCode::BAD_GATEWAY);
            }
        };

        let response = proxy.forward(request, target.director()).await;

        tracing::info!(
            method = %method,
            path = %path,
            template = %target.template(),
            origin = %proxy.origin(),
            status = %response.status(),
            "Request proxied"
        );
        metrics::record_request(&method, response.status().as_u16(), target.origin(), start_time);
        response
    }
}

/// Fixed answer for unrouted requests.
pub fn not_allowed() -> Response<Body> {
    CallerEnvelope::not_allowed().into_response_with(NOT_ALLOWED_STATUS)
}
