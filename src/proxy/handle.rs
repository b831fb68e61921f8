//! Forwarding handle bound to a single backend origin.

use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use hyper::body::Incoming;
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};

use crate::config::{LimitConfig, TimeoutConfig};
use crate::config::validation::parse_target;
use crate::error::{ConfigError, ForwardError};
use crate::http::envelope::CallerEnvelope;
use crate::http::response::Normalizer;
use crate::proxy::director::Director;
use crate::routing::origin_of;

/// HTTP client shared by every handle.
pub type HttpClient = Client<HttpConnector, Body>;

/// Build the upstream client. Connections are pooled per origin by hyper.
pub fn build_client(timeouts: &TimeoutConfig) -> HttpClient {
    let mut connector = HttpConnector::new();
    connector.set_connect_timeout(Some(Duration::from_secs(timeouts.connect_secs)));
    Client::builder(TokioExecutor::new()).build(connector)
}

/// Per-request forwarding limits.
#[derive(Debug, Clone, Copy)]
pub struct ForwardSettings {
    pub upstream_timeout: Duration,
    pub max_body_bytes: usize,
}

impl ForwardSettings {
    pub fn from_config(timeouts: &TimeoutConfig, limits: &LimitConfig) -> Self {
        Self {
            upstream_timeout: Duration::from_secs(timeouts.upstream_secs),
            max_body_bytes: limits.max_body_bytes,
        }
    }
}

impl Default for ForwardSettings {
    fn default() -> Self {
        Self::from_config(&TimeoutConfig::default(), &LimitConfig::default())
    }
}

/// Forwards requests to one origin and normalizes what comes back.
#[derive(Debug)]
pub struct ProxyHandle {
    origin: String,
    client: HttpClient,
    normalizer: Normalizer,
    upstream_timeout: Duration,
}

impl ProxyHandle {
    /// Create a handle for `origin` (`scheme://host[:port]`).
    pub fn new(
        origin: &str,
        client: HttpClient,
        settings: ForwardSettings,
    ) -> Result<Self, ConfigError> {
        let url = parse_target(origin).map_err(|reason| ConfigError::InvalidTarget {
            target: origin.to_string(),
            reason,
        })?;

        Ok(Self {
            origin: origin_of(&url),
            client,
            normalizer: Normalizer::new(settings.max_body_bytes),
            upstream_timeout: settings.upstream_timeout,
        })
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Direct, send, and normalize. Transport failures become envelopes.
    pub async fn forward(&self, mut req: Request<Body>, director: &Director) -> Response<Body> {
        director.direct(&mut req);

        match self.round_trip(req).await {
            Ok(response) => self.normalizer.normalize_response(response).await,
            Err(e) => {
                tracing::error!(origin = %self.origin, error = %e, "Upstream error");
                match e {
                    ForwardError::Timeout(_) => CallerEnvelope::failure("Upstream request timed out")
                        .into_response_with(StatusCode::GATEWAY_TIMEOUT),
                    ForwardError::Transport(_) => CallerEnvelope::failure("Upstream request failed")
                        .into_response_with(StatusCode::BAD_GATEWAY),
                }
            }
        }
    }

    async fn round_trip(&self, req: Request<Body>) -> Result<Response<Incoming>, ForwardError> {
        tokio::time::timeout(self.upstream_timeout, self.client.request(req))
            .await
            .map_err(|_| ForwardError::Timeout(self.upstream_timeout))?
            .map_err(ForwardError::from)
    }
}
