//! Outbound request rewriting.
//!
//! The inbound scheme, authority and path are replaced wholesale with the
//! route target's. The inbound path is discarded, so template parameters
//! such as `{id}` never reach the backend. The query string is kept.

use std::str::FromStr;

use axum::body::Body;
use axum::http::header::HOST;
use axum::http::uri::{Authority, PathAndQuery, Scheme};
use axum::http::{HeaderValue, Request, Uri, Version};
use url::Url;

use crate::error::ConfigError;

/// Pre-parsed pieces of a target URL.
#[derive(Debug, Clone)]
pub struct Director {
    scheme: Scheme,
    authority: Authority,
    host_header: HeaderValue,
    path: String,
}

impl Director {
    pub fn new(target: &Url) -> Result<Self, ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidTarget {
            target: target.to_string(),
            reason,
        };

        let host = target
            .host_str()
            .ok_or_else(|| invalid("missing host".to_string()))?;
        let authority = match target.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        };

        Ok(Self {
            scheme: Scheme::from_str(target.scheme()).map_err(|e| invalid(e.to_string()))?,
            authority: Authority::from_str(&authority).map_err(|e| invalid(e.to_string()))?,
            host_header: HeaderValue::from_str(&authority).map_err(|e| invalid(e.to_string()))?,
            path: target.path().to_string(),
        })
    }

    /// Rewrite `req` in place so it is addressed to the target.
    pub fn direct(&self, req: &mut Request<Body>) {
        let path_and_query = match req.uri().query() {
            Some(query) => format!("{}?{}", self.path, query),
            None => self.path.clone(),
        };

        let mut parts = req.uri().clone().into_parts();
        parts.scheme = Some(self.scheme.clone());
        parts.authority = Some(self.authority.clone());
        parts.path_and_query = PathAndQuery::from_str(&path_and_query)
            .or_else(|_| PathAndQuery::from_str(&self.path))
            .ok();

        match Uri::from_parts(parts) {
            Ok(uri) => *req.uri_mut() = uri,
            Err(e) => tracing::warn!(error = %e, "Failed to rebuild outbound URI"),
        }

        req.headers_mut().insert(HOST, self.host_header.clone());
        *req.version_mut() = Version::HTTP_11;

        tracing::debug!(host = %self.authority, path = %self.path, "Request directed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(uri: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .header(HOST, "proxy.local:8080")
            .header("x-custom", "kept")
            .body(Body::empty())
            .unwrap()
    }

    fn director(target: &str) -> Director {
        Director::new(&Url::parse(target).unwrap()).unwrap()
    }

    #[test]
    fn test_path_replaced_wholesale() {
        let mut req = request("/users/42");
        director("http://backend:9000/internal/users").direct(&mut req);

        assert_eq!(req.uri().to_string(), "http://backend:9000/internal/users");
        assert_eq!(req.headers()[HOST], "backend:9000");
        assert_eq!(req.headers()["x-custom"], "kept");
        assert_eq!(req.version(), Version::HTTP_11);
    }

    #[test]
    fn test_query_preserved() {
        let mut req = request("/search?q=rust&page=2");
        director("https://api.example.com/v1/search").direct(&mut req);

        assert_eq!(req.uri().to_string(), "https://api.example.com/v1/search?q=rust&page=2");
        assert_eq!(req.headers()[HOST], "api.example.com");
    }

    #[test]
    fn test_target_without_path() {
        let mut req = request("/anything/here");
        director("http://backend:9000").direct(&mut req);
        assert_eq!(req.uri().path(), "/");
    }

    #[test]
    fn test_target_query_ignored() {
        let mut req = request("/x");
        director("http://backend/base?ignored=1").direct(&mut req);
        assert_eq!(req.uri().to_string(), "http://backend/base");
    }
}
