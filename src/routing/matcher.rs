//! Route template matching.
//!
//! # Responsibilities
//! - Report which path template the inbound request matched
//!
//! # Design Decisions
//! - Path matching itself belongs to axum; each route template is
//!   registered on the axum router and the matched template is read back
//!   from the `MatchedPath` request extension
//! - Requests that reached the fallback carry no template

use axum::body::Body;
use axum::extract::MatchedPath;
use axum::http::Request;

/// Trait for resolving the route template of a request.
pub trait TemplateMatcher: Send + Sync + std::fmt::Debug {
    /// Returns the template that matched this request, if any.
    fn matched_template(&self, req: &Request<Body>) -> Option<String>;
}

/// Reads the template axum recorded while routing.
#[derive(Debug, Clone, Copy, Default)]
pub struct MatchedPathMatcher;

impl TemplateMatcher for MatchedPathMatcher {
    fn matched_template(&self, req: &Request<Body>) -> Option<String> {
        req.extensions()
            .get::<MatchedPath>()
            .map(|p| p.as_str().to_string())
    }
}
