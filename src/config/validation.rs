//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Every route template is an absolute path
//! - Every target is an absolute http(s) URL with a host
//! - Value ranges (timeouts > 0, addresses parse)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::fmt;
use std::net::SocketAddr;

use url::Url;

use crate::config::schema::ProxyConfig;

/// A single semantic problem found in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    NoRoutes,
    InvalidTemplate(String),
    UnroutableTemplate { template: String, reason: String },
    InvalidTarget { template: String, reason: String },
    InvalidAddress { field: &'static str, value: String },
    ZeroTimeout(&'static str),
    ZeroBodyLimit,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::NoRoutes => write!(f, "no routes configured"),
            ValidationError::InvalidTemplate(t) => {
                write!(f, "route template {:?} must start with '/' and use {{param}} segments", t)
            }
            ValidationError::UnroutableTemplate { template, reason } => {
                write!(f, "route template {:?} cannot be registered: {}", template, reason)
            }
            ValidationError::InvalidTarget { template, reason } => {
                write!(f, "route {:?}: {}", template, reason)
            }
            ValidationError::InvalidAddress { field, value } => {
                write!(f, "{} {:?} is not a socket address", field, value)
            }
            ValidationError::ZeroTimeout(field) => write!(f, "timeouts.{} must be > 0", field),
            ValidationError::ZeroBodyLimit => write!(f, "limits.max_body_bytes must be > 0"),
        }
    }
}

/// Parse a route target, requiring an absolute http(s) URL with a host.
pub fn parse_target(raw: &str) -> Result<Url, String> {
    let url = Url::parse(raw).map_err(|e| e.to_string())?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(format!("unsupported scheme {:?}", url.scheme()));
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err("missing host".to_string());
    }
    Ok(url)
}

/// Templates are absolute paths with `{param}` / `{*rest}` captures.
/// Colon-style `/:id` segments are rejected up front; the router would
/// refuse them at registration time.
fn is_valid_template(template: &str) -> bool {
    template.starts_with('/')
        && template
            .split('/')
            .all(|segment| !segment.starts_with(':') && !segment.starts_with('*'))
}

/// Validate a loaded configuration.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.routes.is_empty() {
        errors.push(ValidationError::NoRoutes);
    }

    // Same matcher the axum router uses; it rejects overlapping captures
    // and malformed segments that would otherwise panic at registration.
    let mut matcher = matchit::Router::new();
    for (template, target) in &config.routes {
        if !is_valid_template(template) {
            errors.push(ValidationError::InvalidTemplate(template.clone()));
        } else if let Err(e) = matcher.insert(template.as_str(), ()) {
            errors.push(ValidationError::UnroutableTemplate {
                template: template.clone(),
                reason: e.to_string(),
            });
        }
        if let Err(reason) = parse_target(target) {
            errors.push(ValidationError::InvalidTarget {
                template: template.clone(),
                reason,
            });
        }
    }

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "listener.bind_address",
            value: config.listener.bind_address.clone(),
        });
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }

    if config.timeouts.connect_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("connect_secs"));
    }
    if config.timeouts.upstream_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("upstream_secs"));
    }
    if config.limits.max_body_bytes == 0 {
        errors.push(ValidationError::ZeroBodyLimit);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
