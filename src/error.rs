//! Error types shared across the proxy.
//!
//! Only [`ConfigError`] is fatal. Everything raised while serving a request
//! is recovered into a Caller Envelope before it reaches the client.

use thiserror::Error;

use crate::config::validation::ValidationError;

/// Top-level error returned by the binary.
#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Startup-time configuration failure. The listener is never bound.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("malformed route mapping in {var}: {source}")]
    Routes {
        var: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid proxy target {target:?}: {reason}")]
    InvalidTarget { target: String, reason: String },

    #[error("validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Upstream body could not be decoded as an envelope.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("invalid envelope json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("gzip decompression failed: {0}")]
    Gzip(std::io::Error),

    #[error("failed to read upstream body: {0}")]
    Read(String),
}

/// The backend could not be reached or did not answer in time.
#[derive(Debug, Error)]
pub enum ForwardError {
    #[error("upstream transport error: {0}")]
    Transport(#[from] hyper_util::client::legacy::Error),

    #[error("upstream timed out after {0:?}")]
    Timeout(std::time::Duration),
}
