//! Path-based reverse proxy that rewrites backend envelopes.
//!
//! Each configured route template maps to one backend URL. Matched requests
//! are forwarded through a per-origin proxy handle, and the backend's
//! `{success, message, data: [string]}` body is rewritten into
//! `{success, message, data: <json>}` before it reaches the caller.

pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod proxy;
pub mod routing;

pub use config::ProxyConfig;
pub use error::{ConfigError, ProxyError};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
