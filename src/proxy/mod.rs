//! Upstream forwarding subsystem.
//!
//! # Data Flow
//! ```text
//! RouteTarget matched
//!     → cache.rs (origin → shared ProxyHandle, created on first use)
//!     → director.rs (rewrite scheme, host, path, Host header)
//!     → handle.rs (send through pooled hyper client, bounded by timeout)
//!     → http::response (normalize body into caller envelope)
//! ```

pub mod cache;
pub mod director;
pub mod handle;

pub use cache::ProxyCache;
pub use director::Director;
pub use handle::{build_client, ForwardSettings, HttpClient, ProxyHandle};
