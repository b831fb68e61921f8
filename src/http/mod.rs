//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (axum router, one route per template)
//!     → request.rs (request ID)
//!     → dispatcher.rs (route table lookup, proxy cache)
//!     → [proxy forwards to backend]
//!     → response.rs (decode upstream envelope, emit caller envelope)
//!     → Send to client
//! ```

pub mod dispatcher;
pub mod envelope;
pub mod request;
pub mod response;
pub mod server;

pub use dispatcher::Dispatcher;
pub use envelope::{CallerData, CallerEnvelope, UpstreamEnvelope, NOT_ALLOWED_MESSAGE};
pub use request::{request_id_middleware, RequestId, RequestIdExt, X_REQUEST_ID};
pub use response::Normalizer;
pub use server::HttpServer;
