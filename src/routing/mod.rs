//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request
//!     → axum router (template match, records MatchedPath)
//!     → matcher.rs (read matched template)
//!     → router.rs (template → RouteTarget lookup)
//!     → Return: RouteTarget or None
//!
//! Route Compilation (at startup):
//!     ProxyConfig.routes
//!     → parse target URLs
//!     → Freeze as immutable RouteTable
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - Deterministic: same template always maps to same target

pub mod matcher;
pub mod router;

pub use matcher::{MatchedPathMatcher, TemplateMatcher};
pub use router::{origin_of, RouteTable, RouteTarget};
