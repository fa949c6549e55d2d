//! CORS origin-matching middleware.
//!
//! # Data Flow
//! ```text
//! CorsConfig (allowOriginList + static header lists)
//!     → pattern.rs (classify + compile, once, fail-fast)
//!     → headers.rs (render static header values, once)
//!     → layer.rs (per request)
//!         → resolver.rs (first matching pattern → allow-origin value)
//!         → set headers
//!         → OPTIONS: 200, stop │ otherwise: inner service
//! ```
//!
//! # Design Decisions
//! - Compiled state is immutable and shared via `Arc`; no locks on the request path
//! - Wildcard and regex matches echo the request origin, never the pattern
//! - Disallowed origins are not rejected, only denied the allow-origin header
//! - Every `OPTIONS` request is answered here as a preflight
//! - No result caching; each request is resolved from scratch

pub mod diagnostics;
pub mod error;
pub mod headers;
pub mod layer;
pub mod pattern;
pub mod resolver;

pub use diagnostics::{CorsDiagnostics, NoopDiagnostics, TracingDiagnostics};
pub use error::{CorsError, PatternCompileError};
pub use headers::StaticCorsHeaders;
pub use layer::{new, CorsLayer, CorsService, OriginDecision};
pub use pattern::{compile, PatternEntry, PatternList, PatternMode};
pub use resolver::{allowed_origin, resolve, Resolution};
