//! Diagnostic events emitted by the CORS middleware.
//!
//! The middleware never writes to stdout/stderr itself. It holds a
//! [`CorsDiagnostics`] value supplied at construction and reports through
//! it. Implementations must not panic; their output never influences
//! header computation.

use axum::http::Method;

use crate::cors::error::PatternCompileError;
use crate::cors::pattern::{PatternEntry, PatternList};

/// Sink for middleware diagnostics. Every method defaults to a no-op.
pub trait CorsDiagnostics: Send + Sync {
    fn pattern_compiled(&self, _entry: &PatternEntry) {}

    fn pattern_failed(&self, _error: &PatternCompileError) {}

    fn initialized(&self, _patterns: &PatternList) {}

    fn request_received(&self, _method: &Method, _path: &str, _origin: &str) {}

    fn origin_allowed(&self, _origin: &str, _allowed: &str) {}

    fn origin_blocked(&self, _origin: &str) {}

    fn preflight(&self, _origin: &str) {}
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopDiagnostics;

impl CorsDiagnostics for NoopDiagnostics {}

/// Reports through `tracing`.
///
/// Per-pattern and per-request events are debug level and only emitted when
/// `debug` is set. Initialization and compile failures are always reported.
#[derive(Debug, Clone)]
pub struct TracingDiagnostics {
    name: String,
    debug: bool,
}

impl TracingDiagnostics {
    pub fn new(name: impl Into<String>, debug: bool) -> Self {
        Self {
            name: name.into(),
            debug,
        }
    }
}

impl CorsDiagnostics for TracingDiagnostics {
    fn pattern_compiled(&self, entry: &PatternEntry) {
        if self.debug {
            tracing::debug!(
                middleware = %self.name,
                origin = %entry.raw(),
                mode = %entry.mode(),
                regex = %entry.expression(),
                "Origin pattern compiled"
            );
        }
    }

    fn pattern_failed(&self, error: &PatternCompileError) {
        tracing::error!(
            middleware = %self.name,
            origin = %error.pattern,
            error = %error.source,
            "Failed to compile origin pattern"
        );
    }

    fn initialized(&self, patterns: &PatternList) {
        tracing::info!(
            middleware = %self.name,
            compiled = patterns.len(),
            "CORS middleware initialized"
        );
    }

    fn request_received(&self, method: &Method, path: &str, origin: &str) {
        if self.debug {
            tracing::debug!(
                middleware = %self.name,
                method = %method,
                path = %path,
                origin = %origin,
                "Processing request"
            );
        }
    }

    fn origin_allowed(&self, origin: &str, allowed: &str) {
        if self.debug {
            tracing::debug!(middleware = %self.name, origin = %origin, allowed = %allowed, "Origin allowed");
        }
    }

    fn origin_blocked(&self, origin: &str) {
        if self.debug {
            tracing::debug!(middleware = %self.name, origin = %origin, "Origin blocked");
        }
    }

    fn preflight(&self, origin: &str) {
        if self.debug {
            tracing::debug!(middleware = %self.name, origin = %origin, "Handling preflight request");
        }
    }
}
