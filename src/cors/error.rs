//! Construction-time errors for the CORS middleware.
//!
//! Nothing in here is produced on the request path. Once a `CorsService`
//! exists, matching and header construction cannot fail.

use thiserror::Error;

/// A configured origin pattern could not be compiled into a matcher.
#[derive(Debug, Error)]
#[error("invalid origin pattern {pattern:?}: {source}")]
pub struct PatternCompileError {
    /// The raw pattern exactly as it appeared in configuration.
    pub pattern: String,
    /// The underlying regex syntax error.
    #[source]
    pub source: regex::Error,
}

/// Error returned by the middleware factory.
#[derive(Debug, Error)]
pub enum CorsError {
    /// An origin pattern failed to compile.
    #[error(transparent)]
    Pattern(#[from] PatternCompileError),

    /// A static header list produced a value that is not a legal header value.
    #[error("invalid value for {header}: {value:?}")]
    InvalidHeaderValue {
        header: &'static str,
        value: String,
    },
}
