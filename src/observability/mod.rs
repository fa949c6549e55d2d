//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! CORS middleware, server, forwarder:
//!     → logging.rs (structured tracing events)
//!     → metrics.rs (origin decision and preflight counters)
//!
//! Consumers:
//!     → stdout (tracing-subscriber fmt layer)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Structured logging via `tracing`, filter from config or `RUST_LOG`
//! - Metrics are cheap (atomic increments) and always recorded; exporting is optional

pub mod logging;
pub mod metrics;
