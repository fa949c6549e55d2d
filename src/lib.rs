//! CORS origin-matching middleware and a minimal reverse proxy hosting it.

pub mod config;
pub mod cors;
pub mod http;
pub mod lifecycle;
pub mod observability;

pub use config::{CorsConfig, ProxyConfig};
pub use cors::{CorsLayer, CorsService};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
