//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.
//! The `[cors]` table uses the camelCase keys of the middleware's plugin
//! configuration; every other table is snake_case.

use serde::{Deserialize, Serialize};

/// Root configuration for the CORS proxy.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProxyConfig {
    /// Instance name reported in diagnostics.
    pub name: String,

    /// Listener configuration.
    pub listener: ListenerConfig,

    /// Service every request is forwarded to.
    pub upstream: UpstreamConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// CORS middleware settings.
    pub cors: CorsConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            name: "cors-regex".to_string(),
            listener: ListenerConfig::default(),
            upstream: UpstreamConfig::default(),
            timeouts: TimeoutConfig::default(),
            cors: CorsConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Upstream (delegate) service.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Base URL, e.g. "http://127.0.0.1:3000".
    pub url: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:3000".to_string(),
        }
    }
}

/// Timeout configuration for various operations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Upstream connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,

    /// Idle pooled upstream connection timeout in seconds.
    pub idle_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 5,
            request_secs: 30,
            idle_secs: 60,
        }
    }
}

/// CORS middleware configuration.
///
/// Empty lists, `false` and a zero `max_age` omit the matching response
/// header rather than sending an empty one.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CorsConfig {
    /// Origin patterns: exact strings, `*` wildcards or regular expressions.
    /// Order matters, the first match wins.
    pub allow_origin_list: Vec<String>,

    /// Joined into `Access-Control-Allow-Methods`.
    pub allow_methods: Vec<String>,

    /// Joined into `Access-Control-Allow-Headers`.
    pub allow_headers: Vec<String>,

    /// Joined into `Access-Control-Expose-Headers`.
    pub expose_headers: Vec<String>,

    /// Emit `Access-Control-Allow-Credentials: true`.
    pub allow_credentials: bool,

    /// `Access-Control-Max-Age` in seconds, omitted when 0.
    pub max_age: u32,

    /// Enable per-pattern and per-request debug events.
    pub debug: bool,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allow_origin_list: Vec::new(),
            allow_methods: ["GET", "POST", "PUT", "DELETE", "OPTIONS"]
                .map(String::from)
                .to_vec(),
            allow_headers: ["Origin", "Content-Type", "Accept", "Authorization"]
                .map(String::from)
                .to_vec(),
            expose_headers: Vec::new(),
            allow_credentials: false,
            max_age: 86400,
            debug: false,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
