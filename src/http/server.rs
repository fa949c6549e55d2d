//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Compile the CORS middleware (fail-fast on bad origin patterns)
//! - Create Axum Router with the forward handler as fallback
//! - Wire up middleware (tracing, request ID, timeout, CORS)
//! - Forward requests to the upstream service, dropping hop-by-hop headers
//! - Serve until the shutdown signal fires

use std::time::Duration;

use axum::{
    body::Body,
    extract::State,
    http::{uri::PathAndQuery, Request, StatusCode, Uri},
    response::{IntoResponse, Response},
    Router,
};
use hyper::body::Incoming;
use hyper::header::{self, HeaderMap};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::ProxyConfig;
use crate::cors::{CorsError, CorsLayer};
use crate::http::request::{propagate_request_id_layer, request_id, set_request_id_layer};
use crate::observability::metrics;

/// Failure to build the server. The middleware is never installed.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Cors(#[from] CorsError),

    #[error("invalid upstream url {url:?}: {reason}")]
    Upstream { url: String, reason: String },
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub upstream: Uri,
    pub client: Client<HttpConnector, Body>,
}

/// HTTP server hosting the CORS middleware in front of the upstream.
pub struct HttpServer {
    router: Router,
    config: ProxyConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ProxyConfig) -> Result<Self, ServerError> {
        let cors = CorsLayer::new(&config.cors, config.name.clone())?;

        let upstream: Uri = config
            .upstream
            .url
            .parse()
            .map_err(|e: axum::http::uri::InvalidUri| ServerError::Upstream {
                url: config.upstream.url.clone(),
                reason: e.to_string(),
            })?;
        if upstream.authority().is_none() {
            return Err(ServerError::Upstream {
                url: config.upstream.url.clone(),
                reason: "missing host".to_string(),
            });
        }

        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(Duration::from_secs(config.timeouts.connect_secs)));
        let client = Client::builder(TokioExecutor::new())
            .pool_idle_timeout(Duration::from_secs(config.timeouts.idle_secs))
            .build(connector);

        let state = AppState { upstream, client };
        let router = Self::build_router(&config, cors, state);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &ProxyConfig, cors: CorsLayer, state: AppState) -> Router {
        Router::new()
            .fallback(forward_handler)
            .with_state(state)
            .layer(cors)
            .layer(TimeoutLayer::with_status_code(
                StatusCode::REQUEST_TIMEOUT,
                Duration::from_secs(config.timeouts.request_secs),
            ))
            .layer(propagate_request_id_layer())
            .layer(set_request_id_layer())
            .layer(TraceLayer::new_for_http())
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            upstream = %self.config.upstream.url,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }

    /// Consume the server and return its router.
    pub fn into_router(self) -> Router {
        self.router
    }
}

/// Forward the request to the upstream and pass the response through.
async fn forward_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let request_id = request_id(&request).to_string();

    let uri = match upstream_uri(&state.upstream, request.uri()) {
        Some(uri) => uri,
        None => {
            tracing::warn!(request_id = %request_id, uri = %request.uri(), "Cannot build upstream URI");
            return (StatusCode::BAD_REQUEST, "Invalid request URI").into_response();
        }
    };

    tracing::debug!(
        request_id = %request_id,
        method = %request.method(),
        upstream = %uri,
        "Forwarding request"
    );

    let (mut parts, body) = request.into_parts();
    parts.uri = uri;
    strip_hop_by_hop(&mut parts.headers);
    let upstream_req = Request::from_parts(parts, body);

    match state.client.request(upstream_req).await {
        Ok(response) => client_response(response),
        Err(e) => {
            tracing::error!(request_id = %request_id, error = %e, "Upstream error");
            metrics::record_upstream_error();
            (StatusCode::BAD_GATEWAY, "Upstream request failed").into_response()
        }
    }
}

/// Hand the upstream response back to the client with a streaming body.
fn client_response(response: hyper::Response<Incoming>) -> Response {
    let (mut parts, body) = response.into_parts();
    strip_hop_by_hop(&mut parts.headers);
    Response::from_parts(parts, Body::new(body))
}

/// Remove connection-scoped headers, including any named in `Connection`.
fn strip_hop_by_hop(headers: &mut HeaderMap) {
    let named: Vec<String> = headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .map(|name| name.trim().to_ascii_lowercase())
        .filter(|name| !name.is_empty())
        .collect();
    for name in named {
        headers.remove(name.as_str());
    }

    for name in [
        header::CONNECTION,
        header::PROXY_AUTHENTICATE,
        header::PROXY_AUTHORIZATION,
        header::TE,
        header::TRAILER,
        header::TRANSFER_ENCODING,
        header::UPGRADE,
    ] {
        headers.remove(name);
    }
    headers.remove("keep-alive");
    headers.remove("proxy-connection");
}

/// Join the upstream base with the request's path and query.
fn upstream_uri(base: &Uri, original: &Uri) -> Option<Uri> {
    let prefix = base.path().trim_end_matches('/');
    let rest = original
        .path_and_query()
        .map(PathAndQuery::as_str)
        .unwrap_or("/");

    let mut parts = base.clone().into_parts();
    parts.path_and_query = Some(PathAndQuery::try_from(format!("{prefix}{rest}")).ok()?);
    Uri::from_parts(parts).ok()
}
