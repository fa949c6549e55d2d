//! Tower middleware wiring the resolver into responses.
//!
//! Per request:
//! 1. read `Origin` (absent is treated as empty, undecodable never matches)
//! 2. resolve it and, on a match, set `Access-Control-Allow-Origin`
//! 3. set the static CORS headers regardless of the match outcome
//! 4. `OPTIONS` → `200` with an empty body, the inner service is not called
//! 5. anything else → call the inner service
//!
//! Disallowed origins are never rejected here. The allow-origin header is
//! simply left out and the browser blocks the read.
//!
//! On forwarded requests headers the inner service sets itself take
//! precedence over the ones added here.

use std::borrow::Cow;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::http::header::{ACCESS_CONTROL_ALLOW_ORIGIN, ORIGIN};
use axum::http::{HeaderValue, Method, Request, Response, StatusCode};
use futures_util::future::BoxFuture;
use tower::{Layer, Service};

use crate::config::CorsConfig;
use crate::cors::diagnostics::{CorsDiagnostics, TracingDiagnostics};
use crate::cors::error::CorsError;
use crate::cors::headers::StaticCorsHeaders;
use crate::cors::pattern::{self, PatternList};
use crate::cors::resolver::resolve;
use crate::observability::metrics;

/// Outcome of evaluating a request's origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OriginDecision {
    Allowed,
    Blocked,
    NoOrigin,
}

impl OriginDecision {
    pub fn as_str(self) -> &'static str {
        match self {
            OriginDecision::Allowed => "allowed",
            OriginDecision::Blocked => "blocked",
            OriginDecision::NoOrigin => "no_origin",
        }
    }
}

/// Compiled, immutable middleware state shared by every service clone.
struct CorsState {
    name: String,
    patterns: PatternList,
    headers: StaticCorsHeaders,
    diagnostics: Arc<dyn CorsDiagnostics>,
}

/// Result of [`CorsState::evaluate`] for one request.
struct Evaluation<'a> {
    origin: Cow<'a, str>,
    decision: OriginDecision,
    allow_origin: Option<HeaderValue>,
}

impl CorsState {
    /// Evaluate the request origin and return the allow-origin value, if any.
    ///
    /// Header bytes outside ASCII are decoded as UTF-8. A present origin that
    /// is not valid UTF-8 is blocked.
    fn evaluate<'a, B>(&self, req: &'a Request<B>) -> Evaluation<'a> {
        let raw = req
            .headers()
            .get(ORIGIN)
            .map(HeaderValue::as_bytes)
            .unwrap_or_default();
        let origin = String::from_utf8_lossy(raw);

        self.diagnostics
            .request_received(req.method(), req.uri().path(), &origin);

        if raw.is_empty() {
            return Evaluation {
                origin,
                decision: OriginDecision::NoOrigin,
                allow_origin: None,
            };
        }

        let resolution = std::str::from_utf8(raw)
            .ok()
            .and_then(|decoded| resolve(&self.patterns, decoded));

        match resolution {
            Some(resolution) => {
                self.diagnostics
                    .origin_allowed(&origin, resolution.allow_origin);
                // Echoed values are the request's own bytes. An exact pattern
                // that is not a valid header value sends no allow-origin.
                let value = HeaderValue::from_bytes(resolution.allow_origin.as_bytes()).ok();
                Evaluation {
                    origin,
                    decision: OriginDecision::Allowed,
                    allow_origin: value,
                }
            }
            None => {
                self.diagnostics.origin_blocked(&origin);
                Evaluation {
                    origin,
                    decision: OriginDecision::Blocked,
                    allow_origin: None,
                }
            }
        }
    }
}

/// Layer that installs [`CorsService`] in front of an inner service.
#[derive(Clone)]
pub struct CorsLayer {
    state: Arc<CorsState>,
}

impl CorsLayer {
    /// Compile `config` into a layer, reporting through `tracing`.
    ///
    /// Fails on the first origin pattern that does not compile, or if a
    /// static header list cannot be rendered as a header value.
    pub fn new(config: &CorsConfig, name: impl Into<String>) -> Result<Self, CorsError> {
        let name = name.into();
        let diagnostics = Arc::new(TracingDiagnostics::new(name.clone(), config.debug));
        Self::with_diagnostics(config, name, diagnostics)
    }

    /// Compile `config` into a layer using a caller-supplied diagnostics sink.
    pub fn with_diagnostics(
        config: &CorsConfig,
        name: impl Into<String>,
        diagnostics: Arc<dyn CorsDiagnostics>,
    ) -> Result<Self, CorsError> {
        let name = name.into();
        let patterns = pattern::compile(&config.allow_origin_list, diagnostics.as_ref())?;
        let headers = StaticCorsHeaders::from_config(config)?;
        diagnostics.initialized(&patterns);

        Ok(Self {
            state: Arc::new(CorsState {
                name,
                patterns,
                headers,
                diagnostics,
            }),
        })
    }

    pub fn name(&self) -> &str {
        &self.state.name
    }

    pub fn patterns(&self) -> &PatternList {
        &self.state.patterns
    }
}

impl std::fmt::Debug for CorsLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CorsLayer")
            .field("name", &self.state.name)
            .field("patterns", &self.state.patterns.len())
            .finish()
    }
}

impl<S> Layer<S> for CorsLayer {
    type Service = CorsService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        CorsService {
            inner,
            state: self.state.clone(),
        }
    }
}

/// Build a ready-to-install CORS service around `next`.
pub fn new<S>(
    next: S,
    config: &CorsConfig,
    name: impl Into<String>,
) -> Result<CorsService<S>, CorsError> {
    Ok(CorsLayer::new(config, name)?.layer(next))
}

/// CORS middleware service.
#[derive(Clone)]
pub struct CorsService<S> {
    inner: S,
    state: Arc<CorsState>,
}

impl<S> CorsService<S> {
    pub fn get_ref(&self) -> &S {
        &self.inner
    }
}

impl<S, ReqBody, ResBody> Service<Request<ReqBody>> for CorsService<S>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>>,
    S::Future: Send + 'static,
    S::Error: Send + 'static,
    ResBody: Default + Send + 'static,
{
    type Response = Response<ResBody>;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<ReqBody>) -> Self::Future {
        let Evaluation {
            origin,
            decision,
            allow_origin,
        } = self.state.evaluate(&req);
        metrics::record_origin_decision(decision.as_str());

        if req.method() == Method::OPTIONS {
            self.state.diagnostics.preflight(&origin);
            metrics::record_preflight();

            let mut response = Response::new(ResBody::default());
            *response.status_mut() = StatusCode::OK;
            if let Some(value) = allow_origin {
                response
                    .headers_mut()
                    .insert(ACCESS_CONTROL_ALLOW_ORIGIN, value);
            }
            self.state.headers.apply(response.headers_mut());
            return Box::pin(async move { Ok(response) });
        }

        let state = self.state.clone();
        let fut = self.inner.call(req);
        Box::pin(async move {
            let mut response = fut.await?;
            let headers = response.headers_mut();
            if let Some(value) = allow_origin {
                headers.entry(ACCESS_CONTROL_ALLOW_ORIGIN).or_insert(value);
            }
            state.headers.apply_missing(headers);
            Ok(response)
        })
    }
}
