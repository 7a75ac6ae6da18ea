// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! HTTP handlers for the contact relay service.
//!
//! The contact endpoint is a thin shell around [`SubmissionHandler`]: it
//! works out who the client is, hands the raw body to the pipeline and turns
//! the [`HandlerResult`] into a JSON response.

use crate::config::Config;
use crate::metrics::Metrics;
use crate::pipeline::{HandlerResult, SubmissionHandler};
use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, ConnectInfo, DefaultBodyLimit, State},
    http::{header, HeaderMap, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::SecondsFormat;
use serde::Serialize;
use std::any::Any;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, error, warn};

/// Shared application state.
pub struct AppState {
    pub handler: SubmissionHandler,
    pub metrics: Metrics,
    pub config: Config,
}

/// Success response body.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: &'static str,
    #[serde(rename = "retryAfter", skip_serializing_if = "Option::is_none")]
    pub retry_after: Option<u64>,
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

impl IntoResponse for HandlerResult {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.client_message();

        match self {
            HandlerResult::Success => (status, Json(MessageResponse { message })).into_response(),
            HandlerResult::RateLimited {
                retry_after_secs,
                limit,
                remaining,
                reset,
            } => (
                status,
                [
                    ("X-RateLimit-Limit", limit.to_string()),
                    ("X-RateLimit-Remaining", remaining.to_string()),
                    (
                        "X-RateLimit-Reset",
                        reset.to_rfc3339_opts(SecondsFormat::Millis, true),
                    ),
                    ("Retry-After", retry_after_secs.to_string()),
                ],
                Json(ErrorResponse {
                    error: message,
                    retry_after: Some(retry_after_secs),
                }),
            )
                .into_response(),
            _ => (
                status,
                Json(ErrorResponse {
                    error: message,
                    retry_after: None,
                }),
            )
                .into_response(),
        }
    }
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "contact-relay",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Client message for a body over `max_body_bytes`.
pub const BODY_TOO_LARGE: &str = "Request body too large";

/// Accept a contact form submission.
pub async fn contact(
    State(state): State<Arc<AppState>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let identity = client_identity(addr, &headers, state.config.trust_forwarded_for);

    let body = match body {
        Ok(body) => body,
        Err(rejection) if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            warn!(%identity, limit = state.config.max_body_bytes, "Contact body too large");
            state.metrics.record_outcome("too_large");
            return (
                StatusCode::PAYLOAD_TOO_LARGE,
                Json(ErrorResponse {
                    error: BODY_TOO_LARGE,
                    retry_after: None,
                }),
            )
                .into_response();
        }
        Err(rejection) => {
            error!(%identity, error = %rejection.body_text(), "Failed to read contact body");
            let result = HandlerResult::Unexpected;
            state.metrics.record_outcome(result.outcome());
            return result.into_response();
        }
    };
    debug!(%identity, bytes = body.len(), "Processing contact submission");

    let result = state.handler.handle(&body, &identity).await;
    state.metrics.record_outcome(result.outcome());
    result.into_response()
}

/// Prometheus metrics endpoint.
pub async fn metrics(State(state): State<Arc<AppState>>) -> Response {
    match state.metrics.render() {
        Ok(text) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            text,
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "Failed to render metrics");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Build the service router.
pub fn router(state: Arc<AppState>) -> Router {
    let config = &state.config;

    let mut app = Router::new()
        .route("/health", get(health))
        .route("/healthz", get(health))
        .route("/contact", post(contact))
        .route("/api/contact", post(contact));

    if config.metrics.enabled {
        let path = if config.metrics.path.starts_with('/') {
            config.metrics.path.clone()
        } else {
            format!("/{}", config.metrics.path)
        };
        app = app.route(&path, get(metrics));
    }

    let mut app = app
        .layer(DefaultBodyLimit::max(config.max_body_bytes))
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(TraceLayer::new_for_http());

    if let Some(cors) = cors_layer(&config.allowed_origins) {
        app = app.layer(cors);
    }

    app.with_state(state)
}

/// Work out which client a request is from.
///
/// Forwarding headers are only honoured when the service sits behind a
/// proxy that sets them; otherwise any client could pick its own identity.
pub fn client_identity(addr: SocketAddr, headers: &HeaderMap, trust_forwarded_for: bool) -> String {
    if trust_forwarded_for {
        let forwarded = headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .or_else(|| headers.get("x-real-ip").and_then(|v| v.to_str().ok()))
            .and_then(|v| v.trim().parse::<IpAddr>().ok());

        if let Some(ip) = forwarded {
            return ip.to_string();
        }
        debug!(peer = %addr.ip(), "No usable forwarding header, using peer address");
    }
    addr.ip().to_string()
}

fn cors_layer(origins: &[String]) -> Option<CorsLayer> {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match o.parse() {
            Ok(origin) => Some(origin),
            Err(_) => {
                warn!(origin = %o, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    if origins.is_empty() {
        return None;
    }

    Some(
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods([Method::POST, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE]),
    )
}

fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    error!(panic = %detail, "Request handler panicked");

    HandlerResult::Unexpected.into_response()
}
