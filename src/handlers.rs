// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! HTTP handlers and router for the contact intake service.

use crate::config::{Config, CorsConfig};
use crate::gateway::{IntakeGateway, UNKNOWN_CLIENT};
use crate::mailer::DispatchReceipt;
use axum::{
    body::Bytes,
    extract::{ConnectInfo, State},
    http::{header, HeaderMap, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, error, warn};

pub const SUCCESS_MESSAGE: &str = "Email sent successfully!";

/// Shared application state.
pub struct AppState {
    pub gateway: IntakeGateway,
    pub config: Config,
}

/// Successful submission response.
#[derive(Debug, Serialize)]
pub struct SendEmailResponse {
    pub message: &'static str,
    pub data: DispatchReceipt,
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "contact-intake",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Prometheus scrape endpoint.
pub async fn metrics(State(state): State<Arc<AppState>>) -> Response {
    match state.gateway.metrics().render() {
        Ok(text) => (
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

/// Accept a contact form submission.
pub async fn send_email(
    State(state): State<Arc<AppState>>,
    peer: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let client_id = client_identifier(peer.map(|ConnectInfo(addr)| addr), &headers);
    debug!(client = %client_id, body_len = body.len(), "Processing contact submission");

    match state.gateway.submit(&client_id, &body).await {
        Ok(receipt) => (
            StatusCode::OK,
            Json(SendEmailResponse {
                message: SUCCESS_MESSAGE,
                data: receipt,
            }),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

/// Best-effort client identity: peer address, then the first
/// `x-forwarded-for` entry, then [`UNKNOWN_CLIENT`].
pub fn client_identifier(peer: Option<SocketAddr>, headers: &HeaderMap) -> String {
    if let Some(addr) = peer {
        return addr.ip().to_string();
    }

    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map_or_else(|| UNKNOWN_CLIENT.to_string(), str::to_string)
}

fn cors_layer(config: &CorsConfig) -> Option<CorsLayer> {
    if config.allowed_origins.is_empty() {
        return None;
    }

    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|o| match o.trim().parse() {
            Ok(v) => Some(v),
            Err(_) => {
                warn!(origin = %o, "Ignoring unparseable CORS origin");
                None
            }
        })
        .collect();

    Some(
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE]),
    )
}

/// Build the service router.
pub fn router(state: Arc<AppState>) -> Router {
    let mut app = Router::new()
        .route("/health", get(health))
        .route("/healthz", get(health))
        .route("/send-email", post(send_email));

    if state.config.metrics.enabled {
        app = app.route(&state.config.metrics.path, get(metrics));
    }

    let cors = cors_layer(&state.config.cors);
    let app = app.layer(TraceLayer::new_for_http());
    let app = match cors {
        Some(cors) => app.layer(cors),
        None => app,
    };

    app.with_state(state)
}
