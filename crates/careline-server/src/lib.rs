//! HTTP surface of the careline triage relay.
//!
//! Routes:
//! - `GET /`, `GET /health` — liveness
//! - `POST /api/assistants/run` — one message against an explicit assistant ID
//! - `POST /api/assistants/run-multi` — batch of named messages
//! - `POST /api/assistants/run/{short_name}` — one message against a registered assistant
//!
//! Every failure is answered as `{"ok": false, "error": "..."}`.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod services;
pub mod state;

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderValue, Method, Request, Response};
use axum::routing::{get, post};
use axum::Router;
use careline_config::ServerConfig;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

pub use state::ServerState;

/// Builds the application router with CORS, tracing, and body limit layers.
pub fn router(state: Arc<ServerState>, config: &ServerConfig) -> Router {
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|req: &Request<Body>| {
            tracing::info_span!(
                "request",
                method = %req.method(),
                uri = %req.uri(),
                version = ?req.version(),
            )
        })
        .on_response(|res: &Response<Body>, latency: Duration, _span: &tracing::Span| {
            info!(
                latency = %format!("{} ms", latency.as_millis()),
                status = %res.status().as_u16(),
                "finished processing request"
            );
        });

    Router::new()
        .route("/", get(handlers::health).fallback(handlers::method_not_allowed))
        .route("/health", get(handlers::health).fallback(handlers::method_not_allowed))
        .route(
            "/api/assistants/run",
            post(handlers::run::run).fallback(handlers::method_not_allowed),
        )
        .route(
            "/api/assistants/run-multi",
            post(handlers::batch::run_multi).fallback(handlers::method_not_allowed),
        )
        .route(
            "/api/assistants/run/{short_name}",
            post(handlers::run::run_named).fallback(handlers::method_not_allowed),
        )
        .fallback(handlers::not_found)
        .layer(DefaultBodyLimit::max(config.body_limit))
        .layer(trace_layer)
        .layer(cors_layer(&config.allowed_origins))
        .with_state(state)
}

/// Only listed origins receive CORS headers; requests without `Origin` pass through.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}
