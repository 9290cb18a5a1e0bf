//! Middleware for the Sealog server
//!
//! - CORS for browser clients that send the identity headers
//! - Request spans tagged with the forwarded caller id
//! - Caller identity extraction from the authentication proxy headers

use axum::http::{header, HeaderName, HeaderValue, Method, Request};
use std::time::Duration;
use tower_http::{
    classify::{ServerErrorsAsFailures, SharedClassifier},
    cors::{Any, CorsLayer},
    trace::{DefaultOnResponse, MakeSpan, TraceLayer},
};
use tracing::{Level, Span};

use crate::config::CorsConfig;

pub mod identity;

pub use identity::{Caller, USER_ID_HEADER, USER_ROLES_HEADER};

/// Origins to echo back, or `None` when any origin is allowed.
///
/// An empty list or a `*` entry means any origin. Entries that are not valid
/// header values are skipped with a warning.
pub fn allowed_origins(config: &CorsConfig) -> Option<Vec<HeaderValue>> {
    if config.allowed_origins.is_empty() || config.allowed_origins.iter().any(|o| o == "*") {
        return None;
    }

    let origins = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "ignoring invalid CORS origin");
                None
            },
        })
        .collect();
    Some(origins)
}

/// Create CORS layer from configuration
///
/// Browsers may send the identity headers; credentials are only allowed with
/// an explicit origin list.
pub fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers([
            header::ACCEPT,
            header::CONTENT_TYPE,
            HeaderName::from_static(USER_ID_HEADER),
            HeaderName::from_static(USER_ROLES_HEADER),
        ])
        .max_age(Duration::from_secs(3600));

    match allowed_origins(config) {
        None => cors.allow_origin(Any),
        Some(origins) => cors
            .allow_origin(origins)
            .allow_credentials(config.allow_credentials),
    }
}

/// Request span carrying the method, path and forwarded caller id.
#[derive(Debug, Clone, Copy, Default)]
pub struct CallerSpan;

impl<B> MakeSpan<B> for CallerSpan {
    fn make_span(&mut self, request: &Request<B>) -> Span {
        tracing::info_span!(
            "request",
            method = %request.method(),
            path = %request.uri().path(),
            caller = caller_label(request),
        )
    }
}

fn caller_label<B>(request: &Request<B>) -> &str {
    request
        .headers()
        .get(USER_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .filter(|id| !id.trim().is_empty())
        .unwrap_or("anonymous")
}

/// Create tracing/logging layer
pub fn tracing_layer() -> TraceLayer<SharedClassifier<ServerErrorsAsFailures>, CallerSpan> {
    TraceLayer::new_for_http().make_span_with(CallerSpan).on_response(
        DefaultOnResponse::new()
            .level(Level::INFO)
            .latency_unit(tower_http::LatencyUnit::Micros),
    )
}
