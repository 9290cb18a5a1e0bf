//! Sealog Server Library
//!
//! HTTP backend of the Sealog field-operations logbook: cruises, lowerings
//! (dives within a cruise) and the events logged during them.
//!
//! # Architecture
//!
//! - [`features`]: vertical slices (`cruises`, `lowerings`, `event_exports`),
//!   each split into commands, queries and routes
//! - [`access`]: the visibility policy deciding which hidden records a
//!   caller may see
//! - [`store`]: the document-store abstraction with memory and PostgreSQL
//!   backends
//! - [`export`]: event flattening and CSV rendering
//! - [`storage`]: per-record attachment directories
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use sealog_server::{
//!     access::VisibilityConfig, config::CorsConfig, features::FeatureState,
//!     storage::AttachmentStore, store::MemoryStore,
//! };
//!
//! # async fn run() -> anyhow::Result<()> {
//! let state = FeatureState {
//!     store: Arc::new(MemoryStore::new()),
//!     attachments: AttachmentStore::new("/tmp/cruises", "/tmp/lowerings"),
//!     visibility: VisibilityConfig::default(),
//! };
//! let cors = CorsConfig { allowed_origins: vec!["*".into()], allow_credentials: false };
//! let app = sealog_server::app(state, &cors);
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:8000").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

#![deny(clippy::unwrap_used, clippy::expect_used)]

pub mod access;
pub mod api;
pub mod config;
pub mod error;
pub mod export;
pub mod features;
pub mod middleware;
pub mod storage;
pub mod store;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use tower_http::compression::CompressionLayer;

pub use error::{AppError, AppResult};

/// The full application: `/health` plus the API under `/api/v1`.
pub fn app(state: features::FeatureState, cors: &config::CorsConfig) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .with_state(state.clone())
        .nest("/api/v1", features::router(state))
        .layer(CompressionLayer::new())
        .layer(middleware::tracing_layer())
        .layer(middleware::cors_layer(cors))
}

async fn health_check(State(state): State<features::FeatureState>) -> Response {
    match state.store.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "status": "healthy",
                "store": "connected"
            })),
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Store health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "unhealthy",
                    "store": "unavailable"
                })),
            )
                .into_response()
        },
    }
}
