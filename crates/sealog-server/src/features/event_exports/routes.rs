//! Event export routes
//!
//! - `GET /api/v1/event_exports/bycruise/:id`
//! - `GET /api/v1/event_exports/bylowering/:id`

use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    response::Response,
    routing::get,
    Router,
};

use super::queries::{render_events, EventExportQuery};
use crate::{error::AppResult, features::FeatureState, middleware::Caller};

pub fn event_exports_routes() -> Router<FeatureState> {
    Router::new()
        .route("/bycruise/:id", get(export_by_cruise))
        .route("/bylowering/:id", get(export_by_lowering))
}

#[tracing::instrument(skip(state, caller, query))]
async fn export_by_cruise(
    State(state): State<FeatureState>,
    caller: Caller,
    Path(id): Path<String>,
    query: Result<Query<EventExportQuery>, QueryRejection>,
) -> AppResult<Response> {
    let Query(query) = query?;
    let events = super::queries::by_cruise::handle(&state, &caller.0, &id, &query).await?;
    tracing::info!(cruise = %id, count = events.len(), "cruise events exported");
    render_events(events, &query)
}

#[tracing::instrument(skip(state, caller, query))]
async fn export_by_lowering(
    State(state): State<FeatureState>,
    caller: Caller,
    Path(id): Path<String>,
    query: Result<Query<EventExportQuery>, QueryRejection>,
) -> AppResult<Response> {
    let Query(query) = query?;
    let events = super::queries::by_lowering::handle(&state, &caller.0, &id, &query).await?;
    tracing::info!(lowering = %id, count = events.len(), "lowering events exported");
    render_events(events, &query)
}
