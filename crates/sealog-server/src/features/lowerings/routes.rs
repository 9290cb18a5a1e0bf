//! Lowering API routes
//!
//! - `GET /api/v1/lowerings` - List visible lowerings
//! - `POST /api/v1/lowerings` - Create a lowering
//! - `GET /api/v1/lowerings/bycruise/:id` - Lowerings inside a cruise
//! - `GET /api/v1/lowerings/byevent/:id` - Lowering containing an event
//! - `GET /api/v1/lowerings/:id` - Get a single lowering
//! - `PATCH /api/v1/lowerings/:id` - Update a lowering
//! - `DELETE /api/v1/lowerings/:id` - Delete a lowering
//! - `PATCH /api/v1/lowerings/:id/permissions` - Grant/revoke access
//! - `PATCH /api/v1/lowerings/:id/bump` - Confirm a visible lowering still exists
//! - `DELETE /api/v1/lowerings/all` - Delete every lowering (admin only)

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, patch},
    Json, Router,
};
use sealog_common::types::EntityKind;

use super::{
    commands::{CreateLoweringCommand, UpdateLoweringCommand, UpdatePermissionsCommand},
    queries::ListLoweringsQuery,
};
use crate::{
    error::AppResult,
    features::{
        shared::{params::FormatQuery, records},
        FeatureState,
    },
    middleware::Caller,
};

pub fn lowerings_routes() -> Router<FeatureState> {
    Router::new()
        .route("/", get(list_lowerings).post(create_lowering))
        .route("/bycruise/:id", get(get_lowerings_by_cruise))
        .route("/byevent/:id", get(get_lowering_by_event))
        .route(
            "/:id",
            get(get_lowering).patch(update_lowering).delete(delete_lowering),
        )
        .route("/all", delete(delete_all_lowerings))
        .route("/:id/permissions", patch(update_lowering_permissions))
        .route("/:id/bump", patch(bump_lowering))
}

// ============================================================================
// Query Handlers (Read Operations)
// ============================================================================

#[tracing::instrument(skip(state, caller, query))]
async fn list_lowerings(
    State(state): State<FeatureState>,
    caller: Caller,
    query: Result<Query<ListLoweringsQuery>, QueryRejection>,
) -> AppResult<Response> {
    let Query(query) = query?;
    let lowerings = super::queries::list::handle(&state, &caller.0, &query).await?;
    Ok(records::render_many(&state, EntityKind::Lowering, &lowerings, query.format()).await)
}

#[tracing::instrument(skip(state, caller, query))]
async fn get_lowerings_by_cruise(
    State(state): State<FeatureState>,
    caller: Caller,
    Path(id): Path<String>,
    query: Result<Query<ListLoweringsQuery>, QueryRejection>,
) -> AppResult<Response> {
    let Query(query) = query?;
    let lowerings = super::queries::joins::by_cruise(&state, &caller.0, &id, &query).await?;
    Ok(records::render_many(&state, EntityKind::Lowering, &lowerings, query.format()).await)
}

#[tracing::instrument(skip(state, caller, query))]
async fn get_lowering_by_event(
    State(state): State<FeatureState>,
    caller: Caller,
    Path(id): Path<String>,
    query: Result<Query<FormatQuery>, QueryRejection>,
) -> AppResult<Response> {
    let Query(query) = query?;
    let lowering = super::queries::joins::by_event(&state, &caller.0, &id).await?;
    Ok(records::render_one(&state, EntityKind::Lowering, &lowering, query.format()).await)
}

#[tracing::instrument(skip(state, caller, query))]
async fn get_lowering(
    State(state): State<FeatureState>,
    caller: Caller,
    Path(id): Path<String>,
    query: Result<Query<FormatQuery>, QueryRejection>,
) -> AppResult<Response> {
    let Query(query) = query?;
    let lowering = super::queries::get::handle(&state, &caller.0, &id).await?;
    Ok(records::render_one(&state, EntityKind::Lowering, &lowering, query.format()).await)
}

// ============================================================================
// Command Handlers (Write Operations)
// ============================================================================

#[tracing::instrument(skip(state, caller, body))]
async fn create_lowering(
    State(state): State<FeatureState>,
    caller: Caller,
    body: Result<Json<CreateLoweringCommand>, JsonRejection>,
) -> AppResult<Response> {
    let Json(command) = body?;
    let lowering = super::commands::create::handle(&state, &caller.0, command).await?;

    tracing::info!(id = %lowering.id, lowering_id = %lowering.name, "Lowering created via API");

    let body = records::one_json(&state, EntityKind::Lowering, &lowering).await;
    Ok((StatusCode::CREATED, Json(body)).into_response())
}

#[tracing::instrument(skip(state, caller, body))]
async fn update_lowering(
    State(state): State<FeatureState>,
    caller: Caller,
    Path(id): Path<String>,
    body: Result<Json<UpdateLoweringCommand>, JsonRejection>,
) -> AppResult<Response> {
    let Json(command) = body?;
    let lowering = super::commands::update::handle(&state, &caller.0, &id, command).await?;
    Ok(records::one_json(&state, EntityKind::Lowering, &lowering).await.into_response())
}

#[tracing::instrument(skip(state, caller, body))]
async fn update_lowering_permissions(
    State(state): State<FeatureState>,
    caller: Caller,
    Path(id): Path<String>,
    body: Result<Json<UpdatePermissionsCommand>, JsonRejection>,
) -> AppResult<Response> {
    let Json(command) = body?;
    let lowering = super::commands::permissions::handle(&state, &caller.0, &id, command).await?;
    Ok(records::one_json(&state, EntityKind::Lowering, &lowering).await.into_response())
}

#[tracing::instrument(skip(state, caller))]
async fn delete_lowering(
    State(state): State<FeatureState>,
    caller: Caller,
    Path(id): Path<String>,
) -> AppResult<Response> {
    let lowering = super::commands::delete::handle(&state, &caller.0, &id).await?;

    tracing::info!(id = %lowering.id, "Lowering deleted via API");

    Ok(records::one_json(&state, EntityKind::Lowering, &lowering).await.into_response())
}

#[tracing::instrument(skip(state, caller))]
async fn bump_lowering(
    State(state): State<FeatureState>,
    caller: Caller,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    super::commands::bump::handle(&state, &caller.0, &id).await?;
    Ok(StatusCode::OK)
}

#[tracing::instrument(skip(state, caller))]
async fn delete_all_lowerings(State(state): State<FeatureState>, caller: Caller) -> AppResult<StatusCode> {
    let removed = super::commands::delete::handle_all(&state, &caller.0).await?;

    tracing::info!(removed, "All lowerings deleted via API");

    Ok(StatusCode::NO_CONTENT)
}
