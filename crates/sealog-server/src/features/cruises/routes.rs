//! Cruise API routes
//!
//! # Route Structure
//!
//! - `GET /api/v1/cruises` - List visible cruises
//! - `POST /api/v1/cruises` - Create a cruise
//! - `GET /api/v1/cruises/bylowering/:id` - Cruise containing a lowering
//! - `GET /api/v1/cruises/byevent/:id` - Cruise containing an event
//! - `GET /api/v1/cruises/:id` - Get a single cruise
//! - `PATCH /api/v1/cruises/:id` - Update a cruise, cascading visibility
//! - `DELETE /api/v1/cruises/:id` - Delete a cruise
//! - `PATCH /api/v1/cruises/:id/permissions` - Grant/revoke access, cascading
//! - `PATCH /api/v1/cruises/:id/bump` - Confirm a visible cruise still exists
//! - `DELETE /api/v1/cruises/all` - Delete every cruise (admin only)
//!
//! Every read accepts `format=csv`.

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
    commands::{CreateCruiseCommand, UpdateCruiseCommand, UpdatePermissionsCommand},
    queries::ListCruisesQuery,
};
use crate::{
    error::AppResult,
    features::{
        shared::{params::FormatQuery, records},
        FeatureState,
    },
    middleware::Caller,
};

pub fn cruises_routes() -> Router<FeatureState> {
    Router::new()
        .route("/", get(list_cruises).post(create_cruise))
        .route("/bylowering/:id", get(get_cruise_by_lowering))
        .route("/byevent/:id", get(get_cruise_by_event))
        .route(
            "/:id",
            get(get_cruise).patch(update_cruise).delete(delete_cruise),
        )
        .route("/all", delete(delete_all_cruises))
        .route("/:id/permissions", patch(update_cruise_permissions))
        .route("/:id/bump", patch(bump_cruise))
}

// ============================================================================
// Query Handlers (Read Operations)
// ============================================================================

#[tracing::instrument(skip(state, caller, query))]
async fn list_cruises(
    State(state): State<FeatureState>,
    caller: Caller,
    query: Result<Query<ListCruisesQuery>, QueryRejection>,
) -> AppResult<Response> {
    let Query(query) = query?;
    let cruises = super::queries::list::handle(&state, &caller.0, &query).await?;
    Ok(records::render_many(&state, EntityKind::Cruise, &cruises, query.format()).await)
}

#[tracing::instrument(skip(state, caller, query))]
async fn get_cruise(
    State(state): State<FeatureState>,
    caller: Caller,
    Path(id): Path<String>,
    query: Result<Query<FormatQuery>, QueryRejection>,
) -> AppResult<Response> {
    let Query(query) = query?;
    let cruise = super::queries::get::handle(&state, &caller.0, &id).await?;
    Ok(records::render_one(&state, EntityKind::Cruise, &cruise, query.format()).await)
}

#[tracing::instrument(skip(state, caller, query))]
async fn get_cruise_by_lowering(
    State(state): State<FeatureState>,
    caller: Caller,
    Path(id): Path<String>,
    query: Result<Query<FormatQuery>, QueryRejection>,
) -> AppResult<Response> {
    let Query(query) = query?;
    let cruise = super::queries::joins::by_lowering(&state, &caller.0, &id).await?;
    Ok(records::render_one(&state, EntityKind::Cruise, &cruise, query.format()).await)
}

#[tracing::instrument(skip(state, caller, query))]
async fn get_cruise_by_event(
    State(state): State<FeatureState>,
    caller: Caller,
    Path(id): Path<String>,
    query: Result<Query<FormatQuery>, QueryRejection>,
) -> AppResult<Response> {
    let Query(query) = query?;
    let cruise = super::queries::joins::by_event(&state, &caller.0, &id).await?;
    Ok(records::render_one(&state, EntityKind::Cruise, &cruise, query.format()).await)
}

// ============================================================================
// Command Handlers (Write Operations)
// ============================================================================

#[tracing::instrument(skip(state, caller, body))]
async fn create_cruise(
    State(state): State<FeatureState>,
    caller: Caller,
    body: Result<Json<CreateCruiseCommand>, JsonRejection>,
) -> AppResult<Response> {
    let Json(command) = body?;
    let cruise = super::commands::create::handle(&state, &caller.0, command).await?;

    tracing::info!(id = %cruise.id, cruise_id = %cruise.name, "Cruise created via API");

    let body = records::one_json(&state, EntityKind::Cruise, &cruise).await;
    Ok((StatusCode::CREATED, Json(body)).into_response())
}

#[tracing::instrument(skip(state, caller, body))]
async fn update_cruise(
    State(state): State<FeatureState>,
    caller: Caller,
    Path(id): Path<String>,
    body: Result<Json<UpdateCruiseCommand>, JsonRejection>,
) -> AppResult<Response> {
    let Json(command) = body?;
    let cruise = super::commands::update::handle(&state, &caller.0, &id, command).await?;
    Ok(records::one_json(&state, EntityKind::Cruise, &cruise).await.into_response())
}

#[tracing::instrument(skip(state, caller, body))]
async fn update_cruise_permissions(
    State(state): State<FeatureState>,
    caller: Caller,
    Path(id): Path<String>,
    body: Result<Json<UpdatePermissionsCommand>, JsonRejection>,
) -> AppResult<Response> {
    let Json(command) = body?;
    let cruise = super::commands::permissions::handle(&state, &caller.0, &id, command).await?;
    Ok(records::one_json(&state, EntityKind::Cruise, &cruise).await.into_response())
}

#[tracing::instrument(skip(state, caller))]
async fn delete_cruise(
    State(state): State<FeatureState>,
    caller: Caller,
    Path(id): Path<String>,
) -> AppResult<Response> {
    let cruise = super::commands::delete::handle(&state, &caller.0, &id).await?;

    tracing::info!(id = %cruise.id, "Cruise deleted via API");

    Ok(records::one_json(&state, EntityKind::Cruise, &cruise).await.into_response())
}

#[tracing::instrument(skip(state, caller))]
async fn bump_cruise(
    State(state): State<FeatureState>,
    caller: Caller,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    super::commands::bump::handle(&state, &caller.0, &id).await?;
    Ok(StatusCode::OK)
}

#[tracing::instrument(skip(state, caller))]
async fn delete_all_cruises(State(state): State<FeatureState>, caller: Caller) -> AppResult<StatusCode> {
    let removed = super::commands::delete::handle_all(&state, &caller.0).await?;

    tracing::info!(removed, "All cruises deleted via API");

    Ok(StatusCode::NO_CONTENT)
}
