//! Cruise lookups by contained lowering or event
//!
//! The cruise returned is the newest visible one whose window covers the
//! lowering's window or the event's timestamp.

use sealog_common::types::{parse_record_id, EntityKind, EntityRecord, Identity};

use crate::{
    access::ensure_visible,
    error::{AppError, AppResult},
    features::{shared::records, FeatureState},
};

#[tracing::instrument(skip(state, identity), fields(lowering = %lowering_id))]
pub async fn by_lowering(
    state: &FeatureState,
    identity: &Identity,
    lowering_id: &str,
) -> AppResult<EntityRecord> {
    let id = parse_record_id(lowering_id)?;
    let lowering = state
        .store
        .get_record(EntityKind::Lowering, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No lowering record found for id: {id}")))?;
    ensure_visible(identity, EntityKind::Lowering, &lowering, state.visibility)?;

    records::find_containing(
        state,
        EntityKind::Cruise,
        identity,
        lowering.start_ts,
        lowering.stop_ts,
    )
    .await
}

#[tracing::instrument(skip(state, identity), fields(event = %event_id))]
pub async fn by_event(
    state: &FeatureState,
    identity: &Identity,
    event_id: &str,
) -> AppResult<EntityRecord> {
    let id = parse_record_id(event_id)?;
    let event = state
        .store
        .get_event(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No event record found for id: {id}")))?;

    records::find_containing(state, EntityKind::Cruise, identity, event.ts, event.ts).await
}
