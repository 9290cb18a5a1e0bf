//! Lowering lookups by parent cruise or contained event

use chrono::{DateTime, Utc};
use sealog_common::types::{parse_record_id, EntityKind, EntityRecord, Identity};

use super::list::ListLoweringsQuery;
use crate::{
    error::{AppError, AppResult},
    features::{shared::records, FeatureState},
    store::Filter,
};

/// Lowerings inside a visible cruise.
///
/// `startTS`/`stopTS` narrow the cruise window but never widen it.
#[tracing::instrument(skip(state, identity, query), fields(cruise = %cruise_id))]
pub async fn by_cruise(
    state: &FeatureState,
    identity: &Identity,
    cruise_id: &str,
    query: &ListLoweringsQuery,
) -> AppResult<Vec<EntityRecord>> {
    let cruise = records::get(state, EntityKind::Cruise, identity, cruise_id).await?;
    let (start, stop) = clamp(&cruise, query.start_ts, query.stop_ts);

    let params = query.params_with(Filter::within(start, stop));
    records::list(state, EntityKind::Lowering, identity, params).await
}

fn clamp(
    cruise: &EntityRecord,
    start: Option<DateTime<Utc>>,
    stop: Option<DateTime<Utc>>,
) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = start.map_or(cruise.start_ts, |ts| ts.max(cruise.start_ts));
    let stop = stop.map_or(cruise.stop_ts, |ts| ts.min(cruise.stop_ts));
    (start, stop)
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

    records::find_containing(state, EntityKind::Lowering, identity, event.ts, event.ts).await
}
