//! Events of one cruise
//!
//! Lowerings the caller cannot see also hide the events inside them. An
//! event is dropped when an invisible lowering contains it and no visible
//! lowering does. Lowerings that straddle either end of the cruise count.

use chrono::{DateTime, Utc};
use sealog_common::types::{EntityKind, EntityRecord, Event, Identity};

use super::EventExportQuery;
use crate::{
    access::is_visible,
    error::AppResult,
    features::{shared::records, FeatureState},
    store::{Filter, FindOptions},
};

#[tracing::instrument(skip(state, identity, query), fields(cruise = %cruise_id))]
pub async fn handle(
    state: &FeatureState,
    identity: &Identity,
    cruise_id: &str,
    query: &EventExportQuery,
) -> AppResult<Vec<Event>> {
    let cruise = records::get(state, EntityKind::Cruise, identity, cruise_id).await?;
    let mut event_query = query.validated(&cruise)?;

    let lowerings = state
        .store
        .find_records(
            EntityKind::Lowering,
            &FindOptions::filter(Filter::overlapping(cruise.start_ts, cruise.stop_ts)),
        )
        .await?;
    let (visible, hidden): (Vec<EntityRecord>, Vec<EntityRecord>) = lowerings
        .into_iter()
        .partition(|lowering| is_visible(identity, lowering, state.visibility));

    if hidden.is_empty() {
        return Ok(state.store.find_events(&event_query).await?);
    }

    // Page after dropping so offset/limit count only exported events.
    let offset = std::mem::take(&mut event_query.offset);
    let limit = event_query.limit.take();

    let events = state.store.find_events(&event_query).await?;
    let before = events.len();
    let kept: Vec<Event> = events
        .into_iter()
        .filter(|event| !concealed(event.ts, &visible, &hidden))
        .collect();
    tracing::debug!(dropped = before - kept.len(), "events inside hidden lowerings dropped");

    Ok(kept
        .into_iter()
        .skip(offset)
        .take(limit.unwrap_or(usize::MAX))
        .collect())
}

fn concealed(ts: DateTime<Utc>, visible: &[EntityRecord], hidden: &[EntityRecord]) -> bool {
    hidden.iter().any(|lowering| lowering.contains_ts(ts))
        && !visible.iter().any(|lowering| lowering.contains_ts(ts))
}
