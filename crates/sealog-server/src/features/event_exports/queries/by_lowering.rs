//! Events of one lowering

use sealog_common::types::{EntityKind, Event, Identity};

use super::EventExportQuery;
use crate::{
    error::AppResult,
    features::{shared::records, FeatureState},
};

#[tracing::instrument(skip(state, identity, query), fields(lowering = %lowering_id))]
pub async fn handle(
    state: &FeatureState,
    identity: &Identity,
    lowering_id: &str,
    query: &EventExportQuery,
) -> AppResult<Vec<Event>> {
    let lowering = records::get(state, EntityKind::Lowering, identity, lowering_id).await?;
    let event_query = query.validated(&lowering)?;
    Ok(state.store.find_events(&event_query).await?)
}
