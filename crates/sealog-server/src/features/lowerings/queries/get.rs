//! Get lowering query

use sealog_common::types::{EntityKind, EntityRecord, Identity};

use crate::{
    error::AppResult,
    features::{shared::records, FeatureState},
};

#[tracing::instrument(skip(state, identity))]
pub async fn handle(state: &FeatureState, identity: &Identity, id: &str) -> AppResult<EntityRecord> {
    records::get(state, EntityKind::Lowering, identity, id).await
}
