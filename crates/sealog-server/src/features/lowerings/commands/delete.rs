//! Delete lowering command

use sealog_common::types::{EntityKind, EntityRecord, Identity};

use crate::{
    access::require_role,
    error::AppResult,
    features::{lowerings::CREATE_ROLE, shared::records, FeatureState},
};

#[tracing::instrument(skip(state, identity))]
pub async fn handle(state: &FeatureState, identity: &Identity, id: &str) -> AppResult<EntityRecord> {
    require_role(identity, &[CREATE_ROLE])?;
    records::delete(state, EntityKind::Lowering, identity, id).await
}

/// Admin only. Returns the number of deleted records.
#[tracing::instrument(skip(state, identity))]
pub async fn handle_all(state: &FeatureState, identity: &Identity) -> AppResult<u64> {
    require_role(identity, &[])?;
    records::delete_all(state, EntityKind::Lowering).await
}
