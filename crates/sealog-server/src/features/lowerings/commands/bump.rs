//! Bump lowering command

use sealog_common::types::{EntityKind, EntityRecord, Identity};

use crate::{
    access::require_role,
    error::AppResult,
    features::{lowerings::READ_ROLE, shared::records, FeatureState},
};

#[tracing::instrument(skip(state, identity))]
pub async fn handle(state: &FeatureState, identity: &Identity, id: &str) -> AppResult<EntityRecord> {
    require_role(identity, &[READ_ROLE])?;
    records::bump(state, EntityKind::Lowering, identity, id).await
}
