//! Lowering permissions command

use sealog_common::types::{EntityKind, EntityRecord, Identity};
use serde::{Deserialize, Serialize};

use crate::{
    access::require_role,
    error::AppResult,
    features::{
        lowerings::WRITE_ROLE,
        shared::records::{self, PermissionsChange},
        FeatureState,
    },
};

/// Request body of `PATCH /lowerings/:id/permissions`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdatePermissionsCommand {
    #[serde(default)]
    pub add: Vec<String>,
    #[serde(default)]
    pub remove: Vec<String>,
}

#[tracing::instrument(skip(state, identity, command))]
pub async fn handle(
    state: &FeatureState,
    identity: &Identity,
    id: &str,
    command: UpdatePermissionsCommand,
) -> AppResult<EntityRecord> {
    require_role(identity, &[WRITE_ROLE])?;
    let change = PermissionsChange {
        add: command.add,
        remove: command.remove,
    };
    records::update_permissions(state, EntityKind::Lowering, identity, id, change).await
}
