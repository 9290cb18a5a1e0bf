//! Cruise permissions command
//!
//! Grants and revokes access-list members on a cruise and on every lowering
//! inside its window.

use sealog_common::types::{EntityKind, EntityRecord, Identity};
use serde::{Deserialize, Serialize};

use crate::{
    access::require_role,
    error::AppResult,
    features::{
        cruises::{
            cascade::{propagate, CascadePlan},
            WRITE_ROLE,
        },
        shared::records::{self, PermissionsChange},
        FeatureState,
    },
};

/// Request body of `PATCH /cruises/:id/permissions`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdatePermissionsCommand {
    #[serde(default)]
    pub add: Vec<String>,
    #[serde(default)]
    pub remove: Vec<String>,
}

impl From<UpdatePermissionsCommand> for PermissionsChange {
    fn from(command: UpdatePermissionsCommand) -> Self {
        PermissionsChange {
            add: command.add,
            remove: command.remove,
        }
    }
}

#[tracing::instrument(skip(state, identity, command))]
pub async fn handle(
    state: &FeatureState,
    identity: &Identity,
    id: &str,
    command: UpdatePermissionsCommand,
) -> AppResult<EntityRecord> {
    require_role(identity, &[WRITE_ROLE])?;

    let plan = CascadePlan::from_permissions(command.add.clone(), command.remove.clone());
    let cruise =
        records::update_permissions(state, EntityKind::Cruise, identity, id, command.into()).await?;

    propagate(state.store.as_ref(), &cruise, &plan).await?;
    Ok(cruise)
}
