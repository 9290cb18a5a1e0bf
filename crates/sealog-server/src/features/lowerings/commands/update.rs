//! Update lowering command

use chrono::{DateTime, Utc};
use sealog_common::types::{EntityKind, EntityRecord, Identity};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{
    access::require_role,
    error::AppResult,
    features::{
        lowerings::WRITE_ROLE,
        shared::records::{self, RecordChanges},
        FeatureState,
    },
};

/// Request body of `PATCH /lowerings/:id`; absent fields are left unchanged
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateLoweringCommand {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lowering_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_ts: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_ts: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lowering_location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lowering_additional_meta: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lowering_tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lowering_access_list: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lowering_hidden: Option<bool>,
}

impl From<UpdateLoweringCommand> for RecordChanges {
    fn from(command: UpdateLoweringCommand) -> Self {
        RecordChanges {
            name: command.lowering_id,
            start_ts: command.start_ts,
            stop_ts: command.stop_ts,
            location: command.lowering_location,
            additional_meta: command.lowering_additional_meta,
            tags: command.lowering_tags,
            access_list: command.lowering_access_list,
            hidden: command.lowering_hidden,
        }
    }
}

#[tracing::instrument(skip(state, identity, command))]
pub async fn handle(
    state: &FeatureState,
    identity: &Identity,
    id: &str,
    command: UpdateLoweringCommand,
) -> AppResult<EntityRecord> {
    require_role(identity, &[WRITE_ROLE])?;
    let update = records::update(state, EntityKind::Lowering, identity, id, command.into()).await?;
    Ok(update.after)
}
