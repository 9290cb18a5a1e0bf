//! Create lowering command

use chrono::{DateTime, Utc};
use sealog_common::types::{EntityKind, EntityRecord, Identity};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{
    access::require_role,
    error::AppResult,
    features::{
        lowerings::CREATE_ROLE,
        shared::records::{self, RecordDraft},
        FeatureState,
    },
};

/// Request body of `POST /lowerings`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateLoweringCommand {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub lowering_id: String,
    pub start_ts: DateTime<Utc>,
    pub stop_ts: DateTime<Utc>,
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

impl From<CreateLoweringCommand> for RecordDraft {
    fn from(command: CreateLoweringCommand) -> Self {
        RecordDraft {
            id: command.id,
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

#[tracing::instrument(skip(state, identity, command), fields(lowering_id = %command.lowering_id))]
pub async fn handle(
    state: &FeatureState,
    identity: &Identity,
    command: CreateLoweringCommand,
) -> AppResult<EntityRecord> {
    require_role(identity, &[CREATE_ROLE])?;
    records::create(state, EntityKind::Lowering, command.into()).await
}
