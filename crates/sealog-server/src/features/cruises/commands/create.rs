//! Create cruise command

use chrono::{DateTime, Utc};
use sealog_common::types::{EntityKind, EntityRecord, Identity};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{
    access::require_role,
    error::AppResult,
    features::{
        cruises::CREATE_ROLE,
        shared::records::{self, RecordDraft},
        FeatureState,
    },
};

/// Request body of `POST /cruises`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCruiseCommand {
    /// Optional caller-chosen record id (UUID)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub cruise_id: String,
    pub start_ts: DateTime<Utc>,
    pub stop_ts: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cruise_location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cruise_additional_meta: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cruise_tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cruise_access_list: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cruise_hidden: Option<bool>,
}

impl From<CreateCruiseCommand> for RecordDraft {
    fn from(command: CreateCruiseCommand) -> Self {
        RecordDraft {
            id: command.id,
            name: command.cruise_id,
            start_ts: command.start_ts,
            stop_ts: command.stop_ts,
            location: command.cruise_location,
            additional_meta: command.cruise_additional_meta,
            tags: command.cruise_tags,
            access_list: command.cruise_access_list,
            hidden: command.cruise_hidden,
        }
    }
}

#[tracing::instrument(skip(state, identity, command), fields(cruise_id = %command.cruise_id))]
pub async fn handle(
    state: &FeatureState,
    identity: &Identity,
    command: CreateCruiseCommand,
) -> AppResult<EntityRecord> {
    require_role(identity, &[CREATE_ROLE])?;
    records::create(state, EntityKind::Cruise, command.into()).await
}
