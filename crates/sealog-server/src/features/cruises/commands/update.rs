//! Update cruise command
//!
//! After the cruise itself is replaced, `cruise_hidden` and
//! `cruise_access_list` changes are propagated to the lowerings inside the
//! cruise's (updated) window.

use chrono::{DateTime, Utc};
use sealog_common::types::{EntityKind, EntityRecord, Identity};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{
    access::require_role,
    error::AppResult,
    features::{
        cruises::{
            cascade::{propagate, CascadePlan},
            WRITE_ROLE,
        },
        shared::records::{self, RecordChanges},
        FeatureState,
    },
};

/// Request body of `PATCH /cruises/:id`; absent fields are left unchanged
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateCruiseCommand {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cruise_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_ts: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_ts: Option<DateTime<Utc>>,
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

impl From<UpdateCruiseCommand> for RecordChanges {
    fn from(command: UpdateCruiseCommand) -> Self {
        RecordChanges {
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

#[tracing::instrument(skip(state, identity, command))]
pub async fn handle(
    state: &FeatureState,
    identity: &Identity,
    id: &str,
    command: UpdateCruiseCommand,
) -> AppResult<EntityRecord> {
    require_role(identity, &[WRITE_ROLE])?;

    let hidden_requested = command.cruise_hidden.is_some();
    let access_list_requested = command.cruise_access_list.is_some();

    let update = records::update(state, EntityKind::Cruise, identity, id, command.into()).await?;

    let plan = CascadePlan::from_update(&update, hidden_requested, access_list_requested);
    if !plan.is_empty() {
        propagate(state.store.as_ref(), &update.after, &plan).await?;
    }
    Ok(update.after)
}
