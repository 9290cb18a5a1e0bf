//! Record service shared by cruises and lowerings
//!
//! Cruises and lowerings differ only in their wire prefix and in what
//! happens after a write (cruise writes cascade to lowerings). Everything
//! else lives here, parametrized by [`EntityKind`]: listing, single reads,
//! containment joins, create/update/delete and rendering.

use axum::response::{IntoResponse, Response};
use chrono::{DateTime, Utc};
use sealog_common::types::{parse_record_id, EntityKind, EntityRecord, Identity};
use serde_json::{json, Map, Value};
use tracing::{error, info, warn};
use uuid::Uuid;

use super::validation::{validate_members, validate_name, validate_window, RecordValidationError};
use crate::{
    access::{build_filter, ensure_visible, visibility_filter, RequestOptions},
    api::{csv_response, ApiResponse, ResponseFormat},
    error::{AppError, AppResult},
    export::records_to_csv,
    features::FeatureState,
    store::{AccessPatch, Filter, FindOptions},
};

/// A resolved listing request
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListParams {
    pub include_hidden: bool,
    /// Caller-supplied field and time selectors
    pub selector: Filter,
    pub offset: usize,
    pub limit: Option<usize>,
}

/// Visible records of `kind` matching `params`; an empty result is NotFound.
pub async fn list(
    state: &FeatureState,
    kind: EntityKind,
    identity: &Identity,
    params: ListParams,
) -> AppResult<Vec<EntityRecord>> {
    let visibility = build_filter(
        identity,
        kind,
        state.visibility,
        RequestOptions {
            include_hidden: params.include_hidden,
        },
    )?;

    let options = FindOptions {
        filter: visibility.and(params.selector),
        offset: params.offset,
        limit: params.limit,
    };
    let records = state.store.find_records(kind, &options).await?;
    if records.is_empty() {
        return Err(AppError::no_records());
    }
    Ok(records)
}

/// Fetch without a visibility check.
pub async fn fetch(state: &FeatureState, kind: EntityKind, id: Uuid) -> AppResult<EntityRecord> {
    state
        .store
        .get_record(kind, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No record found for id: {id}")))
}

/// Single read by raw id, checked against the caller's visibility.
pub async fn get(
    state: &FeatureState,
    kind: EntityKind,
    identity: &Identity,
    raw_id: &str,
) -> AppResult<EntityRecord> {
    let id = parse_record_id(raw_id)?;
    let record = fetch(state, kind, id).await?;
    ensure_visible(identity, kind, &record, state.visibility)?;
    Ok(record)
}

/// The newest visible record of `kind` whose window contains `[start, stop]`.
///
/// The query is narrowed by the visibility filter and the hit is re-checked
/// with the same rule.
pub async fn find_containing(
    state: &FeatureState,
    kind: EntityKind,
    identity: &Identity,
    start: DateTime<Utc>,
    stop: DateTime<Utc>,
) -> AppResult<EntityRecord> {
    let filter = visibility_filter(identity, state.visibility).and(Filter::containing(start, stop));
    let record = state
        .store
        .find_records(kind, &FindOptions::first(filter))
        .await?
        .into_iter()
        .next()
        .ok_or_else(AppError::no_records)?;
    ensure_visible(identity, kind, &record, state.visibility)?;
    Ok(record)
}

/// Fields of a record about to be created
#[derive(Debug, Clone, PartialEq)]
pub struct RecordDraft {
    pub id: Option<String>,
    pub name: String,
    pub start_ts: DateTime<Utc>,
    pub stop_ts: DateTime<Utc>,
    pub location: Option<String>,
    pub additional_meta: Option<Map<String, Value>>,
    pub tags: Option<Vec<String>>,
    pub access_list: Option<Vec<String>>,
    pub hidden: Option<bool>,
}

pub async fn create(
    state: &FeatureState,
    kind: EntityKind,
    draft: RecordDraft,
) -> AppResult<EntityRecord> {
    validate_name(kind, &draft.name)?;
    validate_window(draft.start_ts, draft.stop_ts)?;

    let id = match draft.id.as_deref() {
        Some(raw) => parse_record_id(raw)?,
        None => Uuid::new_v4(),
    };
    let access_list = checked_access_list(state, kind, draft.access_list).await?;

    let record = EntityRecord {
        id,
        name: draft.name,
        start_ts: draft.start_ts,
        stop_ts: draft.stop_ts,
        location: draft.location.unwrap_or_default(),
        additional_meta: strip_files(kind, draft.additional_meta.unwrap_or_default()),
        tags: draft.tags.unwrap_or_default(),
        hidden: draft.hidden.unwrap_or(false),
        access_list: access_list.unwrap_or_default(),
    };

    state.store.insert_record(kind, &record).await?;
    if let Err(e) = state.attachments.create(kind, id).await {
        warn!(%kind, %id, error = %e, "failed to create attachment directory");
    }

    info!(%kind, %id, name = %record.name, "record created");
    Ok(record)
}

/// Partial update; `None` leaves a field untouched
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordChanges {
    pub name: Option<String>,
    pub start_ts: Option<DateTime<Utc>>,
    pub stop_ts: Option<DateTime<Utc>>,
    pub location: Option<String>,
    pub additional_meta: Option<Map<String, Value>>,
    pub tags: Option<Vec<String>>,
    pub access_list: Option<Vec<String>>,
    pub hidden: Option<bool>,
}

impl RecordChanges {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    fn apply(self, kind: EntityKind, record: &mut EntityRecord) {
        if let Some(name) = self.name {
            record.name = name;
        }
        if let Some(start_ts) = self.start_ts {
            record.start_ts = start_ts;
        }
        if let Some(stop_ts) = self.stop_ts {
            record.stop_ts = stop_ts;
        }
        if let Some(location) = self.location {
            record.location = location;
        }
        if let Some(meta) = self.additional_meta {
            record.additional_meta = strip_files(kind, meta);
        }
        if let Some(tags) = self.tags {
            record.tags = tags;
        }
        if let Some(access_list) = self.access_list {
            record.access_list = access_list;
        }
        if let Some(hidden) = self.hidden {
            record.hidden = hidden;
        }
    }
}

/// Record state on both sides of an update
#[derive(Debug, Clone, PartialEq)]
pub struct RecordUpdate {
    pub before: EntityRecord,
    pub after: EntityRecord,
}

pub async fn update(
    state: &FeatureState,
    kind: EntityKind,
    identity: &Identity,
    raw_id: &str,
    mut changes: RecordChanges,
) -> AppResult<RecordUpdate> {
    if changes.is_empty() {
        return Err(RecordValidationError::NothingToUpdate.into());
    }
    let before = get(state, kind, identity, raw_id).await?;

    if let Some(ref name) = changes.name {
        validate_name(kind, name)?;
    }
    validate_window(
        changes.start_ts.unwrap_or(before.start_ts),
        changes.stop_ts.unwrap_or(before.stop_ts),
    )?;
    changes.access_list = checked_access_list(state, kind, changes.access_list.take()).await?;

    let mut after = before.clone();
    changes.apply(kind, &mut after);

    if !state.store.replace_record(kind, &after).await? {
        return Err(AppError::NotFound(format!(
            "No record found for id: {}",
            before.id
        )));
    }

    info!(%kind, id = %after.id, "record updated");
    Ok(RecordUpdate { before, after })
}

/// Members to grant and revoke on a single record
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermissionsChange {
    pub add: Vec<String>,
    pub remove: Vec<String>,
}

/// Apply `change` to the record's access list and return the updated record.
///
/// Removal is applied before addition. Unavailable while access control is
/// off. The caller must be able to see the record.
pub async fn update_permissions(
    state: &FeatureState,
    kind: EntityKind,
    identity: &Identity,
    raw_id: &str,
    change: PermissionsChange,
) -> AppResult<EntityRecord> {
    if !state.visibility.access_control_enabled {
        return Err(AppError::NotFound("Not Found".to_string()));
    }
    if change.add.is_empty() && change.remove.is_empty() {
        return Err(RecordValidationError::NothingToUpdate.into());
    }

    let id = get(state, kind, identity, raw_id).await?.id;

    validate_members(state.store.as_ref(), kind, &change.add).await?;
    validate_members(state.store.as_ref(), kind, &change.remove).await?;

    let patch = AccessPatch {
        set_hidden: None,
        remove: change.remove,
        add: change.add,
    };
    state.store.update_records(kind, &Filter::Id(id), &patch).await?;

    info!(%kind, %id, "permissions updated");
    fetch(state, kind, id).await
}

/// Delete the record and its attachment directory; returns the removed record.
pub async fn delete(
    state: &FeatureState,
    kind: EntityKind,
    identity: &Identity,
    raw_id: &str,
) -> AppResult<EntityRecord> {
    let record = get(state, kind, identity, raw_id).await?;

    if !state.store.delete_record(kind, record.id).await? {
        return Err(AppError::NotFound(format!(
            "No record found for id: {}",
            record.id
        )));
    }
    if let Err(e) = state.attachments.remove(kind, record.id).await {
        warn!(%kind, id = %record.id, error = %e, "failed to remove attachment directory");
    }

    info!(%kind, id = %record.id, "record deleted");
    Ok(record)
}

/// Delete every record of `kind` and reset its attachment root.
pub async fn delete_all(state: &FeatureState, kind: EntityKind) -> AppResult<u64> {
    let removed = state.store.delete_records(kind, &Filter::All).await?;
    state.attachments.clear(kind).await.map_err(|e| {
        error!(%kind, error = %e, "failed to clear attachment directories");
        AppError::StoreUnavailable(format!("error deleting {kind} files"))
    })?;

    info!(%kind, removed, "all records deleted");
    Ok(removed)
}

/// Confirm the record exists and is visible to the caller. Nothing is written.
pub async fn bump(
    state: &FeatureState,
    kind: EntityKind,
    identity: &Identity,
    raw_id: &str,
) -> AppResult<EntityRecord> {
    let record = get(state, kind, identity, raw_id).await?;
    info!(%kind, id = %record.id, "record bumped");
    Ok(record)
}

async fn checked_access_list(
    state: &FeatureState,
    kind: EntityKind,
    access_list: Option<Vec<String>>,
) -> AppResult<Option<Vec<String>>> {
    let Some(mut members) = access_list else {
        return Ok(None);
    };
    if !state.visibility.access_control_enabled {
        return Err(RecordValidationError::AccessControlDisabled {
            field: kind.field("access_list"),
        }
        .into());
    }
    validate_members(state.store.as_ref(), kind, &members).await?;

    let mut seen = std::collections::HashSet::new();
    members.retain(|member| seen.insert(member.clone()));
    Ok(Some(members))
}

/// `<kind>_files` is derived from the attachment directory on every read.
fn strip_files(kind: EntityKind, mut meta: Map<String, Value>) -> Map<String, Value> {
    meta.remove(&kind.field("files"));
    meta
}

/// Wire form of a record: kind-prefixed fields, attachment listing in the
/// additional meta, and the access list only while access control is on.
pub fn record_json(
    kind: EntityKind,
    record: &EntityRecord,
    files: Vec<String>,
    access_control_enabled: bool,
) -> Value {
    let mut meta = record.additional_meta.clone();
    meta.insert(kind.field("files"), json!(files));

    let mut body = Map::new();
    body.insert("id".to_string(), json!(record.id));
    body.insert(kind.field("id"), json!(record.name));
    body.insert("start_ts".to_string(), json!(record.start_ts));
    body.insert("stop_ts".to_string(), json!(record.stop_ts));
    body.insert(kind.field("location"), json!(record.location));
    body.insert(kind.field("additional_meta"), Value::Object(meta));
    body.insert(kind.field("tags"), json!(record.tags));
    body.insert(kind.field("hidden"), json!(record.hidden));
    if access_control_enabled {
        body.insert(kind.field("access_list"), json!(record.access_list));
    }
    Value::Object(body)
}

pub async fn render_one(
    state: &FeatureState,
    kind: EntityKind,
    record: &EntityRecord,
    format: ResponseFormat,
) -> Response {
    match format {
        ResponseFormat::Csv => match records_to_csv(kind, std::slice::from_ref(record)) {
            Ok(body) => csv_response(body),
            Err(err) => AppError::from(err).into_response(),
        },
        ResponseFormat::Json => one_json(state, kind, record).await.into_response(),
    }
}

pub async fn render_many(
    state: &FeatureState,
    kind: EntityKind,
    records: &[EntityRecord],
    format: ResponseFormat,
) -> Response {
    match format {
        ResponseFormat::Csv => match records_to_csv(kind, records) {
            Ok(body) => csv_response(body),
            Err(err) => AppError::from(err).into_response(),
        },
        ResponseFormat::Json => {
            let bodies = futures::future::join_all(records.iter().map(move |record| async move {
                let files = state.attachments.list(kind, record.id).await;
                record_json(kind, record, files, state.visibility.access_control_enabled)
            }))
            .await;
            let count = bodies.len();
            ApiResponse::success_with_meta(bodies, json!({ "count": count })).into_response()
        }
    }
}

/// JSON envelope around a single record
pub async fn one_json(
    state: &FeatureState,
    kind: EntityKind,
    record: &EntityRecord,
) -> ApiResponse<Value> {
    let files = state.attachments.list(kind, record.id).await;
    ApiResponse::success(record_json(
        kind,
        record,
        files,
        state.visibility.access_control_enabled,
    ))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn record() -> EntityRecord {
        EntityRecord {
            id: Uuid::new_v4(),
            name: "S0412".to_string(),
            start_ts: Utc.with_ymd_and_hms(2023, 1, 2, 0, 0, 0).unwrap(),
            stop_ts: Utc.with_ymd_and_hms(2023, 1, 3, 0, 0, 0).unwrap(),
            location: "Axial".to_string(),
            additional_meta: Map::new(),
            tags: vec!["dive".to_string()],
            hidden: true,
            access_list: vec!["u1".to_string()],
        }
    }

    #[test]
    fn test_record_json_prefixes_fields() {
        let body = record_json(EntityKind::Lowering, &record(), vec!["a.jpg".into()], false);

        assert_eq!(body["lowering_id"], "S0412");
        assert_eq!(body["lowering_location"], "Axial");
        assert_eq!(body["lowering_hidden"], true);
        assert_eq!(body["lowering_additional_meta"]["lowering_files"][0], "a.jpg");
        assert!(body.get("lowering_access_list").is_none());
    }

    #[test]
    fn test_record_json_access_list_when_enabled() {
        let body = record_json(EntityKind::Cruise, &record(), vec![], true);
        assert_eq!(body["cruise_access_list"][0], "u1");
    }

    #[test]
    fn test_changes_keep_untouched_fields() {
        let mut target = record();
        let changes = RecordChanges {
            location: Some("Endeavour".to_string()),
            additional_meta: Some(
                serde_json::from_value(json!({ "lowering_pilot": "Ann", "lowering_files": ["x"] }))
                    .unwrap(),
            ),
            ..RecordChanges::default()
        };
        assert!(!changes.is_empty());
        changes.apply(EntityKind::Lowering, &mut target);

        assert_eq!(target.location, "Endeavour");
        assert_eq!(target.name, "S0412");
        assert_eq!(target.additional_meta["lowering_pilot"], "Ann");
        assert!(!target.additional_meta.contains_key("lowering_files"));
    }
}
