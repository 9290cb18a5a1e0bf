//! Shared fixtures for the API integration tests
#![allow(dead_code, clippy::unwrap_used)]

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::{DateTime, TimeZone, Utc};
use http_body_util::BodyExt;
use sealog_common::types::{AuxField, AuxGroup, EntityKind, EntityRecord, Event, EventOption};
use sealog_server::{
    access::VisibilityConfig,
    config::CorsConfig,
    features::FeatureState,
    storage::AttachmentStore,
    store::{DocumentStore, MemoryStore},
};
use serde_json::{Map, Value};
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;
use uuid::Uuid;

pub const ADMIN: (&str, &str) = ("admin-1", "admin");
pub const MEMBER: (&str, &str) = ("u1", "read_cruises");
pub const OUTSIDER: (&str, &str) = ("u2", "read_cruises");
pub const CRUISE_WRITER: (&str, &str) = ("writer", "write_cruises,create_cruises");

pub struct TestApp {
    pub store: Arc<MemoryStore>,
    pub router: Router,
    pub files: TempDir,
}

impl TestApp {
    pub async fn new(access_control: bool) -> Self {
        let store = Arc::new(MemoryStore::new());
        for user in ["admin-1", "u1", "u2", "u3", "writer"] {
            store.add_user(user).await;
        }

        let files = tempfile::tempdir().unwrap();
        let attachments =
            AttachmentStore::new(files.path().join("cruises"), files.path().join("lowerings"));

        let state = FeatureState {
            store: store.clone(),
            attachments,
            visibility: VisibilityConfig {
                access_control_enabled: access_control,
            },
        };
        let cors = CorsConfig {
            allowed_origins: vec!["*".to_string()],
            allow_credentials: false,
        };

        Self {
            store,
            router: sealog_server::app(state, &cors),
            files,
        }
    }

    pub async fn insert(&self, kind: EntityKind, record: &EntityRecord) {
        self.store.insert_record(kind, record).await.unwrap();
    }

    pub async fn record(&self, kind: EntityKind, id: Uuid) -> EntityRecord {
        self.store.get_record(kind, id).await.unwrap().unwrap()
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let (status, body) = self.send_raw(request).await;
        let json = if body.is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&body).unwrap()
        };
        (status, json)
    }

    pub async fn send_raw(&self, request: Request<Body>) -> (StatusCode, String) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }
}

pub fn request(method: Method, uri: &str, caller: Option<(&str, &str)>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some((id, roles)) = caller {
        builder = builder.header("x-user-id", id).header("x-user-roles", roles);
    }
    match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

pub fn get(uri: &str, caller: Option<(&str, &str)>) -> Request<Body> {
    request(Method::GET, uri, caller, None)
}

pub fn ts(day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2023, 3, day, hour, 0, 0).unwrap()
}

pub fn record(name: &str, start: DateTime<Utc>, stop: DateTime<Utc>) -> EntityRecord {
    EntityRecord {
        id: Uuid::new_v4(),
        name: name.to_string(),
        start_ts: start,
        stop_ts: stop,
        location: String::new(),
        additional_meta: Map::new(),
        tags: vec![],
        hidden: false,
        access_list: vec![],
    }
}

pub fn hidden(mut record: EntityRecord, access_list: &[&str]) -> EntityRecord {
    record.hidden = true;
    record.access_list = access_list.iter().map(|s| s.to_string()).collect();
    record
}

pub fn event(ts: DateTime<Utc>, author: &str, value: &str) -> Event {
    Event {
        id: Uuid::new_v4(),
        ts,
        event_author: author.to_string(),
        event_value: value.to_string(),
        event_free_text: String::new(),
        event_options: vec![],
        aux_data: vec![],
    }
}

pub fn with_option(mut event: Event, name: &str, value: &str) -> Event {
    event.event_options.push(EventOption {
        event_option_name: name.to_string(),
        event_option_value: value.to_string(),
    });
    event
}

pub fn with_aux(mut event: Event, source: &str, fields: &[(&str, &str, &str)]) -> Event {
    event.aux_data.push(AuxGroup {
        id: None,
        data_source: source.to_string(),
        data_array: fields
            .iter()
            .map(|(name, value, uom)| AuxField {
                data_name: name.to_string(),
                data_value: (*value).into(),
                data_uom: Some(uom.to_string()),
            })
            .collect(),
    });
    event
}
