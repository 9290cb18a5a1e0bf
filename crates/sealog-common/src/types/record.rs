use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// The two time-windowed entity families of the logbook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Cruise,
    Lowering,
}

impl EntityKind {
    /// Field prefix used on the wire, e.g. `cruise_hidden`.
    pub fn prefix(self) -> &'static str {
        match self {
            EntityKind::Cruise => "cruise",
            EntityKind::Lowering => "lowering",
        }
    }

    pub fn field(self, suffix: &str) -> String {
        format!("{}_{}", self.prefix(), suffix)
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.prefix())
    }
}

/// A stored cruise or lowering.
///
/// `hidden` is always present on a stored record. `access_list` is only
/// meaningful while access control is enabled and is kept empty otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityRecord {
    pub id: Uuid,
    /// Human identifier, e.g. the cruise id "AT42-01" or dive "S0412"
    pub name: String,
    pub start_ts: DateTime<Utc>,
    pub stop_ts: DateTime<Utc>,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub additional_meta: Map<String, Value>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub access_list: Vec<String>,
}

impl EntityRecord {
    /// True when `other` lies entirely within this record's time window.
    pub fn contains_window(&self, start: DateTime<Utc>, stop: DateTime<Utc>) -> bool {
        self.start_ts <= start && self.stop_ts >= stop
    }

    pub fn contains_ts(&self, ts: DateTime<Utc>) -> bool {
        self.start_ts <= ts && self.stop_ts >= ts
    }

    pub fn grants(&self, user_id: &str) -> bool {
        self.access_list.iter().any(|member| member == user_id)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn record() -> EntityRecord {
        EntityRecord {
            id: Uuid::new_v4(),
            name: "AT42-01".to_string(),
            start_ts: Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap(),
            stop_ts: Utc.with_ymd_and_hms(2023, 1, 31, 0, 0, 0).unwrap(),
            location: String::new(),
            additional_meta: Map::new(),
            tags: vec![],
            hidden: false,
            access_list: vec!["u1".to_string()],
        }
    }

    #[test]
    fn test_window_containment_is_inclusive() {
        let r = record();
        assert!(r.contains_window(r.start_ts, r.stop_ts));
        assert!(r.contains_ts(r.stop_ts));
        assert!(!r.contains_window(
            r.start_ts - chrono::Duration::seconds(1),
            r.stop_ts
        ));
    }

    #[test]
    fn test_grants() {
        let r = record();
        assert!(r.grants("u1"));
        assert!(!r.grants("u2"));
    }

    #[test]
    fn test_kind_fields() {
        assert_eq!(EntityKind::Cruise.field("hidden"), "cruise_hidden");
        assert_eq!(EntityKind::Lowering.field("files"), "lowering_files");
    }
}
