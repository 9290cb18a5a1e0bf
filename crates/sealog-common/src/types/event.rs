use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A timestamped logbook annotation.
///
/// Events carry no visibility flags of their own; they are visible exactly
/// when the cruise or lowering whose window contains `ts` is visible.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: Uuid,
    pub ts: DateTime<Utc>,
    pub event_author: String,
    /// Event category, e.g. "Dive Phase" or "SAMPLE"
    pub event_value: String,
    #[serde(default)]
    pub event_free_text: String,
    #[serde(default)]
    pub event_options: Vec<EventOption>,
    #[serde(default)]
    pub aux_data: Vec<AuxGroup>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventOption {
    pub event_option_name: String,
    #[serde(default)]
    pub event_option_value: String,
}

/// Auxiliary data captured from one source when the event was logged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuxGroup {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    pub data_source: String,
    #[serde(default)]
    pub data_array: Vec<AuxField>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuxField {
    pub data_name: String,
    pub data_value: AuxValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_uom: Option<String>,
}

/// Aux values arrive either as text or as bare JSON numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AuxValue {
    Text(String),
    Number(serde_json::Number),
}

impl std::fmt::Display for AuxValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuxValue::Text(text) => f.write_str(text),
            AuxValue::Number(number) => write!(f, "{}", number),
        }
    }
}

impl From<&str> for AuxValue {
    fn from(value: &str) -> Self {
        AuxValue::Text(value.to_string())
    }
}
