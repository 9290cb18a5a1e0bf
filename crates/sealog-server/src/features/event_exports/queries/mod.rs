//! Event export queries

pub mod by_cruise;
pub mod by_lowering;

use axum::response::{IntoResponse, Response};
use chrono::{DateTime, Utc};
use sealog_common::types::{EntityRecord, Event};
use serde::Deserialize;
use serde_json::json;

use crate::{
    api::{csv_response, ApiResponse, ResponseFormat},
    error::{AppError, AppResult},
    export::{flatten, to_csv, NavPreference},
    features::shared::params::{clamp_to_window, split_list},
    store::EventQuery,
};

/// Query string shared by both export endpoints
///
/// List parameters are comma-separated. A `value` entry starting with `!`
/// excludes matching events instead of selecting them.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventExportQuery {
    pub format: Option<String>,
    pub offset: Option<usize>,
    pub limit: Option<usize>,
    pub author: Option<String>,
    pub value: Option<String>,
    pub freetext: Option<String>,
    pub datasource: Option<String>,
    #[serde(rename = "startTS")]
    pub start_ts: Option<DateTime<Utc>>,
    #[serde(rename = "stopTS")]
    pub stop_ts: Option<DateTime<Utc>>,
    #[serde(default)]
    pub use_renav: bool,
    /// Restrict CSV output to events with this `event_value`
    pub category: Option<String>,
}

impl EventExportQuery {
    pub fn format(&self) -> ResponseFormat {
        ResponseFormat::from_param(self.format.as_deref())
    }

    /// Store query bounded by the parent's window.
    ///
    /// A requested bound outside the parent window falls back to the
    /// parent's own bound.
    pub fn event_query(&self, parent: &EntityRecord) -> EventQuery {
        let start = clamp_to_window(self.start_ts, parent.start_ts, parent.stop_ts, parent.start_ts);
        let stop = clamp_to_window(self.stop_ts, parent.start_ts, parent.stop_ts, parent.stop_ts);

        let (excluded_values, values): (Vec<String>, Vec<String>) = split_list(self.value.as_deref())
            .into_iter()
            .partition(|value| value.starts_with('!'));

        EventQuery {
            authors: split_list(self.author.as_deref()),
            values,
            excluded_values: excluded_values
                .iter()
                .filter_map(|value| value.strip_prefix('!'))
                .filter(|value| !value.is_empty())
                .map(str::to_string)
                .collect(),
            free_text: self.freetext.clone().filter(|text| !text.is_empty()),
            data_sources: split_list(self.datasource.as_deref()),
            offset: self.offset.unwrap_or(0),
            limit: self.limit,
            ..EventQuery::window(start, stop)
        }
    }

    /// Fail fast on malformed patterns before touching the store.
    pub(crate) fn validated(&self, parent: &EntityRecord) -> AppResult<EventQuery> {
        let query = self.event_query(parent);
        query
            .matcher()
            .map_err(|e| AppError::Validation(format!("Invalid event filter pattern: {e}")))?;
        Ok(query)
    }
}

/// JSON envelope or flattened CSV; an empty selection is NotFound.
pub fn render_events(events: Vec<Event>, query: &EventExportQuery) -> AppResult<Response> {
    if events.is_empty() {
        return Err(AppError::no_records());
    }

    match query.format() {
        ResponseFormat::Json => {
            let count = events.len();
            Ok(ApiResponse::success_with_meta(events, json!({ "count": count })).into_response())
        }
        ResponseFormat::Csv => {
            let flattened = flatten(&events);
            let rows = match query.category.as_deref() {
                Some(category) => flattened
                    .rows_by_category
                    .get(category)
                    .ok_or_else(AppError::no_records)?,
                None => &flattened.rows,
            };
            Ok(csv_response(to_csv(
                rows,
                NavPreference::from_use_renav(query.use_renav),
            )))
        }
    }
}
