//! Query-string helpers

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::{api::ResponseFormat, store::Filter};

/// `?format=csv` on single-record reads
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FormatQuery {
    pub format: Option<String>,
}

impl FormatQuery {
    pub fn format(&self) -> ResponseFormat {
        ResponseFormat::from_param(self.format.as_deref())
    }
}

/// List-valued parameters are comma-separated: `?author=port,stbd`.
pub fn split_list(param: Option<&str>) -> Vec<String> {
    param
        .map(|value| {
            value
                .split(',')
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Records overlapping `(start, stop)`; an open end defaults to the epoch
/// or to now.
pub fn time_selector(start: Option<DateTime<Utc>>, stop: Option<DateTime<Utc>>) -> Filter {
    if start.is_none() && stop.is_none() {
        return Filter::All;
    }
    Filter::overlapping(
        start.unwrap_or(DateTime::<Utc>::UNIX_EPOCH),
        stop.unwrap_or_else(Utc::now),
    )
}

/// Use `requested` when it falls inside `[start, stop]`, otherwise `fallback`.
pub fn clamp_to_window(
    requested: Option<DateTime<Utc>>,
    start: DateTime<Utc>,
    stop: DateTime<Utc>,
    fallback: DateTime<Utc>,
) -> DateTime<Utc> {
    match requested {
        Some(ts) if ts >= start && ts <= stop => ts,
        _ => fallback,
    }
}
