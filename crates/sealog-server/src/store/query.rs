use chrono::{DateTime, Utc};
use regex::{Regex, RegexBuilder};
use sealog_common::types::{EntityRecord, Event};

use super::Filter;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FindOptions {
    pub filter: Filter,
    pub offset: usize,
    pub limit: Option<usize>,
}

impl FindOptions {
    pub fn filter(filter: Filter) -> Self {
        Self {
            filter,
            ..Self::default()
        }
    }

    pub fn first(filter: Filter) -> Self {
        Self {
            filter,
            offset: 0,
            limit: Some(1),
        }
    }
}

/// Multi-record update of the visibility fields.
///
/// Applied in order: set `hidden`, pull `remove`, then append the members of
/// `add` that are not already present.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccessPatch {
    pub set_hidden: Option<bool>,
    pub remove: Vec<String>,
    pub add: Vec<String>,
}

impl AccessPatch {
    pub fn hidden(hidden: bool) -> Self {
        Self {
            set_hidden: Some(hidden),
            ..Self::default()
        }
    }

    pub fn remove(members: Vec<String>) -> Self {
        Self {
            remove: members,
            ..Self::default()
        }
    }

    pub fn add(members: Vec<String>) -> Self {
        Self {
            add: members,
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.set_hidden.is_none() && self.remove.is_empty() && self.add.is_empty()
    }

    pub fn apply(&self, record: &mut EntityRecord) {
        if let Some(hidden) = self.set_hidden {
            record.hidden = hidden;
        }
        record.access_list.retain(|member| !self.remove.contains(member));
        for member in &self.add {
            if !record.access_list.contains(member) {
                record.access_list.push(member.clone());
            }
        }
    }
}

/// Event selection inside a time window.
///
/// Author, value and free-text criteria are case-insensitive regular
/// expressions. `values` is any-of; `excluded_values` is none-of.
#[derive(Debug, Clone, PartialEq)]
pub struct EventQuery {
    pub start: DateTime<Utc>,
    pub stop: DateTime<Utc>,
    pub authors: Vec<String>,
    pub values: Vec<String>,
    pub excluded_values: Vec<String>,
    pub free_text: Option<String>,
    /// Keep events with at least one aux group from one of these sources
    pub data_sources: Vec<String>,
    pub offset: usize,
    pub limit: Option<usize>,
}

impl EventQuery {
    pub fn window(start: DateTime<Utc>, stop: DateTime<Utc>) -> Self {
        Self {
            start,
            stop,
            authors: Vec::new(),
            values: Vec::new(),
            excluded_values: Vec::new(),
            free_text: None,
            data_sources: Vec::new(),
            offset: 0,
            limit: None,
        }
    }

    /// Compile the patterns; fails on the first invalid one.
    pub fn matcher(&self) -> Result<EventMatcher, regex::Error> {
        Ok(EventMatcher {
            start: self.start,
            stop: self.stop,
            authors: compile_all(&self.authors)?,
            values: compile_all(&self.values)?,
            excluded_values: compile_all(&self.excluded_values)?,
            free_text: self.free_text.as_deref().map(compile).transpose()?,
            data_sources: self.data_sources.clone(),
        })
    }
}

fn compile(pattern: &str) -> Result<Regex, regex::Error> {
    RegexBuilder::new(pattern).case_insensitive(true).build()
}

fn compile_all(patterns: &[String]) -> Result<Vec<Regex>, regex::Error> {
    patterns.iter().map(|p| compile(p)).collect()
}

#[derive(Debug, Clone)]
pub struct EventMatcher {
    start: DateTime<Utc>,
    stop: DateTime<Utc>,
    authors: Vec<Regex>,
    values: Vec<Regex>,
    excluded_values: Vec<Regex>,
    free_text: Option<Regex>,
    data_sources: Vec<String>,
}

impl EventMatcher {
    pub fn matches(&self, event: &Event) -> bool {
        if event.ts < self.start || event.ts > self.stop {
            return false;
        }
        if !self.authors.is_empty() && !self.authors.iter().any(|re| re.is_match(&event.event_author))
        {
            return false;
        }
        if !self.values.is_empty() && !self.values.iter().any(|re| re.is_match(&event.event_value)) {
            return false;
        }
        if self.excluded_values.iter().any(|re| re.is_match(&event.event_value)) {
            return false;
        }
        if let Some(re) = &self.free_text {
            if !re.is_match(&event.event_free_text) {
                return false;
            }
        }
        self.data_sources.is_empty()
            || event
                .aux_data
                .iter()
                .any(|group| self.data_sources.contains(&group.data_source))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use sealog_common::types::{AuxField, AuxGroup};
    use uuid::Uuid;

    fn ts(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2023, 1, 27, hour, 0, 0).unwrap()
    }

    fn event(author: &str, value: &str, source: Option<&str>) -> Event {
        Event {
            id: Uuid::new_v4(),
            ts: ts(12),
            event_author: author.to_string(),
            event_value: value.to_string(),
            event_free_text: "Sampled the vent plume".to_string(),
            event_options: vec![],
            aux_data: source
                .map(|s| {
                    vec![AuxGroup {
                        id: None,
                        data_source: s.to_string(),
                        data_array: vec![AuxField {
                            data_name: "depth".to_string(),
                            data_value: "2500".into(),
                            data_uom: None,
                        }],
                    }]
                })
                .unwrap_or_default(),
        }
    }

    #[test]
    fn test_patch_applies_in_order_without_duplicates() {
        let mut record = EntityRecord {
            id: Uuid::new_v4(),
            name: "S0412".to_string(),
            start_ts: ts(1),
            stop_ts: ts(2),
            location: String::new(),
            additional_meta: Default::default(),
            tags: vec![],
            hidden: false,
            access_list: vec!["a".into(), "b".into()],
        };
        let patch = AccessPatch {
            set_hidden: Some(true),
            remove: vec!["a".into()],
            add: vec!["b".into(), "c".into(), "a".into()],
        };
        patch.apply(&mut record);
        assert!(record.hidden);
        assert_eq!(record.access_list, vec!["b", "c", "a"]);
    }

    #[test]
    fn test_matcher_filters() {
        let mut query = EventQuery::window(ts(0), ts(23));
        query.authors = vec!["^PORT$".into(), "stbd".into()];
        query.excluded_values = vec!["^off".into()];
        query.data_sources = vec!["vehicleRealtimeNavData".into()];
        let matcher = query.matcher().unwrap();

        assert!(matcher.matches(&event("port", "SAMPLE", Some("vehicleRealtimeNavData"))));
        assert!(!matcher.matches(&event("pilot", "SAMPLE", Some("vehicleRealtimeNavData"))));
        assert!(!matcher.matches(&event("port", "OFF_BOTTOM", Some("vehicleRealtimeNavData"))));
        assert!(!matcher.matches(&event("port", "SAMPLE", Some("framegrabber"))));
        assert!(!matcher.matches(&event("port", "SAMPLE", None)));
    }

    #[test]
    fn test_matcher_window_is_inclusive() {
        let matcher = EventQuery::window(ts(12), ts(12)).matcher().unwrap();
        assert!(matcher.matches(&event("port", "SAMPLE", None)));
        let matcher = EventQuery::window(ts(13), ts(14)).matcher().unwrap();
        assert!(!matcher.matches(&event("port", "SAMPLE", None)));
    }

    #[test]
    fn test_invalid_pattern() {
        let mut query = EventQuery::window(ts(0), ts(1));
        query.free_text = Some("(unclosed".into());
        assert!(query.matcher().is_err());
    }
}
