//! List cruises query

use chrono::{DateTime, Utc};
use sealog_common::types::{EntityKind, EntityRecord, Identity};
use serde::Deserialize;

use crate::{
    api::ResponseFormat,
    error::AppResult,
    features::{
        shared::{
            params::{split_list, time_selector},
            records::{self, ListParams},
        },
        FeatureState,
    },
    store::Filter,
};

/// Query string of `GET /cruises`
///
/// `cruise_id` selects a single cruise by name and overrides every other
/// selector. Time bounds select cruises overlapping `(startTS, stopTS)`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListCruisesQuery {
    pub hidden: Option<bool>,
    pub cruise_id: Option<String>,
    pub cruise_location: Option<String>,
    pub cruise_pi: Option<String>,
    pub cruise_vessel: Option<String>,
    /// Comma-separated; matches cruises carrying any of the tags
    pub cruise_tags: Option<String>,
    #[serde(rename = "startTS")]
    pub start_ts: Option<DateTime<Utc>>,
    #[serde(rename = "stopTS")]
    pub stop_ts: Option<DateTime<Utc>>,
    pub offset: Option<usize>,
    pub limit: Option<usize>,
    pub format: Option<String>,
}

impl ListCruisesQuery {
    pub fn format(&self) -> ResponseFormat {
        ResponseFormat::from_param(self.format.as_deref())
    }

    fn selector(&self) -> Filter {
        if let Some(ref name) = self.cruise_id {
            return Filter::Name(name.clone());
        }

        let mut selector = Filter::All;
        if let Some(ref location) = self.cruise_location {
            selector = selector.and(Filter::Location(location.clone()));
        }
        if let Some(ref pi) = self.cruise_pi {
            selector = selector.and(Filter::Meta {
                key: "cruise_pi".to_string(),
                value: pi.clone(),
            });
        }
        if let Some(ref vessel) = self.cruise_vessel {
            selector = selector.and(Filter::Meta {
                key: "cruise_vessel".to_string(),
                value: vessel.clone(),
            });
        }
        let tags = split_list(self.cruise_tags.as_deref());
        if !tags.is_empty() {
            selector = selector.and(Filter::TagsAny(tags));
        }
        selector.and(time_selector(self.start_ts, self.stop_ts))
    }

    pub fn params(&self) -> ListParams {
        ListParams {
            include_hidden: self.hidden == Some(true),
            selector: self.selector(),
            offset: self.offset.unwrap_or(0),
            limit: self.limit,
        }
    }
}

#[tracing::instrument(skip(state, identity, query))]
pub async fn handle(
    state: &FeatureState,
    identity: &Identity,
    query: &ListCruisesQuery,
) -> AppResult<Vec<EntityRecord>> {
    records::list(state, EntityKind::Cruise, identity, query.params()).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cruise_id_overrides_other_selectors() {
        let query = ListCruisesQuery {
            cruise_id: Some("AT42-01".to_string()),
            cruise_location: Some("EPR".to_string()),
            ..Default::default()
        };
        assert_eq!(query.params().selector, Filter::Name("AT42-01".to_string()));
    }

    #[test]
    fn test_selectors_are_conjoined() {
        let query = ListCruisesQuery {
            cruise_vessel: Some("R/V Atlantis".to_string()),
            cruise_tags: Some("geology,biology".to_string()),
            hidden: Some(false),
            ..Default::default()
        };
        let params = query.params();
        assert!(!params.include_hidden);
        assert_eq!(
            params.selector,
            Filter::And(vec![
                Filter::Meta {
                    key: "cruise_vessel".to_string(),
                    value: "R/V Atlantis".to_string(),
                },
                Filter::TagsAny(vec!["geology".to_string(), "biology".to_string()]),
            ])
        );
    }
}
