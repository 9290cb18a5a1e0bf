//! List lowerings query

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

/// Query string of `GET /lowerings` and `GET /lowerings/bycruise/:id`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListLoweringsQuery {
    pub hidden: Option<bool>,
    pub lowering_id: Option<String>,
    pub lowering_location: Option<String>,
    /// Comma-separated; matches lowerings carrying any of the tags
    pub lowering_tags: Option<String>,
    #[serde(rename = "startTS")]
    pub start_ts: Option<DateTime<Utc>>,
    #[serde(rename = "stopTS")]
    pub stop_ts: Option<DateTime<Utc>>,
    pub offset: Option<usize>,
    pub limit: Option<usize>,
    pub format: Option<String>,
}

impl ListLoweringsQuery {
    pub fn format(&self) -> ResponseFormat {
        ResponseFormat::from_param(self.format.as_deref())
    }

    /// Field selectors only; the caller adds the time selector.
    pub(crate) fn field_selector(&self) -> Filter {
        if let Some(ref name) = self.lowering_id {
            return Filter::Name(name.clone());
        }

        let mut selector = Filter::All;
        if let Some(ref location) = self.lowering_location {
            selector = selector.and(Filter::Location(location.clone()));
        }
        let tags = split_list(self.lowering_tags.as_deref());
        if !tags.is_empty() {
            selector = selector.and(Filter::TagsAny(tags));
        }
        selector
    }

    pub fn params_with(&self, time: Filter) -> ListParams {
        ListParams {
            include_hidden: self.hidden == Some(true),
            selector: self.field_selector().and(time),
            offset: self.offset.unwrap_or(0),
            limit: self.limit,
        }
    }
}

#[tracing::instrument(skip(state, identity, query))]
pub async fn handle(
    state: &FeatureState,
    identity: &Identity,
    query: &ListLoweringsQuery,
) -> AppResult<Vec<EntityRecord>> {
    let params = query.params_with(time_selector(query.start_ts, query.stop_ts));
    records::list(state, EntityKind::Lowering, identity, params).await
}
