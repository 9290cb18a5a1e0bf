//! Backend-neutral record predicates
//!
//! A [`Filter`] is built by the access policy and the query handlers, then
//! either evaluated in memory ([`Filter::matches`]) or rendered into a SQL
//! `WHERE` clause with bound parameters ([`Filter::push_sql`]). Both paths
//! must agree for every record.

use chrono::{DateTime, Utc};
use sealog_common::types::EntityRecord;
use serde_json::Value;
use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cmp {
    Lt,
    Lte,
    Gt,
    Gte,
}

impl Cmp {
    fn eval<T: PartialOrd>(self, lhs: &T, rhs: &T) -> bool {
        match self {
            Cmp::Lt => lhs < rhs,
            Cmp::Lte => lhs <= rhs,
            Cmp::Gt => lhs > rhs,
            Cmp::Gte => lhs >= rhs,
        }
    }

    fn sql(self) -> &'static str {
        match self {
            Cmp::Lt => " < ",
            Cmp::Lte => " <= ",
            Cmp::Gt => " > ",
            Cmp::Gte => " >= ",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum Filter {
    /// No restriction
    #[default]
    All,
    Hidden(bool),
    AccessListContains(String),
    Id(Uuid),
    Name(String),
    Location(String),
    /// `additional_meta[key]` equals the value, or contains it when an array
    Meta { key: String, value: String },
    TagsAny(Vec<String>),
    Start(Cmp, DateTime<Utc>),
    Stop(Cmp, DateTime<Utc>),
    And(Vec<Filter>),
    Or(Vec<Filter>),
}

impl Filter {
    /// Conjoin two filters, flattening nested `And`s and dropping `All`.
    pub fn and(self, other: Filter) -> Filter {
        match (self, other) {
            (Filter::All, f) | (f, Filter::All) => f,
            (Filter::And(mut lhs), Filter::And(rhs)) => {
                lhs.extend(rhs);
                Filter::And(lhs)
            },
            (Filter::And(mut lhs), f) => {
                lhs.push(f);
                Filter::And(lhs)
            },
            (f, Filter::And(mut rhs)) => {
                rhs.insert(0, f);
                Filter::And(rhs)
            },
            (lhs, rhs) => Filter::And(vec![lhs, rhs]),
        }
    }

    /// Records whose window lies inside `[start, stop]`.
    pub fn within(start: DateTime<Utc>, stop: DateTime<Utc>) -> Filter {
        Filter::And(vec![Filter::Start(Cmp::Gte, start), Filter::Stop(Cmp::Lte, stop)])
    }

    /// Records whose window covers `[start, stop]`.
    pub fn containing(start: DateTime<Utc>, stop: DateTime<Utc>) -> Filter {
        Filter::And(vec![Filter::Start(Cmp::Lte, start), Filter::Stop(Cmp::Gte, stop)])
    }

    /// Records whose window intersects the open interval `(start, stop)`.
    pub fn overlapping(start: DateTime<Utc>, stop: DateTime<Utc>) -> Filter {
        Filter::And(vec![Filter::Start(Cmp::Lt, stop), Filter::Stop(Cmp::Gt, start)])
    }

    pub fn matches(&self, record: &EntityRecord) -> bool {
        match self {
            Filter::All => true,
            Filter::Hidden(hidden) => record.hidden == *hidden,
            Filter::AccessListContains(user_id) => record.grants(user_id),
            Filter::Id(id) => record.id == *id,
            Filter::Name(name) => record.name == *name,
            Filter::Location(location) => record.location == *location,
            Filter::Meta { key, value } => match record.additional_meta.get(key) {
                Some(Value::String(s)) => s == value,
                Some(Value::Array(items)) => items.iter().any(|item| item.as_str() == Some(value)),
                _ => false,
            },
            Filter::TagsAny(tags) => record.tags.iter().any(|tag| tags.contains(tag)),
            Filter::Start(cmp, ts) => cmp.eval(&record.start_ts, ts),
            Filter::Stop(cmp, ts) => cmp.eval(&record.stop_ts, ts),
            Filter::And(filters) => filters.iter().all(|f| f.matches(record)),
            Filter::Or(filters) => filters.iter().any(|f| f.matches(record)),
        }
    }

    /// Append this filter as a boolean SQL expression over the record
    /// columns (`id`, `name`, `start_ts`, `stop_ts`, `location`,
    /// `additional_meta`, `tags`, `hidden`, `access_list`).
    pub fn push_sql(&self, qb: &mut QueryBuilder<'_, Postgres>) {
        match self {
            Filter::All => {
                qb.push("TRUE");
            },
            Filter::Hidden(hidden) => {
                qb.push("hidden = ").push_bind(*hidden);
            },
            Filter::AccessListContains(user_id) => {
                qb.push_bind(user_id.clone()).push(" = ANY(access_list)");
            },
            Filter::Id(id) => {
                qb.push("id = ").push_bind(*id);
            },
            Filter::Name(name) => {
                qb.push("name = ").push_bind(name.clone());
            },
            Filter::Location(location) => {
                qb.push("location = ").push_bind(location.clone());
            },
            Filter::Meta { key, value } => {
                qb.push("(additional_meta ->> ")
                    .push_bind(key.clone())
                    .push(" = ")
                    .push_bind(value.clone())
                    .push(" OR additional_meta -> ")
                    .push_bind(key.clone())
                    .push(" ? ")
                    .push_bind(value.clone())
                    .push(")");
            },
            Filter::TagsAny(tags) => {
                qb.push("tags && ").push_bind(tags.clone());
            },
            Filter::Start(cmp, ts) => {
                qb.push("start_ts").push(cmp.sql()).push_bind(*ts);
            },
            Filter::Stop(cmp, ts) => {
                qb.push("stop_ts").push(cmp.sql()).push_bind(*ts);
            },
            Filter::And(filters) => push_joined(qb, filters, " AND ", "TRUE"),
            Filter::Or(filters) => push_joined(qb, filters, " OR ", "FALSE"),
        }
    }
}

fn push_joined(
    qb: &mut QueryBuilder<'_, Postgres>,
    filters: &[Filter],
    separator: &str,
    empty: &str,
) {
    if filters.is_empty() {
        qb.push(empty);
        return;
    }
    qb.push("(");
    for (i, filter) in filters.iter().enumerate() {
        if i > 0 {
            qb.push(separator);
        }
        filter.push_sql(qb);
    }
    qb.push(")");
}
