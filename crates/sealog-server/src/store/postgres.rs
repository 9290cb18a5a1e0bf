//! PostgreSQL document store
//!
//! Cruises and lowerings live in two tables with identical columns, so every
//! record query is built once with [`QueryBuilder`] and pointed at the right
//! table. Event aux data is aggregated into a JSON array per event.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sealog_common::types::{AuxGroup, EntityKind, EntityRecord, Event, EventOption};
use serde_json::{Map, Value};
use sqlx::{types::Json, PgPool, Postgres, QueryBuilder};
use std::collections::BTreeSet;
use uuid::Uuid;

use super::{AccessPatch, DocumentStore, EventQuery, Filter, FindOptions, StoreError, StoreResult};

const RECORD_COLUMNS: &str =
    "id, name, start_ts, stop_ts, location, additional_meta, tags, hidden, access_list";

/// Aux groups keep the order they were written in.
const EVENT_SELECT: &str = r#"
    SELECT e.id, e.ts, e.event_author, e.event_value, e.event_free_text, e.event_options,
           COALESCE(
               (SELECT jsonb_agg(
                           jsonb_build_object(
                               'id', a.id,
                               'data_source', a.data_source,
                               'data_array', a.data_array
                           ) ORDER BY a.seq)
                  FROM event_aux_data a
                 WHERE a.event_id = e.id),
               '[]'::jsonb
           ) AS aux_data
      FROM events e
"#;

fn table(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::Cruise => "cruises",
        EntityKind::Lowering => "lowerings",
    }
}

#[derive(Debug, sqlx::FromRow)]
struct RecordRow {
    id: Uuid,
    name: String,
    start_ts: DateTime<Utc>,
    stop_ts: DateTime<Utc>,
    location: String,
    additional_meta: Json<Map<String, Value>>,
    tags: Vec<String>,
    hidden: bool,
    access_list: Vec<String>,
}

impl From<RecordRow> for EntityRecord {
    fn from(row: RecordRow) -> Self {
        EntityRecord {
            id: row.id,
            name: row.name,
            start_ts: row.start_ts,
            stop_ts: row.stop_ts,
            location: row.location,
            additional_meta: row.additional_meta.0,
            tags: row.tags,
            hidden: row.hidden,
            access_list: row.access_list,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct EventRow {
    id: Uuid,
    ts: DateTime<Utc>,
    event_author: String,
    event_value: String,
    event_free_text: String,
    event_options: Json<Vec<EventOption>>,
    aux_data: Json<Vec<AuxGroup>>,
}

impl From<EventRow> for Event {
    fn from(row: EventRow) -> Self {
        Event {
            id: row.id,
            ts: row.ts,
            event_author: row.event_author,
            event_value: row.event_value,
            event_free_text: row.event_free_text,
            event_options: row.event_options.0,
            aux_data: row.aux_data.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// `LIMIT` / `OFFSET` take BIGINT.
fn to_i64(value: usize) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

fn push_page(qb: &mut QueryBuilder<'_, Postgres>, offset: usize, limit: Option<usize>) {
    qb.push(" OFFSET ").push_bind(to_i64(offset));
    if let Some(limit) = limit {
        qb.push(" LIMIT ").push_bind(to_i64(limit));
    }
}

fn push_patch(qb: &mut QueryBuilder<'_, Postgres>, kind: EntityKind, patch: &AccessPatch) {
    qb.push("UPDATE ")
        .push(table(kind))
        .push(" SET hidden = COALESCE(")
        .push_bind(patch.set_hidden)
        .push(", hidden), access_list = (SELECT COALESCE(array_agg(m ORDER BY n), '{}') FROM (")
        .push("SELECT m, min(n) AS n FROM unnest(array_cat(")
        .push("ARRAY(SELECT x FROM unnest(access_list) AS x WHERE x <> ALL(")
        .push_bind(patch.remove.clone())
        .push(")), ")
        .push_bind(patch.add.clone())
        .push("::text[])) WITH ORDINALITY AS t(m, n) GROUP BY m) AS deduped) WHERE ");
}

#[async_trait]
impl DocumentStore for PgStore {
    async fn find_records(
        &self,
        kind: EntityKind,
        options: &FindOptions,
    ) -> StoreResult<Vec<EntityRecord>> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT ");
        qb.push(RECORD_COLUMNS)
            .push(" FROM ")
            .push(table(kind))
            .push(" WHERE ");
        options.filter.push_sql(&mut qb);
        qb.push(" ORDER BY start_ts DESC, id");
        push_page(&mut qb, options.offset, options.limit);

        let rows = qb.build_query_as::<RecordRow>().fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(EntityRecord::from).collect())
    }

    async fn get_record(&self, kind: EntityKind, id: Uuid) -> StoreResult<Option<EntityRecord>> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT ");
        qb.push(RECORD_COLUMNS)
            .push(" FROM ")
            .push(table(kind))
            .push(" WHERE ");
        Filter::Id(id).push_sql(&mut qb);

        let row = qb
            .build_query_as::<RecordRow>()
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(EntityRecord::from))
    }

    async fn insert_record(&self, kind: EntityKind, record: &EntityRecord) -> StoreResult<()> {
        let mut qb = QueryBuilder::<Postgres>::new("INSERT INTO ");
        qb.push(table(kind))
            .push(" (")
            .push(RECORD_COLUMNS)
            .push(") VALUES (")
            .push_bind(record.id)
            .push(", ")
            .push_bind(record.name.clone())
            .push(", ")
            .push_bind(record.start_ts)
            .push(", ")
            .push_bind(record.stop_ts)
            .push(", ")
            .push_bind(record.location.clone())
            .push(", ")
            .push_bind(Json(record.additional_meta.clone()))
            .push(", ")
            .push_bind(record.tags.clone())
            .push(", ")
            .push_bind(record.hidden)
            .push(", ")
            .push_bind(record.access_list.clone())
            .push(")");

        qb.build().execute(&self.pool).await.map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e {
                if db_err.is_unique_violation() {
                    return StoreError::Duplicate {
                        kind,
                        id: record.id,
                    };
                }
            }
            StoreError::Database(e)
        })?;
        Ok(())
    }

    async fn replace_record(&self, kind: EntityKind, record: &EntityRecord) -> StoreResult<bool> {
        let mut qb = QueryBuilder::<Postgres>::new("UPDATE ");
        qb.push(table(kind))
            .push(" SET name = ")
            .push_bind(record.name.clone())
            .push(", start_ts = ")
            .push_bind(record.start_ts)
            .push(", stop_ts = ")
            .push_bind(record.stop_ts)
            .push(", location = ")
            .push_bind(record.location.clone())
            .push(", additional_meta = ")
            .push_bind(Json(record.additional_meta.clone()))
            .push(", tags = ")
            .push_bind(record.tags.clone())
            .push(", hidden = ")
            .push_bind(record.hidden)
            .push(", access_list = ")
            .push_bind(record.access_list.clone())
            .push(" WHERE ");
        Filter::Id(record.id).push_sql(&mut qb);

        let result = qb.build().execute(&self.pool).await?;
        Ok(result.rows_affected() == 1)
    }

    async fn delete_records(&self, kind: EntityKind, filter: &Filter) -> StoreResult<u64> {
        let mut qb = QueryBuilder::<Postgres>::new("DELETE FROM ");
        qb.push(table(kind)).push(" WHERE ");
        filter.push_sql(&mut qb);

        let result = qb.build().execute(&self.pool).await?;
        Ok(result.rows_affected())
    }

    async fn delete_record(&self, kind: EntityKind, id: Uuid) -> StoreResult<bool> {
        let mut qb = QueryBuilder::<Postgres>::new("DELETE FROM ");
        qb.push(table(kind)).push(" WHERE ");
        Filter::Id(id).push_sql(&mut qb);

        let result = qb.build().execute(&self.pool).await?;
        Ok(result.rows_affected() == 1)
    }

    async fn update_records(
        &self,
        kind: EntityKind,
        filter: &Filter,
        patch: &AccessPatch,
    ) -> StoreResult<u64> {
        let mut qb = QueryBuilder::<Postgres>::new("");
        push_patch(&mut qb, kind, patch);
        filter.push_sql(&mut qb);

        let result = qb.build().execute(&self.pool).await?;
        Ok(result.rows_affected())
    }

    async fn get_event(&self, id: Uuid) -> StoreResult<Option<Event>> {
        let mut qb = QueryBuilder::<Postgres>::new(EVENT_SELECT);
        qb.push(" WHERE e.id = ").push_bind(id);

        let row = qb.build_query_as::<EventRow>().fetch_optional(&self.pool).await?;
        Ok(row.map(Event::from))
    }

    async fn find_events(&self, query: &EventQuery) -> StoreResult<Vec<Event>> {
        // Reject bad patterns with the same error as the in-memory store
        query.matcher()?;

        let mut qb = QueryBuilder::<Postgres>::new(EVENT_SELECT);
        push_event_conditions(&mut qb, query);
        qb.push(" ORDER BY e.ts ASC, e.id");
        push_page(&mut qb, query.offset, query.limit);

        let rows = qb.build_query_as::<EventRow>().fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(Event::from).collect())
    }

    async fn existing_user_ids(&self, ids: &[String]) -> StoreResult<BTreeSet<String>> {
        let found: Vec<String> = sqlx::query_scalar("SELECT id FROM users WHERE id = ANY($1)")
            .bind(ids.to_vec())
            .fetch_all(&self.pool)
            .await?;
        Ok(found.into_iter().collect())
    }

    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

fn push_event_conditions(qb: &mut QueryBuilder<'_, Postgres>, query: &EventQuery) {
    qb.push(" WHERE e.ts >= ")
        .push_bind(query.start)
        .push(" AND e.ts <= ")
        .push_bind(query.stop);

    if !query.authors.is_empty() {
        qb.push(" AND e.event_author ~* ANY(")
            .push_bind(query.authors.clone())
            .push(")");
    }
    if !query.values.is_empty() {
        qb.push(" AND e.event_value ~* ANY(")
            .push_bind(query.values.clone())
            .push(")");
    }
    if !query.excluded_values.is_empty() {
        qb.push(" AND NOT (e.event_value ~* ANY(")
            .push_bind(query.excluded_values.clone())
            .push("))");
    }
    if let Some(free_text) = &query.free_text {
        qb.push(" AND e.event_free_text ~* ").push_bind(free_text.clone());
    }
    if !query.data_sources.is_empty() {
        qb.push(
            " AND EXISTS (SELECT 1 FROM event_aux_data d WHERE d.event_id = e.id AND d.data_source = ANY(",
        )
        .push_bind(query.data_sources.clone())
        .push("))");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_update_sql_shape() {
        let mut qb = QueryBuilder::<Postgres>::new("");
        push_patch(&mut qb, EntityKind::Lowering, &AccessPatch::hidden(true));
        Filter::within(Utc::now(), Utc::now()).push_sql(&mut qb);
        let sql = qb.sql();

        assert!(sql.starts_with("UPDATE lowerings SET hidden = COALESCE($1, hidden)"));
        assert!(sql.ends_with("WHERE (start_ts >= $4 AND stop_ts <= $5)"));
    }

    #[test]
    fn test_aux_groups_keep_write_order() {
        assert!(EVENT_SELECT.contains("ORDER BY a.seq)"));
        assert!(!EVENT_SELECT.contains("data_source, a.id"));
    }

    #[test]
    fn test_event_conditions_only_render_requested_filters() {
        let start = Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).single();
        let stop = Utc.with_ymd_and_hms(2023, 2, 1, 0, 0, 0).single();
        let (Some(start), Some(stop)) = (start, stop) else {
            panic!("valid test timestamps");
        };

        let mut qb = QueryBuilder::<Postgres>::new("");
        push_event_conditions(&mut qb, &EventQuery::window(start, stop));
        assert_eq!(qb.sql(), " WHERE e.ts >= $1 AND e.ts <= $2");

        let mut query = EventQuery::window(start, stop);
        query.excluded_values = vec!["OFF".into()];
        query.data_sources = vec!["vehicleRealtimeNavData".into()];
        let mut qb = QueryBuilder::<Postgres>::new("");
        push_event_conditions(&mut qb, &query);
        let sql = qb.sql();
        assert!(sql.contains("AND NOT (e.event_value ~* ANY($3))"));
        assert!(sql.contains("d.data_source = ANY($4)"));
    }

    #[test]
    fn test_table_names() {
        assert_eq!(table(EntityKind::Cruise), "cruises");
        assert_eq!(table(EntityKind::Lowering), "lowerings");
    }
}
