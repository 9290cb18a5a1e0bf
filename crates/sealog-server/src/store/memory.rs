//! In-process document store

use async_trait::async_trait;
use sealog_common::types::{EntityKind, EntityRecord, Event};
use std::collections::{BTreeSet, HashMap};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{AccessPatch, DocumentStore, EventQuery, Filter, FindOptions, StoreError, StoreResult};

#[derive(Debug, Default)]
struct Collections {
    cruises: HashMap<Uuid, EntityRecord>,
    lowerings: HashMap<Uuid, EntityRecord>,
    events: Vec<Event>,
    users: BTreeSet<String>,
}

impl Collections {
    fn records(&self, kind: EntityKind) -> &HashMap<Uuid, EntityRecord> {
        match kind {
            EntityKind::Cruise => &self.cruises,
            EntityKind::Lowering => &self.lowerings,
        }
    }

    fn records_mut(&mut self, kind: EntityKind) -> &mut HashMap<Uuid, EntityRecord> {
        match kind {
            EntityKind::Cruise => &mut self.cruises,
            EntityKind::Lowering => &mut self.lowerings,
        }
    }
}

/// Every operation takes the lock once, so single-record updates are atomic
/// and a multi-record update is applied as one step.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Collections>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Events are written by the logger, not through the API.
    pub async fn insert_event(&self, event: Event) {
        self.inner.write().await.events.push(event);
    }

    pub async fn add_user(&self, user_id: impl Into<String>) {
        self.inner.write().await.users.insert(user_id.into());
    }
}

fn page<T>(items: Vec<T>, offset: usize, limit: Option<usize>) -> Vec<T> {
    items
        .into_iter()
        .skip(offset)
        .take(limit.unwrap_or(usize::MAX))
        .collect()
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn find_records(
        &self,
        kind: EntityKind,
        options: &FindOptions,
    ) -> StoreResult<Vec<EntityRecord>> {
        let inner = self.inner.read().await;
        let mut records: Vec<EntityRecord> = inner
            .records(kind)
            .values()
            .filter(|record| options.filter.matches(record))
            .cloned()
            .collect();
        records.sort_by(|a, b| b.start_ts.cmp(&a.start_ts).then_with(|| a.id.cmp(&b.id)));
        Ok(page(records, options.offset, options.limit))
    }

    async fn get_record(&self, kind: EntityKind, id: Uuid) -> StoreResult<Option<EntityRecord>> {
        Ok(self.inner.read().await.records(kind).get(&id).cloned())
    }

    async fn insert_record(&self, kind: EntityKind, record: &EntityRecord) -> StoreResult<()> {
        let mut inner = self.inner.write().await;
        let records = inner.records_mut(kind);
        if records.contains_key(&record.id) {
            return Err(StoreError::Duplicate {
                kind,
                id: record.id,
            });
        }
        records.insert(record.id, record.clone());
        Ok(())
    }

    async fn replace_record(&self, kind: EntityKind, record: &EntityRecord) -> StoreResult<bool> {
        let mut inner = self.inner.write().await;
        match inner.records_mut(kind).get_mut(&record.id) {
            Some(existing) => {
                *existing = record.clone();
                Ok(true)
            },
            None => Ok(false),
        }
    }

    async fn delete_record(&self, kind: EntityKind, id: Uuid) -> StoreResult<bool> {
        Ok(self.inner.write().await.records_mut(kind).remove(&id).is_some())
    }

    async fn delete_records(&self, kind: EntityKind, filter: &Filter) -> StoreResult<u64> {
        let mut inner = self.inner.write().await;
        let records = inner.records_mut(kind);
        let before = records.len();
        records.retain(|_, record| !filter.matches(record));
        Ok((before - records.len()) as u64)
    }

    async fn update_records(
        &self,
        kind: EntityKind,
        filter: &Filter,
        patch: &AccessPatch,
    ) -> StoreResult<u64> {
        let mut inner = self.inner.write().await;
        let mut matched = 0;
        for record in inner.records_mut(kind).values_mut() {
            if filter.matches(record) {
                patch.apply(record);
                matched += 1;
            }
        }
        Ok(matched)
    }

    async fn get_event(&self, id: Uuid) -> StoreResult<Option<Event>> {
        let inner = self.inner.read().await;
        Ok(inner.events.iter().find(|event| event.id == id).cloned())
    }

    async fn find_events(&self, query: &EventQuery) -> StoreResult<Vec<Event>> {
        let matcher = query.matcher()?;
        let inner = self.inner.read().await;
        let mut events: Vec<Event> = inner
            .events
            .iter()
            .filter(|event| matcher.matches(event))
            .cloned()
            .collect();
        events.sort_by_key(|event| event.ts);
        Ok(page(events, query.offset, query.limit))
    }

    async fn existing_user_ids(&self, ids: &[String]) -> StoreResult<BTreeSet<String>> {
        let inner = self.inner.read().await;
        Ok(ids.iter().filter(|id| inner.users.contains(*id)).cloned().collect())
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};

    fn ts(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2023, 3, day, 0, 0, 0).unwrap()
    }

    fn record(name: &str, start: u32, stop: u32) -> EntityRecord {
        EntityRecord {
            id: Uuid::new_v4(),
            name: name.to_string(),
            start_ts: ts(start),
            stop_ts: ts(stop),
            location: String::new(),
            additional_meta: Default::default(),
            tags: vec![],
            hidden: false,
            access_list: vec![],
        }
    }

    #[tokio::test]
    async fn test_find_sorts_newest_first_and_pages() {
        let store = MemoryStore::new();
        for (name, start) in [("a", 1), ("b", 10), ("c", 5)] {
            store
                .insert_record(EntityKind::Cruise, &record(name, start, start + 1))
                .await
                .unwrap();
        }

        let all = store
            .find_records(EntityKind::Cruise, &FindOptions::default())
            .await
            .unwrap();
        let names: Vec<_> = all.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["b", "c", "a"]);

        let paged = store
            .find_records(
                EntityKind::Cruise,
                &FindOptions {
                    filter: Filter::All,
                    offset: 1,
                    limit: Some(1),
                },
            )
            .await
            .unwrap();
        assert_eq!(paged[0].name, "c");

        assert!(store
            .find_records(EntityKind::Lowering, &FindOptions::default())
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_insert_is_rejected() {
        let store = MemoryStore::new();
        let r = record("a", 1, 2);
        store.insert_record(EntityKind::Lowering, &r).await.unwrap();
        let err = store.insert_record(EntityKind::Lowering, &r).await.unwrap_err();
        assert!(matches!(err, StoreError::Duplicate { .. }));
    }

    #[tokio::test]
    async fn test_update_records_counts_matches() {
        let store = MemoryStore::new();
        store.insert_record(EntityKind::Lowering, &record("in", 2, 3)).await.unwrap();
        store.insert_record(EntityKind::Lowering, &record("out", 8, 12)).await.unwrap();

        let matched = store
            .update_records(
                EntityKind::Lowering,
                &Filter::within(ts(1), ts(10)),
                &AccessPatch::hidden(true),
            )
            .await
            .unwrap();
        assert_eq!(matched, 1);

        let hidden = store
            .find_records(EntityKind::Lowering, &FindOptions::filter(Filter::Hidden(true)))
            .await
            .unwrap();
        assert_eq!(hidden.len(), 1);
        assert_eq!(hidden[0].name, "in");
    }

    #[tokio::test]
    async fn test_delete_records_keeps_other_kind() {
        let store = MemoryStore::new();
        store.insert_record(EntityKind::Cruise, &record("a", 1, 2)).await.unwrap();
        store.insert_record(EntityKind::Cruise, &record("b", 3, 4)).await.unwrap();
        store.insert_record(EntityKind::Lowering, &record("c", 1, 2)).await.unwrap();

        let removed = store.delete_records(EntityKind::Cruise, &Filter::All).await.unwrap();
        assert_eq!(removed, 2);
        assert!(store
            .find_records(EntityKind::Cruise, &FindOptions::default())
            .await
            .unwrap()
            .is_empty());
        assert_eq!(
            store
                .find_records(EntityKind::Lowering, &FindOptions::default())
                .await
                .unwrap()
                .len(),
            1
        );
        assert_eq!(store.delete_records(EntityKind::Cruise, &Filter::All).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_existing_user_ids() {
        let store = MemoryStore::new();
        store.add_user("u1").await;
        let found = store
            .existing_user_ids(&["u1".to_string(), "u2".to_string()])
            .await
            .unwrap();
        assert_eq!(found.into_iter().collect::<Vec<_>>(), vec!["u1"]);
    }
}
