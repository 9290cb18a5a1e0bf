//! Document store abstraction
//!
//! Cruises and lowerings share one record shape and are addressed by
//! [`EntityKind`]. Events are read-only from the API's point of view; they
//! are written by the event logger and only ever queried here.
//!
//! Two backends implement [`DocumentStore`]:
//!
//! - [`MemoryStore`]: in-process maps, used by the test-suite and by
//!   `SEALOG_STORE=memory`
//! - [`PgStore`]: PostgreSQL through sqlx

use async_trait::async_trait;
use sealog_common::types::{EntityKind, EntityRecord, Event};
use std::collections::BTreeSet;
use thiserror::Error;
use uuid::Uuid;

pub mod filter;
pub mod memory;
pub mod postgres;
pub mod query;

pub use filter::{Cmp, Filter};
pub use memory::MemoryStore;
pub use postgres::PgStore;
pub use query::{AccessPatch, EventMatcher, EventQuery, FindOptions};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Record with id {id} already exists in {kind}s")]
    Duplicate { kind: EntityKind, id: Uuid },

    #[error("Invalid event filter pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Records matching the filter, newest `start_ts` first.
    async fn find_records(
        &self,
        kind: EntityKind,
        options: &FindOptions,
    ) -> StoreResult<Vec<EntityRecord>>;

    async fn get_record(&self, kind: EntityKind, id: Uuid) -> StoreResult<Option<EntityRecord>>;

    /// Fails with [`StoreError::Duplicate`] when the id is taken.
    async fn insert_record(&self, kind: EntityKind, record: &EntityRecord) -> StoreResult<()>;

    /// Atomically replace a single record. Returns false when it does not exist.
    async fn replace_record(&self, kind: EntityKind, record: &EntityRecord) -> StoreResult<bool>;

    async fn delete_record(&self, kind: EntityKind, id: Uuid) -> StoreResult<bool>;

    /// Delete every matching record; returns the number removed.
    async fn delete_records(&self, kind: EntityKind, filter: &Filter) -> StoreResult<u64>;

    /// Apply the patch to every matching record; returns the match count.
    async fn update_records(
        &self,
        kind: EntityKind,
        filter: &Filter,
        patch: &AccessPatch,
    ) -> StoreResult<u64>;

    async fn get_event(&self, id: Uuid) -> StoreResult<Option<Event>>;

    /// Events with their aux data, oldest first.
    async fn find_events(&self, query: &EventQuery) -> StoreResult<Vec<Event>>;

    /// The subset of `ids` that name registered users.
    async fn existing_user_ids(&self, ids: &[String]) -> StoreResult<BTreeSet<String>>;

    async fn ping(&self) -> StoreResult<()>;
}
