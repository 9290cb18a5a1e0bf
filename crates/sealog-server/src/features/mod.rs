//! Feature slices of the Sealog API
//!
//! Each slice is organized as:
//! - `commands/` - write operations (create, update, permissions, delete)
//! - `queries/` - read operations (list, get, joins)
//! - `routes.rs` - HTTP handlers
//!
//! Cruises and lowerings share their record logic through [`shared`].

pub mod cruises;
pub mod event_exports;
pub mod lowerings;
pub mod shared;

use axum::Router;
use std::sync::Arc;

use crate::{access::VisibilityConfig, storage::AttachmentStore, store::DocumentStore};

/// Shared state for all feature routes
#[derive(Clone)]
pub struct FeatureState {
    pub store: Arc<dyn DocumentStore>,
    pub attachments: AttachmentStore,
    pub visibility: VisibilityConfig,
}

/// Mounts each slice under its own prefix:
/// - `/cruises`
/// - `/lowerings`
/// - `/event_exports`
pub fn router(state: FeatureState) -> Router<()> {
    Router::new()
        .nest("/cruises", cruises::cruises_routes())
        .nest("/lowerings", lowerings::lowerings_routes())
        .nest("/event_exports", event_exports::event_exports_routes())
        .with_state(state)
}
