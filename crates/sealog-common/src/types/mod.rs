//! Domain types shared across Sealog crates
//!
//! - [`EntityRecord`]: the time-windowed shape shared by cruises and lowerings
//! - [`Event`]: a timestamped annotation with options and auxiliary data
//! - [`Identity`]: the already-verified caller of a request

mod event;
mod identity;
mod record;

pub use event::{AuxField, AuxGroup, AuxValue, Event, EventOption};
pub use identity::Identity;
pub use record::{EntityKind, EntityRecord};

use crate::error::{Result, SealogError};
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Parse a record identifier supplied by a caller.
///
/// Malformed identifiers are rejected before any store access happens.
pub fn parse_record_id(raw: &str) -> Result<Uuid> {
    Uuid::parse_str(raw.trim()).map_err(|_| SealogError::InvalidIdentifier(raw.to_string()))
}

/// Parse an RFC 3339 timestamp supplied by a caller.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw.trim())
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|_| SealogError::InvalidTimestamp(raw.to_string()))
}
