//! Write-path validation for cruises and lowerings

use chrono::{DateTime, Utc};
use sealog_common::types::EntityKind;
use thiserror::Error;

use crate::{error::AppError, store::DocumentStore};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RecordValidationError {
    #[error("{field} is required and cannot be empty")]
    Required { field: String },

    #[error("Start date must be older than stop date")]
    InvalidWindow,

    #[error("{field} is not accepted while access control is disabled")]
    AccessControlDisabled { field: String },

    #[error("{field} includes invalid user IDs")]
    UnknownUsers { field: String },

    #[error("No fields to update")]
    NothingToUpdate,
}

impl From<RecordValidationError> for AppError {
    fn from(err: RecordValidationError) -> Self {
        AppError::Validation(err.to_string())
    }
}

pub fn validate_name(kind: EntityKind, name: &str) -> Result<(), RecordValidationError> {
    if name.trim().is_empty() {
        return Err(RecordValidationError::Required {
            field: kind.field("id"),
        });
    }
    Ok(())
}

pub fn validate_window(
    start: DateTime<Utc>,
    stop: DateTime<Utc>,
) -> Result<(), RecordValidationError> {
    if start >= stop {
        return Err(RecordValidationError::InvalidWindow);
    }
    Ok(())
}

/// Every member must be a registered user.
pub async fn validate_members(
    store: &dyn DocumentStore,
    kind: EntityKind,
    members: &[String],
) -> Result<(), AppError> {
    if members.is_empty() {
        return Ok(());
    }
    let known = store.existing_user_ids(members).await?;
    if members.iter().all(|member| known.contains(member)) {
        Ok(())
    } else {
        Err(RecordValidationError::UnknownUsers {
            field: kind.field("access_list"),
        }
        .into())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use chrono::TimeZone;

    #[test]
    fn test_window_must_be_strictly_ordered() {
        let start = Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap();
        assert!(validate_window(start, start + chrono::Duration::hours(1)).is_ok());
        assert_eq!(
            validate_window(start, start),
            Err(RecordValidationError::InvalidWindow)
        );
    }

    #[test]
    fn test_name_required() {
        let err = validate_name(EntityKind::Lowering, "  ").unwrap_err();
        assert_eq!(err.to_string(), "lowering_id is required and cannot be empty");
    }

    #[tokio::test]
    async fn test_unknown_members_rejected() {
        let store = MemoryStore::new();
        store.add_user("u1").await;

        assert!(validate_members(&store, EntityKind::Cruise, &["u1".into()]).await.is_ok());
        let err = validate_members(&store, EntityKind::Cruise, &["u1".into(), "ghost".into()])
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "cruise_access_list includes invalid user IDs");
    }
}
