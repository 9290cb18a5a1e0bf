//! Visibility and access-control policy
//!
//! One rule decides whether a caller may see a cruise or lowering:
//!
//! ```text
//! !record.hidden
//!   || caller.is_admin()
//!   || (access_control_enabled && caller.is_authenticated() && record.access_list ∋ caller.id)
//! ```
//!
//! [`build_filter`] expresses that rule as a store [`Filter`] for listing
//! queries and [`is_visible`] evaluates it against a record that has
//! already been fetched. Joins ("the cruise containing this event") use
//! both: the filter narrows the query and the result is re-checked.

use sealog_common::types::{EntityKind, EntityRecord, Identity};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::store::Filter;

/// Process-wide visibility switch, fixed at startup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisibilityConfig {
    pub access_control_enabled: bool,
}

impl VisibilityConfig {
    pub fn with_access_control() -> Self {
        Self {
            access_control_enabled: true,
        }
    }
}

/// Per-request selection options that interact with visibility.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestOptions {
    /// The caller explicitly asked for hidden records to be included
    pub include_hidden: bool,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AccessError {
    #[error("User not authorized to retrieve hidden {kind}s")]
    HiddenRequested { kind: EntityKind },

    #[error("User not authorized to retrieve this {kind}")]
    NotVisible { kind: EntityKind },

    #[error("Authentication required")]
    Unauthenticated,

    #[error("Requires one of the roles: {roles}")]
    MissingRole { roles: String },
}

/// Filter for listing records of `kind`.
///
/// A non-admin asking for hidden records is rejected outright instead of
/// being served a silently filtered result.
pub fn build_filter(
    identity: &Identity,
    kind: EntityKind,
    config: VisibilityConfig,
    options: RequestOptions,
) -> Result<Filter, AccessError> {
    if identity.is_admin() {
        return Ok(if options.include_hidden {
            Filter::All
        } else {
            Filter::Hidden(false)
        });
    }

    if options.include_hidden {
        return Err(AccessError::HiddenRequested { kind });
    }

    Ok(visibility_filter(identity, config))
}

/// The filter matching exactly the records [`is_visible`] accepts.
pub fn visibility_filter(identity: &Identity, config: VisibilityConfig) -> Filter {
    if identity.is_admin() {
        return Filter::All;
    }
    match identity.id() {
        Some(user_id) if config.access_control_enabled => Filter::Or(vec![
            Filter::Hidden(false),
            Filter::AccessListContains(user_id.to_string()),
        ]),
        _ => Filter::Hidden(false),
    }
}

pub fn is_visible(identity: &Identity, record: &EntityRecord, config: VisibilityConfig) -> bool {
    !record.hidden
        || identity.is_admin()
        || (config.access_control_enabled
            && identity.id().is_some_and(|user_id| record.grants(user_id)))
}

/// [`is_visible`] as a guard for single-record and join paths.
pub fn ensure_visible(
    identity: &Identity,
    kind: EntityKind,
    record: &EntityRecord,
    config: VisibilityConfig,
) -> Result<(), AccessError> {
    if is_visible(identity, record, config) {
        Ok(())
    } else {
        Err(AccessError::NotVisible { kind })
    }
}

/// Write endpoints require `admin` or one of the route's scope roles.
pub fn require_role(identity: &Identity, roles: &[&str]) -> Result<(), AccessError> {
    if !identity.is_authenticated() {
        return Err(AccessError::Unauthenticated);
    }
    if identity.is_admin() || identity.has_any_role(roles) {
        return Ok(());
    }
    Err(AccessError::MissingRole {
        roles: std::iter::once(Identity::ADMIN_ROLE)
            .chain(roles.iter().copied())
            .collect::<Vec<_>>()
            .join(", "),
    })
}
