//! Propagation of cruise visibility changes to its lowerings
//!
//! A lowering belongs to a cruise when its window lies inside the cruise's
//! window. When a cruise is hidden, unhidden, or its access list changes,
//! the same change is applied to every such lowering.
//!
//! Each step is a separate multi-record update: set `hidden`, pull removed
//! members, then push added members. Steps are not atomic with each other or
//! with the parent write. A failing step stops the sequence and is reported
//! with the steps that already completed so the caller knows the children
//! are partially updated.

use sealog_common::types::{EntityKind, EntityRecord};
use std::fmt;
use thiserror::Error;
use tracing::{error, info};
use uuid::Uuid;

use crate::{
    error::AppError,
    features::shared::records::RecordUpdate,
    store::{AccessPatch, DocumentStore, Filter, StoreError},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CascadeStep {
    SetHidden,
    RemoveMembers,
    AddMembers,
}

impl fmt::Display for CascadeStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CascadeStep::SetHidden => "set hidden",
            CascadeStep::RemoveMembers => "remove members",
            CascadeStep::AddMembers => "add members",
        })
    }
}

/// What to apply to the lowerings of one cruise
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CascadePlan {
    pub set_hidden: Option<bool>,
    pub remove: Vec<String>,
    pub add: Vec<String>,
}

impl CascadePlan {
    /// Plan for a cruise update.
    ///
    /// `hidden` propagates only when the request set it and the value
    /// changed. Access-list changes propagate as a delta so members granted
    /// directly on a lowering are left alone.
    pub fn from_update(update: &RecordUpdate, hidden_requested: bool, access_list_requested: bool) -> Self {
        let RecordUpdate { before, after } = update;

        let set_hidden = (hidden_requested && before.hidden != after.hidden).then_some(after.hidden);

        let (remove, add) = if access_list_requested {
            (
                difference(&before.access_list, &after.access_list),
                difference(&after.access_list, &before.access_list),
            )
        } else {
            (Vec::new(), Vec::new())
        };

        Self {
            set_hidden,
            remove,
            add,
        }
    }

    pub fn from_permissions(add: Vec<String>, remove: Vec<String>) -> Self {
        Self {
            set_hidden: None,
            remove,
            add,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.set_hidden.is_none() && self.remove.is_empty() && self.add.is_empty()
    }

    fn steps(&self) -> Vec<(CascadeStep, AccessPatch)> {
        let mut steps = Vec::new();
        if let Some(hidden) = self.set_hidden {
            steps.push((CascadeStep::SetHidden, AccessPatch::hidden(hidden)));
        }
        if !self.remove.is_empty() {
            steps.push((CascadeStep::RemoveMembers, AccessPatch::remove(self.remove.clone())));
        }
        if !self.add.is_empty() {
            steps.push((CascadeStep::AddMembers, AccessPatch::add(self.add.clone())));
        }
        steps
    }
}

/// Members of `left` missing from `right`, in `left` order
fn difference(left: &[String], right: &[String]) -> Vec<String> {
    left.iter().filter(|member| !right.contains(member)).cloned().collect()
}

/// Lowerings matched by each completed step
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CascadeReport {
    pub steps: Vec<(CascadeStep, u64)>,
}

#[derive(Debug, Error)]
#[error(
    "cruise {parent} was updated but propagation to its lowerings is partial: \
     {failed} failed after [{}]",
    display_steps(.completed)
)]
pub struct CascadeError {
    pub parent: Uuid,
    pub completed: Vec<CascadeStep>,
    pub failed: CascadeStep,
    #[source]
    pub source: StoreError,
}

fn display_steps(steps: &[CascadeStep]) -> String {
    steps.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
}

impl From<CascadeError> for AppError {
    fn from(err: CascadeError) -> Self {
        AppError::StoreUnavailable(err.to_string())
    }
}

/// Apply `plan` to every lowering inside the parent's window.
pub async fn propagate(
    store: &dyn DocumentStore,
    parent: &EntityRecord,
    plan: &CascadePlan,
) -> Result<CascadeReport, CascadeError> {
    let children = Filter::within(parent.start_ts, parent.stop_ts);
    let mut report = CascadeReport::default();

    for (step, patch) in plan.steps() {
        match store
            .update_records(EntityKind::Lowering, &children, &patch)
            .await
        {
            Ok(matched) => {
                info!(cruise = %parent.id, %step, matched, "propagated to lowerings");
                report.steps.push((step, matched));
            }
            Err(source) => {
                let completed: Vec<CascadeStep> = report.steps.iter().map(|(s, _)| *s).collect();
                error!(
                    cruise = %parent.id,
                    %step,
                    completed = %display_steps(&completed),
                    error = %source,
                    "propagation to lowerings failed; lowerings partially updated"
                );
                return Err(CascadeError {
                    parent: parent.id,
                    completed,
                    failed: step,
                    source,
                });
            }
        }
    }

    Ok(report)
}
