//! Aggregate record of one reconciliation cycle (`spec.md` §3).

use std::time::Duration;

use crate::hostname::RecordType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ActionType {
    Create,
    Update,
    Delete,
    Skip,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ActionStatus {
    Success,
    Failed,
    Skipped,
}

/// A single create/update/delete/skip performed (or synthesized, in
/// dry-run) against one `(provider, hostname)` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    pub action_type: ActionType,
    pub status: ActionStatus,
    pub provider: String,
    pub hostname: String,
    pub record_type: Option<RecordType>,
    pub target: Option<String>,
    pub error: Option<String>,
    pub dry_run: bool,
}

impl Action {
    pub fn success(
        action_type: ActionType,
        provider: impl Into<String>,
        hostname: impl Into<String>,
        record_type: RecordType,
        target: impl Into<String>,
        dry_run: bool,
    ) -> Self {
        Action {
            action_type,
            status: ActionStatus::Success,
            provider: provider.into(),
            hostname: hostname.into(),
            record_type: Some(record_type),
            target: Some(target.into()),
            error: None,
            dry_run,
        }
    }

    pub fn skip(provider: impl Into<String>, hostname: impl Into<String>, reason: impl Into<String>) -> Self {
        Action {
            action_type: ActionType::Skip,
            status: ActionStatus::Skipped,
            provider: provider.into(),
            hostname: hostname.into(),
            record_type: None,
            target: None,
            error: Some(reason.into()),
            dry_run: false,
        }
    }

    pub fn failed(
        action_type: ActionType,
        provider: impl Into<String>,
        hostname: impl Into<String>,
        error: impl Into<String>,
    ) -> Self {
        Action {
            action_type,
            status: ActionStatus::Failed,
            provider: provider.into(),
            hostname: hostname.into(),
            record_type: None,
            target: None,
            error: Some(error.into()),
            dry_run: false,
        }
    }
}

/// Counts and actions produced by one cycle. Consumers iterating `actions`
/// must tolerate unknown future action types and statuses.
#[derive(Debug, Clone, Default)]
pub struct ReconciliationResult {
    pub workloads_scanned: usize,
    pub hostnames_discovered: usize,
    pub hostnames_duplicate: usize,
    pub hostnames_invalid: usize,
    pub actions: Vec<Action>,
    pub duration: Option<Duration>,
}

impl ReconciliationResult {
    pub fn push(&mut self, action: Action) {
        self.actions.push(action);
    }

    pub fn successes(&self) -> impl Iterator<Item = &Action> {
        self.actions.iter().filter(|a| a.status == ActionStatus::Success)
    }

    pub fn failures(&self) -> impl Iterator<Item = &Action> {
        self.actions.iter().filter(|a| a.status == ActionStatus::Failed)
    }
}
