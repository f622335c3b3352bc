//! External collaborators referenced only through their contracts
//! (`spec.md` §6). This crate ships no concrete orchestrator client and no
//! vendor-specific label parser — only the traits the reconciler depends on.

use std::collections::HashMap;

use async_trait::async_trait;
use thiserror::Error;

use crate::hostname::RecordHints;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkloadType {
    Container,
    Service,
}

/// One workload as reported by the orchestrator: an opaque id, a name, a
/// label map, and a type tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workload {
    pub id: String,
    pub name: String,
    pub labels: HashMap<String, String>,
    pub workload_type: WorkloadType,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ListerError {
    #[error("failed to list workloads: {0}")]
    Transport(String),
}

/// The container-orchestrator client: lists all current workloads.
#[async_trait]
pub trait WorkloadLister: Send + Sync {
    async fn list(&self) -> Result<Vec<Workload>, ListerError>;

    /// Current orchestrator mode/name, surfaced only for logging.
    fn orchestrator_mode(&self) -> &str;
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    #[error("malformed label configuration: {0}")]
    MalformedLabels(String),
}

/// An as-yet-unvalidated hostname extracted from a workload's labels (or
/// discovered from a file). The top loop (`spec.md` §4.H) validates and
/// normalizes these into [`crate::hostname::Hostname`]s, counting failures
/// as `HostnamesInvalid` rather than rejecting the whole cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub raw: String,
    pub router: Option<String>,
    pub hints: RecordHints,
}

impl Candidate {
    pub fn new(raw: impl Into<String>) -> Self {
        Candidate {
            raw: raw.into(),
            router: None,
            hints: RecordHints::default(),
        }
    }
}

/// Turns a workload's labels into zero or more candidate hostnames.
/// Sources are stateless and safe for concurrent use; they return an error
/// only on malformed label configuration, never on "no hostnames found".
#[cfg_attr(test, mockall::automock)]
pub trait Source: Send + Sync {
    fn name(&self) -> &str;

    fn extract(&self, labels: &HashMap<String, String>) -> Result<Vec<Candidate>, SourceError>;

    /// Periodic filesystem-based discovery. Sources that don't support this
    /// simply return an empty list (`spec.md` §6 — "a subset of sources
    /// also implement Discover").
    fn discover(&self) -> Result<Vec<Candidate>, SourceError> {
        Ok(vec![])
    }
}

/// A [`WorkloadLister`] that reports no workloads. This crate ships no
/// concrete orchestrator client (`spec.md` §1); binaries that haven't wired
/// one in yet can start against this so the reconciliation loop still runs
/// empty cycles on schedule rather than failing to start.
pub struct NoopLister;

#[async_trait]
impl WorkloadLister for NoopLister {
    async fn list(&self) -> Result<Vec<Workload>, ListerError> {
        Ok(vec![])
    }

    fn orchestrator_mode(&self) -> &str {
        "noop"
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn noop_lister_reports_no_workloads() {
        let lister = NoopLister;
        assert_eq!(lister.list().await.unwrap(), vec![]);
        assert_eq!(lister.orchestrator_mode(), "noop");
    }
}
