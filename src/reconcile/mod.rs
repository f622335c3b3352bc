//! Reconciler top loop (`spec.md` §4.H) and the event-driven single-hostname
//! variants. Grounded on the teacher's `Executor` (`src/bin/executor/mod.rs`):
//! owns references to its collaborators, builds one derived plan per cycle,
//! and walks it collecting successes/failures into a result object.

pub mod ensure;
pub mod orphan;
pub mod result;

use std::collections::{HashMap, HashSet};
use std::time::Instant;

use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::cache::RecordCache;
use crate::config::ReconcilerConfig;
use crate::hostname::Hostname;
use crate::known_hosts::KnownHostnames;
use crate::matcher::MatcherRegistry;
use crate::provider::ProviderInstance;
use crate::recovery::recover_known_hostnames;
use crate::source::{Candidate, ListerError, Source, WorkloadLister};

use ensure::{ensure_hostname, EnsureConfig};
use orphan::{reconcile_orphans, remove_hostname as remove_hostname_from_provider, OrphanConfig};
use result::{Action, ReconciliationResult};

#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("failed to list workloads: {0}")]
    Lister(#[from] ListerError),
    #[error("reconciliation cycle cancelled")]
    Cancelled,
}

/// Owns every long-lived collaborator: the providers, their domain-matcher
/// routing, the orchestrator client, the hostname sources, and the
/// known-hostname set (`spec.md` §5's only cross-cycle mutable state).
pub struct Reconciler {
    providers: Vec<ProviderInstance>,
    provider_routing: MatcherRegistry<usize>,
    lister: Box<dyn WorkloadLister>,
    sources: Vec<Box<dyn Source>>,
    known: KnownHostnames,
    config: ReconcilerConfig,
    cancel: CancellationToken,
}

impl Reconciler {
    pub fn new(
        providers: Vec<ProviderInstance>,
        lister: Box<dyn WorkloadLister>,
        sources: Vec<Box<dyn Source>>,
        config: ReconcilerConfig,
        cancel: CancellationToken,
    ) -> Self {
        let mut provider_routing = MatcherRegistry::new();
        for (i, p) in providers.iter().enumerate() {
            provider_routing.register(p.matcher.clone(), i);
        }
        Reconciler {
            providers,
            provider_routing,
            lister,
            sources,
            known: KnownHostnames::default(),
            config,
            cancel,
        }
    }

    /// Ownership recovery (`spec.md` §4.I). Call once before the first
    /// cycle; a no-op unless both cleanup-orphans and ownership-tracking are
    /// globally enabled.
    pub async fn recover(&self) {
        if !self.config.cleanup_orphans || !self.config.ownership_tracking {
            return;
        }
        let recovered = recover_known_hostnames(&self.providers).await;
        log::info!("recovered {} known hostname(s) on startup", recovered.len());
        self.known.replace(recovered).await;
    }

    fn ensure_config(&self) -> EnsureConfig {
        EnsureConfig {
            dry_run: self.config.dry_run,
            ownership_tracking: self.config.ownership_tracking,
            adopt_existing: self.config.adopt_existing,
        }
    }

    fn orphan_config(&self) -> OrphanConfig {
        OrphanConfig {
            dry_run: self.config.dry_run,
            ownership_tracking: self.config.ownership_tracking,
        }
    }

    /// A full reconciliation cycle (`spec.md` §4.H).
    pub async fn run_cycle(&self) -> Result<ReconciliationResult, ReconcileError> {
        let started = Instant::now();
        let mut result = ReconciliationResult::default();

        if self.config.disabled {
            return Ok(result);
        }
        if self.cancel.is_cancelled() {
            return Err(ReconcileError::Cancelled);
        }

        let workloads = self.lister.list().await?;
        result.workloads_scanned = workloads.len();

        let mut discovered: Vec<Hostname> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();

        for workload in &workloads {
            if self.cancel.is_cancelled() {
                return Err(ReconcileError::Cancelled);
            }
            for source in &self.sources {
                let candidates = match source.extract(&workload.labels) {
                    Ok(candidates) => candidates,
                    Err(e) => {
                        log::warn!(
                            "source {} failed to extract hostnames from workload {}: {}",
                            source.name(),
                            workload.name,
                            e
                        );
                        continue;
                    }
                };
                for candidate in candidates {
                    register_candidate(candidate, source.name(), &mut discovered, &mut seen, &mut result);
                }
            }
        }

        for source in &self.sources {
            let candidates = match source.discover() {
                Ok(candidates) => candidates,
                Err(e) => {
                    log::warn!("source {} failed file-discovery sweep: {}", source.name(), e);
                    continue;
                }
            };
            for candidate in candidates {
                register_candidate(candidate, source.name(), &mut discovered, &mut seen, &mut result);
            }
        }

        result.hostnames_discovered = discovered.len();

        if self.cancel.is_cancelled() {
            return Err(ReconcileError::Cancelled);
        }
        let cache = RecordCache::build(&self.providers).await;

        let ensure_config = self.ensure_config();
        for hostname in &discovered {
            if self.cancel.is_cancelled() {
                return Err(ReconcileError::Cancelled);
            }
            let actions = ensure_hostname(hostname, &self.provider_routing, &self.providers, &cache, &ensure_config).await;
            for action in actions {
                result.push(action);
            }
        }

        if self.config.cleanup_orphans {
            if self.cancel.is_cancelled() {
                return Err(ReconcileError::Cancelled);
            }
            let previous_known = self.known.snapshot().await;
            let orphaned: HashSet<String> = previous_known.difference(&seen).cloned().collect();
            let orphan_config = self.orphan_config();
            let actions = reconcile_orphans(&orphaned, &self.provider_routing, &self.providers, &cache, &orphan_config).await;
            for action in actions {
                result.push(action);
            }
        }

        self.known.replace(seen).await;
        result.duration = Some(started.elapsed());
        Ok(result)
    }

    /// Event-driven single-hostname update (`spec.md` §4.H). Runs the ensure
    /// path alone, with no record cache (every provider lookup falls back to
    /// a direct query), then adds the hostname to the known set.
    pub async fn reconcile_hostname(&self, candidate: Candidate, source_name: &str) -> Vec<Action> {
        let hostname = match Hostname::new(&candidate.raw, source_name, candidate.router, candidate.hints) {
            Ok(h) => h,
            Err(e) => {
                log::warn!("invalid hostname {:?} from {}: {}", candidate.raw, source_name, e);
                return vec![];
            }
        };
        let cache = RecordCache::build(&[]).await;
        let actions = ensure_hostname(&hostname, &self.provider_routing, &self.providers, &cache, &self.ensure_config()).await;
        self.known.insert(hostname.name().to_string()).await;
        actions
    }

    /// Event-driven single-hostname removal (`spec.md` §4.H): a provider-aware
    /// delete, same policy as the orphan path, then removes it from the
    /// known set.
    pub async fn remove_hostname(&self, name: &str) -> Vec<Action> {
        let normalized = crate::hostname::normalize(name);
        let orphan_config = self.orphan_config();
        let mut actions = Vec::new();
        for provider in &self.providers {
            if let Some(action) = remove_hostname_from_provider(provider, &normalized, &orphan_config).await {
                actions.push(action);
            }
        }
        self.known.remove(&normalized).await;
        actions
    }
}

fn register_candidate(
    candidate: Candidate,
    source_name: &str,
    discovered: &mut Vec<Hostname>,
    seen: &mut HashSet<String>,
    result: &mut ReconciliationResult,
) {
    let normalized = crate::hostname::normalize(&candidate.raw);
    if seen.contains(&normalized) {
        result.hostnames_duplicate += 1;
        return;
    }
    match Hostname::new(&candidate.raw, source_name, candidate.router, candidate.hints) {
        Ok(hostname) => {
            seen.insert(normalized);
            discovered.push(hostname);
        }
        Err(e) => {
            log::warn!("dropping invalid hostname {:?} from {}: {}", candidate.raw, source_name, e);
            result.hostnames_invalid += 1;
        }
    }
}
