//! Reconciler — orphan path (`spec.md` §4.G).
//!
//! An orphan is a hostname that was in the previous cycle's known set but is
//! absent from the current cycle's discovered set (`spec.md` §4.H step g:
//! `(previous known set) \ (current discovered set)`). Deletion policy is
//! governed entirely by the owning provider instance's [`OperationalMode`];
//! per the redesign flag in `spec.md` §9 this is one function with three
//! branches, not three near-duplicate delete helpers.

use std::collections::HashSet;

use crate::cache::RecordCache;
use crate::hostname::RecordType;
use crate::matcher::MatcherRegistry;
use crate::provider::{OperationalMode, ProviderInstance};
use crate::reconcile::result::{Action, ActionType};

pub struct OrphanConfig {
    pub dry_run: bool,
    pub ownership_tracking: bool,
}

/// Reconcile every hostname in `orphaned` against the provider instance(s)
/// whose domain matcher selects it (`spec.md` §4.G step 1), applying each
/// selected instance's `mode` deletion policy. `orphaned` must already be
/// `(previous known set) \ (current discovered set)` — the caller owns that
/// set difference.
pub async fn reconcile_orphans(
    orphaned: &HashSet<String>,
    provider_routing: &MatcherRegistry<usize>,
    providers: &[ProviderInstance],
    cache: &RecordCache,
    config: &OrphanConfig,
) -> Vec<Action> {
    let mut actions = Vec::new();
    for hostname in orphaned {
        for &index in provider_routing.matching(hostname) {
            let provider = &providers[index];
            if let Some(action) = reconcile_one_orphan(provider, hostname, cache, config).await {
                actions.push(action);
            }
        }
    }
    actions
}

/// Delete a single hostname's records from one provider, honoring its
/// operational mode. Used by both the batch scan above and the event-driven
/// `RemoveHostname` path (`spec.md` §4.H), which already knows the one
/// hostname to remove and has no per-cycle cache of its own to consult.
pub async fn remove_hostname(provider: &ProviderInstance, hostname: &str, config: &OrphanConfig) -> Option<Action> {
    let cache = RecordCache::build(&[]).await;
    reconcile_one_orphan(provider, hostname, &cache, config).await
}

async fn reconcile_one_orphan(
    provider: &ProviderInstance,
    hostname: &str,
    cache: &RecordCache,
    config: &OrphanConfig,
) -> Option<Action> {
    match provider.mode {
        OperationalMode::Additive => Some(Action::skip(
            &provider.name,
            hostname,
            "additive mode — deletions disabled",
        )),
        OperationalMode::Managed => {
            if !config.ownership_tracking {
                return None;
            }
            let owned = provider.has_ownership_record(hostname).await.unwrap_or(false);
            if !owned {
                return None;
            }
            Some(delete_hostname(provider, hostname, cache, config).await)
        }
        OperationalMode::Authoritative => Some(delete_hostname(provider, hostname, cache, config).await),
    }
}

async fn delete_hostname(provider: &ProviderInstance, hostname: &str, cache: &RecordCache, config: &OrphanConfig) -> Action {
    if config.dry_run {
        return Action::success(ActionType::Delete, &provider.name, hostname, RecordType::A, "", true);
    }

    let (cached, hit) = cache.get_existing_records(&provider.name, hostname);
    let existing = if hit {
        cached
    } else {
        match provider.get_existing_records(hostname).await {
            Ok(records) => records,
            Err(e) => return Action::failed(ActionType::Delete, &provider.name, hostname, e.to_string()),
        }
    };

    // Only record types the adapter declares support for are candidates for
    // deletion (`spec.md` §3 ProviderCapabilities invariant / §4.G).
    let capabilities = provider.capabilities();
    let deletable: Vec<_> = existing
        .into_iter()
        .filter(|r| capabilities.supports(r.record_type))
        .collect();

    let mut last_err = None;
    for record in &deletable {
        let result = if record.record_type == RecordType::Srv {
            provider
                .delete_srv_record(hostname, &record.target, record.srv.unwrap())
                .await
        } else {
            provider
                .delete_record_by_target(hostname, record.record_type, &record.target)
                .await
        };
        if let Err(e) = result {
            if !e.is_not_found() {
                last_err = Some(e);
            }
        }
    }

    if let Some(e) = last_err {
        return Action::failed(ActionType::Delete, &provider.name, hostname, e.to_string());
    }

    if config.ownership_tracking {
        if let Err(e) = provider.delete_ownership_record(hostname).await {
            if !e.is_not_found() {
                log::warn!(
                    "failed to clean up ownership marker for {} in {}: {}",
                    hostname,
                    provider.name,
                    e
                );
            }
        }
    }

    let record_type = deletable.first().map(|r| r.record_type).unwrap_or(RecordType::A);
    Action::success(ActionType::Delete, &provider.name, hostname, record_type, "", false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hostname::Srv;
    use crate::matcher::DomainMatcher;
    use crate::provider::mock::InMemoryProvider;
    use crate::provider::{ProviderCapabilities, ProviderInstanceConfig};
    use crate::record::{ownership_record_name, Record, OWNERSHIP_HERITAGE_VALUE};
    use crate::reconcile::result::ActionStatus;
    use std::sync::Arc;

    fn provider_with_mode(records: Vec<Record>, mode: OperationalMode) -> ProviderInstance {
        ProviderInstance::new(
            ProviderInstanceConfig {
                name: "p".to_string(),
                default_record_type: RecordType::A,
                default_target: "10.0.0.1".to_string(),
                default_ttl: 300,
                matcher: DomainMatcher::accept_all(),
                mode,
            },
            Arc::new(InMemoryProvider::new("p", records)),
        )
    }

    fn owned_records(hostname: &str, target: &str) -> Vec<Record> {
        vec![
            Record::new(hostname, RecordType::A, target, 300, None),
            Record::new(
                ownership_record_name(hostname),
                RecordType::Txt,
                OWNERSHIP_HERITAGE_VALUE,
                60,
                None,
            ),
        ]
    }

    fn registry_with(provider_count: usize) -> MatcherRegistry<usize> {
        let mut reg = MatcherRegistry::new();
        for i in 0..provider_count {
            reg.register(DomainMatcher::accept_all(), i);
        }
        reg
    }

    async fn run(
        providers: Vec<ProviderInstance>,
        orphaned: HashSet<String>,
        config: OrphanConfig,
    ) -> Vec<Action> {
        let registry = registry_with(providers.len());
        let cache = RecordCache::build(&providers).await;
        reconcile_orphans(&orphaned, &registry, &providers, &cache, &config).await
    }

    #[tokio::test]
    async fn additive_mode_never_deletes() {
        let provider = provider_with_mode(owned_records("orphan.example.com", "10.0.0.1"), OperationalMode::Additive);
        let config = OrphanConfig { dry_run: false, ownership_tracking: true };
        let orphaned = HashSet::from(["orphan.example.com".to_string()]);
        let actions = run(vec![provider], orphaned, config).await;
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].action_type, ActionType::Skip);
        assert_eq!(actions[0].error.as_deref(), Some("additive mode — deletions disabled"));
    }

    #[tokio::test]
    async fn managed_mode_deletes_only_owned_records() {
        let owned = provider_with_mode(owned_records("orphan.example.com", "10.0.0.1"), OperationalMode::Managed);
        let config = OrphanConfig { dry_run: false, ownership_tracking: true };
        let orphaned = HashSet::from(["orphan.example.com".to_string()]);
        let actions = run(vec![owned], orphaned, config).await;
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].action_type, ActionType::Delete);
        assert_eq!(actions[0].status, ActionStatus::Success);
    }

    #[tokio::test]
    async fn managed_mode_leaves_unowned_records_alone() {
        let foreign = provider_with_mode(
            vec![Record::new("foreign.example.com", RecordType::A, "10.0.0.2", 300, None)],
            OperationalMode::Managed,
        );
        let config = OrphanConfig { dry_run: false, ownership_tracking: true };
        let orphaned = HashSet::from(["foreign.example.com".to_string()]);
        let actions = run(vec![foreign], orphaned, config).await;
        assert!(actions.is_empty());
    }

    #[tokio::test]
    async fn authoritative_mode_deletes_regardless_of_ownership() {
        let foreign = provider_with_mode(
            vec![Record::new("foreign.example.com", RecordType::A, "10.0.0.2", 300, None)],
            OperationalMode::Authoritative,
        );
        let config = OrphanConfig { dry_run: false, ownership_tracking: true };
        let orphaned = HashSet::from(["foreign.example.com".to_string()]);
        let actions = run(vec![foreign], orphaned, config).await;
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].action_type, ActionType::Delete);
    }

    /// A hostname absent from `orphaned` (because it's still in the current
    /// discovered set, or was never known) is never visited, regardless of
    /// what records a provider happens to hold for it.
    #[tokio::test]
    async fn hostnames_outside_the_orphaned_set_are_never_touched() {
        let provider = provider_with_mode(owned_records("kept.example.com", "10.0.0.1"), OperationalMode::Authoritative);
        let config = OrphanConfig { dry_run: false, ownership_tracking: true };
        let actions = run(vec![provider], HashSet::new(), config).await;
        assert!(actions.is_empty());
    }

    #[tokio::test]
    async fn dry_run_never_mutates_in_authoritative_mode() {
        let provider = provider_with_mode(
            vec![Record::new("foreign.example.com", RecordType::A, "10.0.0.2", 300, None)],
            OperationalMode::Authoritative,
        );
        let config = OrphanConfig { dry_run: true, ownership_tracking: true };
        let orphaned = HashSet::from(["foreign.example.com".to_string()]);
        let actions = run(vec![provider], orphaned, config).await;
        assert_eq!(actions.len(), 1);
        assert!(actions[0].dry_run);
    }

    #[tokio::test]
    async fn managed_mode_without_ownership_tracking_never_deletes() {
        let provider = provider_with_mode(owned_records("orphan.example.com", "10.0.0.1"), OperationalMode::Managed);
        let config = OrphanConfig { dry_run: false, ownership_tracking: false };
        let orphaned = HashSet::from(["orphan.example.com".to_string()]);
        let actions = run(vec![provider], orphaned, config).await;
        assert!(actions.is_empty());
    }

    /// An MX record the adapter lists but doesn't declare support for must
    /// never be deleted, even in authoritative mode (`spec.md` §3
    /// ProviderCapabilities invariant).
    #[tokio::test]
    async fn unsupported_record_types_are_never_deleted() {
        let provider = ProviderInstance::new(
            ProviderInstanceConfig {
                name: "p".to_string(),
                default_record_type: RecordType::A,
                default_target: "10.0.0.1".to_string(),
                default_ttl: 300,
                matcher: DomainMatcher::accept_all(),
                mode: OperationalMode::Authoritative,
            },
            Arc::new(
                InMemoryProvider::new(
                    "p",
                    vec![Record::new("foreign.example.com", RecordType::A, "10.0.0.2", 300, None)],
                )
                .with_capabilities(ProviderCapabilities {
                    supports_ownership_txt: true,
                    supports_native_update: false,
                    supported_record_types: std::collections::HashSet::new(),
                }),
            ),
        );
        let config = OrphanConfig { dry_run: false, ownership_tracking: true };
        let orphaned = HashSet::from(["foreign.example.com".to_string()]);
        let actions = run(vec![provider], orphaned, config).await;
        assert!(actions.is_empty());
    }

    /// An adapter that records which delete method was invoked with which
    /// arguments, so tests can assert dispatch rather than just outcome.
    struct RecordingProvider {
        inner: InMemoryProvider,
        calls: std::sync::Mutex<Vec<String>>,
    }

    #[async_trait::async_trait]
    impl crate::provider::DnsProvider for RecordingProvider {
        fn name(&self) -> &str {
            self.inner.name()
        }
        fn capabilities(&self) -> ProviderCapabilities {
            self.inner.capabilities()
        }
        async fn list(&self) -> Result<Vec<Record>, crate::provider::ProviderError> {
            self.inner.list().await
        }
        async fn get_existing_records(&self, hostname: &str) -> Result<Vec<Record>, crate::provider::ProviderError> {
            self.inner.get_existing_records(hostname).await
        }
        async fn has_ownership_record(&self, hostname: &str) -> Result<bool, crate::provider::ProviderError> {
            self.inner.has_ownership_record(hostname).await
        }
        async fn create_record_with_values(
            &self,
            hostname: &str,
            record_type: RecordType,
            target: &str,
            ttl: u32,
            srv: Option<Srv>,
        ) -> Result<(), crate::provider::ProviderError> {
            self.inner.create_record_with_values(hostname, record_type, target, ttl, srv).await
        }
        async fn delete_record_by_target(
            &self,
            hostname: &str,
            record_type: RecordType,
            target: &str,
        ) -> Result<(), crate::provider::ProviderError> {
            self.calls.lock().unwrap().push(format!("delete_record_by_target({record_type})"));
            self.inner.delete_record_by_target(hostname, record_type, target).await
        }
        async fn delete_srv_record(
            &self,
            hostname: &str,
            target: &str,
            srv: Srv,
        ) -> Result<(), crate::provider::ProviderError> {
            self.calls.lock().unwrap().push("delete_srv_record".to_string());
            self.inner.delete_srv_record(hostname, target, srv).await
        }
        async fn create_ownership_record(&self, hostname: &str) -> Result<(), crate::provider::ProviderError> {
            self.inner.create_ownership_record(hostname).await
        }
        async fn delete_ownership_record(&self, hostname: &str) -> Result<(), crate::provider::ProviderError> {
            self.inner.delete_ownership_record(hostname).await
        }
        async fn recover_owned_hostnames(&self) -> Result<HashSet<String>, crate::provider::ProviderError> {
            self.inner.recover_owned_hostnames().await
        }
    }

    /// Multiple SRV records can share `(hostname, target)` while differing
    /// only in priority/weight/port. Deletion must dispatch through
    /// `delete_srv_record` (exact-subfield match) rather than
    /// `delete_record_by_target` (which only matches on target, and so would
    /// over-match when several SRV records share one).
    #[tokio::test]
    async fn srv_deletion_dispatches_through_delete_srv_record() {
        let srv_a = Srv { priority: 10, weight: 5, port: 443 };
        let srv_b = Srv { priority: 20, weight: 5, port: 443 };
        let records = vec![
            Record::new("_http._tcp.app.example.com", RecordType::Srv, "app.example.com", 300, Some(srv_a)),
            Record::new("_http._tcp.app.example.com", RecordType::Srv, "app.example.com", 300, Some(srv_b)),
        ];
        let adapter = Arc::new(RecordingProvider {
            inner: InMemoryProvider::new("p", records),
            calls: std::sync::Mutex::new(vec![]),
        });
        let provider = ProviderInstance::new(
            ProviderInstanceConfig {
                name: "p".to_string(),
                default_record_type: RecordType::A,
                default_target: "10.0.0.1".to_string(),
                default_ttl: 300,
                matcher: DomainMatcher::accept_all(),
                mode: OperationalMode::Authoritative,
            },
            adapter.clone(),
        );
        let config = OrphanConfig { dry_run: false, ownership_tracking: true };
        let orphaned = HashSet::from(["_http._tcp.app.example.com".to_string()]);

        let actions = run(vec![provider], orphaned, config).await;
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].action_type, ActionType::Delete);

        let calls = adapter.calls.lock().unwrap();
        assert_eq!(calls.len(), 2);
        assert!(calls.iter().all(|c| c == "delete_srv_record"));
    }
}
