//! Reconciler — ensure path (`spec.md` §4.F).
//!
//! For each discovered hostname, selects providers, consults the cache,
//! and applies create/update/skip semantics including type-conflict and
//! adoption rules. This is new logic (the teacher only ever manages a
//! single A record for a single address); it generalizes the teacher's
//! `Plan::generate` owned/available partitioning into the richer
//! per-provider state machine the spec requires, while keeping the
//! teacher's "log, then act" narration style (`executor/mod.rs`).

use crate::cache::RecordCache;
use crate::diff::{categorize_same_hostname_records, find_exact_match, find_stale_srv_records};
use crate::hostname::Hostname;
use crate::matcher::MatcherRegistry;
use crate::provider::ProviderInstance;
use crate::reconcile::result::{Action, ActionType};

pub struct EnsureConfig {
    pub dry_run: bool,
    pub ownership_tracking: bool,
    pub adopt_existing: bool,
}

/// Ensure a single hostname is up to date across every matching provider
/// instance. Returns one `Action` per selected provider (§8 invariant 1).
pub async fn ensure_hostname(
    hostname: &Hostname,
    providers_by_name: &MatcherRegistry<usize>,
    providers: &[ProviderInstance],
    cache: &RecordCache,
    config: &EnsureConfig,
) -> Vec<Action> {
    let selected = select_providers(hostname, providers_by_name, providers);
    let Some(selected) = selected else {
        return vec![Action::skip(
            "<none>",
            hostname.name(),
            match hostname.hints().provider {
                Some(_) => "explicit provider not found",
                None => "no matching provider",
            },
        )];
    };

    let mut actions = Vec::with_capacity(selected.len());
    for provider in selected {
        actions.push(ensure_for_provider(hostname, provider, cache, config).await);
    }
    actions
}

fn select_providers<'a>(
    hostname: &Hostname,
    providers_by_name: &MatcherRegistry<usize>,
    providers: &'a [ProviderInstance],
) -> Option<Vec<&'a ProviderInstance>> {
    if let Some(explicit) = &hostname.hints().provider {
        return providers
            .iter()
            .find(|p| &p.name == explicit)
            .map(|p| vec![p]);
    }
    let indices = providers_by_name.matching(hostname.name());
    if indices.is_empty() {
        return None;
    }
    Some(indices.into_iter().map(|i| &providers[*i]).collect())
}

async fn ensure_for_provider(
    hostname: &Hostname,
    provider: &ProviderInstance,
    cache: &RecordCache,
    config: &EnsureConfig,
) -> Action {
    let hints = hostname.hints();
    let effective_type = hints.record_type.unwrap_or(provider.default_record_type);
    let effective_target = hints
        .target
        .clone()
        .unwrap_or_else(|| provider.default_target.clone());
    let effective_ttl = hints.ttl.unwrap_or(provider.default_ttl);
    let effective_srv = if effective_type == crate::hostname::RecordType::Srv {
        hints.srv
    } else {
        None
    };

    let capabilities = provider.capabilities();
    if !capabilities.supports(effective_type) {
        return Action::skip(
            &provider.name,
            hostname.name(),
            format!("unsupported record type: {}", effective_type),
        );
    }

    if config.dry_run {
        return Action::success(
            ActionType::Create,
            &provider.name,
            hostname.name(),
            effective_type,
            effective_target,
            true,
        );
    }

    let existing = match cache.get_existing_records(&provider.name, hostname.name()) {
        (records, true) => records,
        (_, false) => match provider.get_existing_records(hostname.name()).await {
            Ok(records) => records,
            Err(e) => {
                log::warn!(
                    "direct query for {} in {} failed, proceeding with empty existing set: {}",
                    hostname.name(),
                    provider.name,
                    e
                );
                vec![]
            }
        },
    };

    let (same_type, conflicting_type) = categorize_same_hostname_records(&existing, effective_type);
    if !conflicting_type.is_empty() {
        let types: Vec<String> = conflicting_type
            .iter()
            .map(|r| r.record_type.to_string())
            .collect();
        return Action::skip(
            &provider.name,
            hostname.name(),
            format!(
                "type conflict: existing [{}] conflict with {}",
                types.join(", "),
                effective_type
            ),
        );
    }

    if let Some(srv) = effective_srv {
        for stale in find_stale_srv_records(&same_type, &effective_target, srv) {
            if let Err(e) = provider
                .delete_srv_record(hostname.name(), &stale.target, stale.srv.unwrap())
                .await
            {
                log::warn!(
                    "failed to clean up stale SRV record for {} in {}: {}",
                    hostname.name(),
                    provider.name,
                    e
                );
            }
        }
    }

    let exact_match = find_exact_match(&same_type, effective_type, &effective_target, effective_srv);

    if exact_match.is_some() {
        return handle_exact_match(hostname, provider, config).await;
    }

    if !same_type.is_empty() {
        return replace_and_create(
            hostname,
            provider,
            &same_type,
            effective_type,
            &effective_target,
            effective_ttl,
            effective_srv,
            config,
        )
        .await;
    }

    fresh_create(
        hostname,
        provider,
        effective_type,
        &effective_target,
        effective_ttl,
        effective_srv,
        config,
    )
    .await
}

async fn handle_exact_match(
    hostname: &Hostname,
    provider: &ProviderInstance,
    config: &EnsureConfig,
) -> Action {
    let skip = Action::skip(&provider.name, hostname.name(), "record already exists");

    if !config.ownership_tracking {
        return skip;
    }

    let owned = provider
        .has_ownership_record(hostname.name())
        .await
        .unwrap_or(false);

    if owned {
        ensure_ownership_record(hostname, provider, config).await;
        return skip;
    }

    if config.adopt_existing {
        ensure_ownership_record(hostname, provider, config).await;
        return skip;
    }

    // Foreign record, adoption disabled: leave it untouched (§8 invariant 2).
    skip
}

#[allow(clippy::too_many_arguments)]
async fn replace_and_create(
    hostname: &Hostname,
    provider: &ProviderInstance,
    same_type: &[crate::record::Record],
    effective_type: crate::hostname::RecordType,
    effective_target: &str,
    effective_ttl: u32,
    effective_srv: Option<crate::hostname::Srv>,
    config: &EnsureConfig,
) -> Action {
    for record in same_type {
        if let Err(e) = provider
            .delete_record_by_target(hostname.name(), record.record_type, &record.target)
            .await
        {
            if !e.is_not_found() {
                log::warn!(
                    "failed to delete stale record for {} in {}: {}",
                    hostname.name(),
                    provider.name,
                    e
                );
            }
        }
    }

    match provider
        .create_record_with_values(
            hostname.name(),
            effective_type,
            effective_target,
            effective_ttl,
            effective_srv,
        )
        .await
    {
        Ok(()) => {
            ensure_ownership_record(hostname, provider, config).await;
            Action::success(
                ActionType::Update,
                &provider.name,
                hostname.name(),
                effective_type,
                effective_target,
                false,
            )
        }
        Err(e) if e.is_conflict() || e.is_type_conflict() => {
            Action::skip(&provider.name, hostname.name(), e.to_string())
        }
        Err(e) => Action::failed(ActionType::Update, &provider.name, hostname.name(), e.to_string()),
    }
}

async fn fresh_create(
    hostname: &Hostname,
    provider: &ProviderInstance,
    effective_type: crate::hostname::RecordType,
    effective_target: &str,
    effective_ttl: u32,
    effective_srv: Option<crate::hostname::Srv>,
    config: &EnsureConfig,
) -> Action {
    match provider
        .create_record_with_values(
            hostname.name(),
            effective_type,
            effective_target,
            effective_ttl,
            effective_srv,
        )
        .await
    {
        Ok(()) => {
            ensure_ownership_record(hostname, provider, config).await;
            Action::success(
                ActionType::Create,
                &provider.name,
                hostname.name(),
                effective_type,
                effective_target,
                false,
            )
        }
        Err(e) if e.is_conflict() || e.is_type_conflict() => {
            Action::skip(&provider.name, hostname.name(), e.to_string())
        }
        Err(e) => Action::failed(ActionType::Create, &provider.name, hostname.name(), e.to_string()),
    }
}

/// Idempotent re-create of the ownership marker. A `Conflict` (marker
/// already has the right value) is suppressed; any other error is logged as
/// a warning — the main record create already succeeded.
async fn ensure_ownership_record(hostname: &Hostname, provider: &ProviderInstance, config: &EnsureConfig) {
    if !config.ownership_tracking {
        return;
    }
    if let Err(e) = provider.create_ownership_record(hostname.name()).await {
        if !e.is_conflict() {
            log::warn!(
                "failed to create ownership marker for {} in {}: {}",
                hostname.name(),
                provider.name,
                e
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hostname::{RecordHints, RecordType};
    use crate::matcher::DomainMatcher;
    use crate::provider::mock::InMemoryProvider;
    use crate::provider::{OperationalMode, ProviderInstanceConfig};
    use crate::record::{ownership_record_name, Record, OWNERSHIP_HERITAGE_VALUE};
    use crate::reconcile::result::ActionStatus;
    use std::sync::Arc;

    fn provider_instance(name: &str, records: Vec<Record>) -> ProviderInstance {
        ProviderInstance::new(
            ProviderInstanceConfig {
                name: name.to_string(),
                default_record_type: RecordType::A,
                default_target: "10.0.0.1".to_string(),
                default_ttl: 300,
                matcher: DomainMatcher::accept_all(),
                mode: OperationalMode::Managed,
            },
            Arc::new(InMemoryProvider::new(name, records)),
        )
    }

    // Tests route by explicit `MatcherRegistry` index rather than via each
    // provider's own `matcher` field, to keep provider construction and
    // registry construction independent of each other here.
    fn accept_all_registry(count: usize) -> MatcherRegistry<usize> {
        let mut reg = MatcherRegistry::new();
        for i in 0..count {
            reg.register(DomainMatcher::accept_all(), i);
        }
        reg
    }

    #[tokio::test]
    async fn fresh_create_emits_create_and_ownership_marker() {
        let provider = provider_instance("p", vec![]);
        let registry = accept_all_registry(1);
        let hostname = Hostname::new("app.example.com", "traefik", None, RecordHints::default()).unwrap();
        let cache = RecordCache::build(std::slice::from_ref(&provider)).await;
        let config = EnsureConfig {
            dry_run: false,
            ownership_tracking: true,
            adopt_existing: false,
        };

        let actions = ensure_hostname(&hostname, &registry, std::slice::from_ref(&provider), &cache, &config).await;
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].action_type, ActionType::Create);
        assert_eq!(actions[0].status, ActionStatus::Success);
    }

    #[tokio::test]
    async fn exact_match_with_no_marker_and_no_adoption_leaves_foreign_record_untouched() {
        let existing = Record::new("app.example.com", RecordType::A, "10.0.0.1", 300, None);
        let provider = provider_instance("p", vec![existing]);
        let registry = accept_all_registry(1);
        let hostname = Hostname::new("app.example.com", "traefik", None, RecordHints::default()).unwrap();
        let cache = RecordCache::build(std::slice::from_ref(&provider)).await;
        let config = EnsureConfig {
            dry_run: false,
            ownership_tracking: true,
            adopt_existing: false,
        };

        let actions = ensure_hostname(&hostname, &registry, std::slice::from_ref(&provider), &cache, &config).await;
        assert_eq!(actions[0].action_type, ActionType::Skip);
        // No ownership marker should have been created.
        assert!(!provider.has_ownership_record("app.example.com").await.unwrap());
    }

    #[tokio::test]
    async fn type_conflict_skips_without_deleting() {
        let existing = Record::new("app.example.com", RecordType::Cname, "proxy.example.com", 300, None);
        let provider = provider_instance("p", vec![existing]);
        let registry = accept_all_registry(1);
        let hostname = Hostname::new("app.example.com", "traefik", None, RecordHints::default()).unwrap();
        let cache = RecordCache::build(std::slice::from_ref(&provider)).await;
        let config = EnsureConfig {
            dry_run: false,
            ownership_tracking: true,
            adopt_existing: false,
        };

        let actions = ensure_hostname(&hostname, &registry, std::slice::from_ref(&provider), &cache, &config).await;
        assert_eq!(actions[0].action_type, ActionType::Skip);
        assert!(actions[0].error.as_ref().unwrap().contains("type conflict"));
        let remaining = provider.get_existing_records("app.example.com").await.unwrap();
        assert_eq!(remaining.len(), 1);
    }

    #[tokio::test]
    async fn target_change_produces_update() {
        let existing = vec![
            Record::new("app.example.com", RecordType::A, "10.0.0.99", 300, None),
            Record::new(
                ownership_record_name("app.example.com"),
                RecordType::Txt,
                OWNERSHIP_HERITAGE_VALUE,
                60,
                None,
            ),
        ];
        let provider = provider_instance("p", existing);
        let registry = accept_all_registry(1);
        let hostname = Hostname::new("app.example.com", "traefik", None, RecordHints::default()).unwrap();
        let cache = RecordCache::build(std::slice::from_ref(&provider)).await;
        let config = EnsureConfig {
            dry_run: false,
            ownership_tracking: true,
            adopt_existing: false,
        };

        let actions = ensure_hostname(&hostname, &registry, std::slice::from_ref(&provider), &cache, &config).await;
        assert_eq!(actions[0].action_type, ActionType::Update);
        assert_eq!(actions[0].status, ActionStatus::Success);
        let remaining = provider.get_existing_records("app.example.com").await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].target, "10.0.0.1");
        assert!(provider.has_ownership_record("app.example.com").await.unwrap());
    }

    #[tokio::test]
    async fn dry_run_never_touches_the_adapter() {
        let provider = provider_instance("p", vec![]);
        let registry = accept_all_registry(1);
        let hostname = Hostname::new("app.example.com", "traefik", None, RecordHints::default()).unwrap();
        let cache = RecordCache::build(std::slice::from_ref(&provider)).await;
        let config = EnsureConfig {
            dry_run: true,
            ownership_tracking: true,
            adopt_existing: false,
        };

        let actions = ensure_hostname(&hostname, &registry, std::slice::from_ref(&provider), &cache, &config).await;
        assert_eq!(actions[0].action_type, ActionType::Create);
        assert!(actions[0].dry_run);
        assert!(provider.snapshot().is_empty());
    }

    #[tokio::test]
    async fn no_matching_provider_emits_skip() {
        let hostname = Hostname::new("app.example.com", "traefik", None, RecordHints::default()).unwrap();
        let providers: Vec<ProviderInstance> = vec![];
        let registry = accept_all_registry(0);
        let cache = RecordCache::build(&providers).await;
        let config = EnsureConfig {
            dry_run: false,
            ownership_tracking: true,
            adopt_existing: false,
        };
        let actions = ensure_hostname(&hostname, &registry, &providers, &cache, &config).await;
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].action_type, ActionType::Skip);
        assert_eq!(actions[0].error.as_deref(), Some("no matching provider"));
    }

    #[tokio::test]
    async fn unsupported_record_type_is_skipped() {
        use std::collections::HashSet as HS;
        let provider = provider_instance("p", vec![]).capabilities_override_for_test(HS::from([RecordType::Cname]));
        let registry = accept_all_registry(1);
        let hostname = Hostname::new("app.example.com", "traefik", None, RecordHints::default()).unwrap();
        let cache = RecordCache::build(std::slice::from_ref(&provider)).await;
        let config = EnsureConfig {
            dry_run: false,
            ownership_tracking: true,
            adopt_existing: false,
        };
        let actions = ensure_hostname(&hostname, &registry, std::slice::from_ref(&provider), &cache, &config).await;
        assert_eq!(actions[0].action_type, ActionType::Skip);
        assert!(actions[0].error.as_ref().unwrap().contains("unsupported record type"));
    }

    // test-only extension point so `unsupported_record_type_is_skipped` can
    // build a provider whose capability set excludes the default type.
    trait TestCapabilitiesExt {
        fn capabilities_override_for_test(self, types: std::collections::HashSet<RecordType>) -> ProviderInstance;
    }
    impl TestCapabilitiesExt for ProviderInstance {
        fn capabilities_override_for_test(self, types: std::collections::HashSet<RecordType>) -> ProviderInstance {
            let name = self.name.clone();
            let adapter = Arc::new(
                InMemoryProvider::new(name.clone(), vec![]).with_capabilities(crate::provider::ProviderCapabilities {
                    supports_ownership_txt: true,
                    supports_native_update: false,
                    supported_record_types: types,
                }),
            );
            ProviderInstance::new(
                ProviderInstanceConfig {
                    name,
                    default_record_type: self.default_record_type,
                    default_target: self.default_target,
                    default_ttl: self.default_ttl,
                    matcher: DomainMatcher::accept_all(),
                    mode: self.mode,
                },
                adapter,
            )
        }
    }
}
