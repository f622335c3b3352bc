//! Per-reconciliation-cycle snapshot of every provider's records.
//!
//! Built once per cycle by calling each provider's `list()` concurrently
//! (`spec.md` §5); read-only for the remainder of the cycle. A provider
//! whose `list()` call failed gets a cache miss sentinel (`None`) instead of
//! aborting the cycle — callers fall back to direct adapter queries.

use std::collections::HashMap;

use futures::future::join_all;

use crate::hostname::RecordType;
use crate::provider::ProviderInstance;
use crate::record::Record;

/// `map<provider_name, Option<map<lowercase_hostname, records>>>`. `None`
/// means this provider's `list()` failed during cache construction.
pub struct RecordCache {
    by_provider: HashMap<String, Option<HashMap<String, Vec<Record>>>>,
}

impl RecordCache {
    /// Call every provider's `list()` concurrently and index the results by
    /// lowercase hostname.
    pub async fn build(providers: &[ProviderInstance]) -> Self {
        let fetches = providers.iter().map(|p| async move {
            let result = p.list().await;
            (p.name.clone(), result)
        });
        let results = join_all(fetches).await;

        let mut by_provider = HashMap::new();
        for (name, result) in results {
            match result {
                Ok(records) => {
                    let mut by_host: HashMap<String, Vec<Record>> = HashMap::new();
                    for record in records {
                        by_host
                            .entry(record.hostname.to_ascii_lowercase())
                            .or_default()
                            .push(record);
                    }
                    by_provider.insert(name, Some(by_host));
                }
                Err(e) => {
                    log::warn!(
                        "cache miss for provider {}: list() failed: {}",
                        name,
                        e
                    );
                    by_provider.insert(name, None);
                }
            }
        }
        RecordCache { by_provider }
    }

    /// Non-TXT records for `(provider, hostname)`. Second element is `true`
    /// if this came from the cache rather than a (non-existent) direct query
    /// — callers needing a direct fallback must perform it themselves when
    /// this returns `(vec![], false)`.
    pub fn get_existing_records(&self, provider: &str, hostname: &str) -> (Vec<Record>, bool) {
        match self.all_records_for_hostname(provider, hostname) {
            Some(records) => (
                records
                    .into_iter()
                    .filter(|r| r.record_type != RecordType::Txt)
                    .collect(),
                true,
            ),
            None => (vec![], false),
        }
    }

    /// Every record type for `(provider, hostname)`, including TXT, or
    /// `None` on cache miss.
    pub fn all_records_for_hostname(&self, provider: &str, hostname: &str) -> Option<Vec<Record>> {
        let key = hostname.to_ascii_lowercase();
        self.by_provider
            .get(provider)
            .and_then(|inner| inner.as_ref())
            .map(|by_host| by_host.get(&key).cloned().unwrap_or_default())
    }

    pub fn has_ownership_record(&self, provider: &str, hostname: &str) -> Option<bool> {
        let marker = crate::record::ownership_record_name(hostname).to_ascii_lowercase();
        self.by_provider
            .get(provider)
            .and_then(|inner| inner.as_ref())
            .map(|by_host| {
                by_host.get(&marker).is_some_and(|records| {
                    records.iter().any(|r| {
                        r.record_type == RecordType::Txt
                            && r.target == crate::record::OWNERSHIP_HERITAGE_VALUE
                    })
                })
            })
    }

    pub fn is_cache_hit(&self, provider: &str) -> bool {
        matches!(self.by_provider.get(provider), Some(Some(_)))
    }
}
