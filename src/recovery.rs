//! On startup, rebuild the known-hostname set by scanning every provider for
//! ownership markers (`spec.md` §4.I).
//!
//! A failure against one provider instance is logged and ignored — partial
//! recovery is acceptable; it only narrows which orphans the first cycle can
//! safely clean up, it never causes incorrect deletions.

use std::collections::HashSet;

use futures::future::join_all;

use crate::provider::ProviderInstance;

/// Runs once before the first reconciliation cycle, and only if both
/// cleanup-orphans and ownership-tracking are globally enabled; otherwise a
/// no-op (callers should simply not call this). Providers are scanned
/// concurrently, same as the per-cycle record cache build.
pub async fn recover_known_hostnames(providers: &[ProviderInstance]) -> HashSet<String> {
    let fetches = providers.iter().map(|p| async move {
        let result = p.recover_owned_hostnames().await;
        (p.name.as_str(), result)
    });
    let results = join_all(fetches).await;

    let mut known = HashSet::new();
    for (name, result) in results {
        match result {
            Ok(hostnames) => {
                log::info!("recovered {} owned hostname(s) from provider {}", hostnames.len(), name);
                known.extend(hostnames);
            }
            Err(e) => {
                log::warn!(
                    "ownership recovery failed for provider {}: {} (continuing with partial recovery)",
                    name,
                    e
                );
            }
        }
    }
    known
}
