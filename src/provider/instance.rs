use std::sync::Arc;

use super::{DnsProvider, ProviderCapabilities, ProviderError};
use crate::hostname::{RecordType, Srv};
use crate::matcher::DomainMatcher;
use crate::record::Record;

/// Per-provider policy controlling deletions (`spec.md` §6 / GLOSSARY).
/// The exact strings are `additive`, `managed`, `authoritative`; empty or
/// unknown is treated as `managed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationalMode {
    /// Never delete.
    Additive,
    /// Delete only records this controller owns (default).
    Managed,
    /// Delete any in-scope record regardless of ownership.
    Authoritative,
}

impl Default for OperationalMode {
    fn default() -> Self {
        OperationalMode::Managed
    }
}

impl std::str::FromStr for OperationalMode {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "additive" => OperationalMode::Additive,
            "authoritative" => OperationalMode::Authoritative,
            _ => OperationalMode::Managed,
        })
    }
}

/// Configuration for one [`ProviderInstance`].
pub struct ProviderInstanceConfig {
    pub name: String,
    pub default_record_type: RecordType,
    pub default_target: String,
    pub default_ttl: u32,
    pub matcher: DomainMatcher,
    pub mode: OperationalMode,
}

/// Binds a [`DnsProvider`] adapter to its record-type/target/TTL defaults,
/// domain matcher and operational mode (`spec.md` §4.C).
pub struct ProviderInstance {
    pub name: String,
    pub default_record_type: RecordType,
    pub default_target: String,
    pub default_ttl: u32,
    pub matcher: DomainMatcher,
    pub mode: OperationalMode,
    adapter: Arc<dyn DnsProvider>,
}

impl ProviderInstance {
    pub fn new(config: ProviderInstanceConfig, adapter: Arc<dyn DnsProvider>) -> Self {
        ProviderInstance {
            name: config.name,
            default_record_type: config.default_record_type,
            default_target: config.default_target,
            default_ttl: config.default_ttl,
            matcher: config.matcher,
            mode: config.mode,
            adapter,
        }
    }

    pub fn capabilities(&self) -> ProviderCapabilities {
        self.adapter.capabilities()
    }

    pub fn matches(&self, hostname: &str) -> bool {
        self.matcher.matches(hostname)
    }

    pub async fn list(&self) -> Result<Vec<Record>, ProviderError> {
        self.adapter.list().await
    }

    pub async fn get_existing_records(&self, hostname: &str) -> Result<Vec<Record>, ProviderError> {
        self.adapter.get_existing_records(hostname).await
    }

    pub async fn has_ownership_record(&self, hostname: &str) -> Result<bool, ProviderError> {
        self.adapter.has_ownership_record(hostname).await
    }

    pub async fn create_record_with_values(
        &self,
        hostname: &str,
        record_type: RecordType,
        target: &str,
        ttl: u32,
        srv: Option<Srv>,
    ) -> Result<(), ProviderError> {
        self.adapter
            .create_record_with_values(hostname, record_type, target, ttl, srv)
            .await
    }

    pub async fn delete_record_by_target(
        &self,
        hostname: &str,
        record_type: RecordType,
        target: &str,
    ) -> Result<(), ProviderError> {
        self.adapter
            .delete_record_by_target(hostname, record_type, target)
            .await
    }

    pub async fn delete_srv_record(
        &self,
        hostname: &str,
        target: &str,
        srv: Srv,
    ) -> Result<(), ProviderError> {
        self.adapter.delete_srv_record(hostname, target, srv).await
    }

    pub async fn create_ownership_record(&self, hostname: &str) -> Result<(), ProviderError> {
        self.adapter.create_ownership_record(hostname).await
    }

    pub async fn delete_ownership_record(&self, hostname: &str) -> Result<(), ProviderError> {
        self.adapter.delete_ownership_record(hostname).await
    }

    pub async fn recover_owned_hostnames(&self) -> Result<std::collections::HashSet<String>, ProviderError> {
        self.adapter.recover_owned_hostnames().await
    }
}
