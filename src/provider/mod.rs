//! Interface with DNS providers and get/set records.
//!
//! Providers are DNS backends such as Cloudflare or Route53, accessed
//! through a concrete adapter implementing [`DnsProvider`]. This crate does
//! not ship any concrete adapters (see `spec.md` §1 Out of scope); it only
//! defines the contract and a wrapper, [`ProviderInstance`], that binds an
//! adapter to its defaults, domain matcher and operational mode.

mod error;
mod instance;

pub use error::ProviderError;
pub use instance::{OperationalMode, ProviderInstance, ProviderInstanceConfig};

use std::collections::HashSet;

use async_trait::async_trait;

use crate::hostname::RecordType;
use crate::record::Record;

/// Capabilities a provider adapter declares at construction. The reconciler
/// MUST NOT emit a mutation for a record type absent from
/// `supported_record_types` (`spec.md` §3 invariant).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderCapabilities {
    pub supports_ownership_txt: bool,
    pub supports_native_update: bool,
    pub supported_record_types: HashSet<RecordType>,
}

impl ProviderCapabilities {
    pub fn supports(&self, record_type: RecordType) -> bool {
        self.supported_record_types.contains(&record_type)
    }
}

/// Backend-specific DNS client contract (`spec.md` §4.C / §6).
///
/// Adapters are free to implement `create_record_with_values` as an upsert
/// or as a strict create: the wrapper treats [`ProviderError::Conflict`] as
/// "already present" and [`ProviderError::NotFound`] on delete as success.
#[async_trait]
pub trait DnsProvider: Send + Sync {
    /// A stable name identifying this adapter instance in logs and errors.
    fn name(&self) -> &str;

    fn capabilities(&self) -> ProviderCapabilities;

    /// Every record the adapter currently exposes.
    async fn list(&self) -> Result<Vec<Record>, ProviderError>;

    /// Records for this hostname, excluding TXT.
    async fn get_existing_records(&self, hostname: &str) -> Result<Vec<Record>, ProviderError>;

    /// True iff a TXT at `_dnsweaver.<hostname>` has the exact ownership value.
    async fn has_ownership_record(&self, hostname: &str) -> Result<bool, ProviderError>;

    async fn create_record_with_values(
        &self,
        hostname: &str,
        record_type: RecordType,
        target: &str,
        ttl: u32,
        srv: Option<crate::hostname::Srv>,
    ) -> Result<(), ProviderError>;

    async fn delete_record_by_target(
        &self,
        hostname: &str,
        record_type: RecordType,
        target: &str,
    ) -> Result<(), ProviderError>;

    async fn delete_srv_record(
        &self,
        hostname: &str,
        target: &str,
        srv: crate::hostname::Srv,
    ) -> Result<(), ProviderError>;

    async fn create_ownership_record(&self, hostname: &str) -> Result<(), ProviderError>;

    async fn delete_ownership_record(&self, hostname: &str) -> Result<(), ProviderError>;

    /// Hostnames with an ownership marker in this provider (`spec.md` §4.I).
    async fn recover_owned_hostnames(&self) -> Result<HashSet<String>, ProviderError>;

    /// Only meaningful when `capabilities().supports_native_update`; the
    /// wrapper otherwise models updates as delete-then-create.
    async fn update(&self, _existing: &Record, _desired: &Record) -> Result<(), ProviderError> {
        Err(ProviderError::Internal(
            "native update not supported by this adapter".to_string(),
        ))
    }
}
