//! The unit stored in a DNS provider (`spec.md` §3 `Record`).

use std::fmt::Display;

use crate::hostname::{RecordType, Srv};

/// A single DNS record as returned by, or sent to, a provider adapter.
///
/// Records are identified for diffing by the tuple `(lowercase(hostname),
/// type, target, srv-block-if-srv)`; TTL differences alone mean "needs
/// update" but not "different record" (`spec.md` §3).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Record {
    pub hostname: String,
    pub record_type: RecordType,
    pub target: String,
    pub ttl: u32,
    pub srv: Option<Srv>,
}

impl Record {
    pub fn new(
        hostname: impl Into<String>,
        record_type: RecordType,
        target: impl Into<String>,
        ttl: u32,
        srv: Option<Srv>,
    ) -> Self {
        Record {
            hostname: hostname.into(),
            record_type,
            target: target.into(),
            ttl,
            srv,
        }
    }

    /// The `(hostname, type, target, srv)` identity tuple used for diffing.
    pub fn key(&self) -> (String, RecordType, String, Option<Srv>) {
        (
            self.hostname.to_ascii_lowercase(),
            self.record_type,
            self.target.clone(),
            self.srv,
        )
    }
}

impl Display for Record {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} {}", self.hostname, self.record_type, self.target)
    }
}

/// Name of the synthetic TXT record proving ownership of `hostname`
/// (`spec.md` §3/§6): `_dnsweaver.<hostname>`.
pub fn ownership_record_name(hostname: &str) -> String {
    format!("_dnsweaver.{}", hostname)
}

/// The exact ASCII value an ownership TXT record must carry.
pub const OWNERSHIP_HERITAGE_VALUE: &str = "heritage=dnsweaver";

/// Strip the `_dnsweaver.` prefix from a TXT record name, if present.
pub fn hostname_from_ownership_record(name: &str) -> Option<&str> {
    name.strip_prefix("_dnsweaver.")
}
