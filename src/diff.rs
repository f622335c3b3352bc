//! Pure diff engine: given existing and desired record sets, produce
//! create/update/delete/unchanged partitions (`spec.md` §4.E).
//!
//! Nothing in this module touches a provider adapter or performs I/O — it is
//! plain data transformation, used by both the ensure and orphan paths.

use crate::hostname::{RecordType, Srv};
use crate::record::Record;

/// Split `records` into those matching `desired_type` and those that don't —
/// the "type conflict" check in `spec.md` §4.F step 5.
pub fn categorize_same_hostname_records(
    records: &[Record],
    desired_type: RecordType,
) -> (Vec<Record>, Vec<Record>) {
    records
        .iter()
        .cloned()
        .partition(|r| r.record_type == desired_type)
}

/// The record in `records` whose `(type, target, srv)` exactly matches the
/// desired values, if any.
pub fn find_exact_match(
    records: &[Record],
    record_type: RecordType,
    target: &str,
    srv: Option<Srv>,
) -> Option<Record> {
    records
        .iter()
        .find(|r| r.record_type == record_type && r.target == target && r.srv == srv)
        .cloned()
}

/// SRV records in `records` with the same target but different SRV
/// sub-fields than desired — these are stale and must be cleaned up
/// (`spec.md` §4.F step 6).
pub fn find_stale_srv_records(records: &[Record], target: &str, desired_srv: Srv) -> Vec<Record> {
    records
        .iter()
        .filter(|r| {
            r.record_type == RecordType::Srv && r.target == target && r.srv != Some(desired_srv)
        })
        .cloned()
        .collect()
}

/// A record is "unchanged" iff its key matches and its TTL matches (and, for
/// SRV, its sub-fields match — already covered by the key).
pub fn is_unchanged(existing: &Record, desired: &Record) -> bool {
    existing.key() == desired.key() && existing.ttl == desired.ttl
}
