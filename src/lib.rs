//! Main crate for the `dnsweaver` application.
//!
//! A long-running controller that keeps DNS records across one or more
//! external providers in sync with the hostnames advertised by workloads on
//! a container orchestrator. The following modules might be of interest if
//! you want to add new functionality:
//! - [`source`]s turn workload labels into candidate hostnames
//! - [`provider`] adapters talk to DNS backends such as Cloudflare or Route53
//! - [`reconcile`] is the reconciliation engine: discovery → cache → diff →
//!   ensure/orphan → ownership tracking

#![allow(clippy::uninlined_format_args)]

pub mod cache;
pub mod config;
pub mod diff;
pub mod hostname;
pub mod known_hosts;
pub mod matcher;
pub mod provider;
pub mod reconcile;
pub mod record;
pub mod recovery;
pub mod source;
