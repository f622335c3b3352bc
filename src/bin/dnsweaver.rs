mod cli;

use clap::Parser;
use env_logger::Builder;
use log::{error, info};
use tokio::time::interval;
use tokio_util::sync::CancellationToken;

use dnsweaver::reconcile::Reconciler;
use dnsweaver::source::NoopLister;

use cli::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    Builder::new().filter_level(cli.loglevel.into()).init();

    if cli.dry_run {
        info!("Running in dry-run mode, no changes to configured providers will be made");
    }

    // This build ships no concrete orchestrator client or provider adapters
    // (spec.md §1 — those are external collaborators referenced only through
    // their traits). Integrators link a dnsweaver::provider::DnsProvider and
    // a dnsweaver::source::WorkloadLister and construct their own Reconciler
    // via the library API; this binary demonstrates the scheduling loop
    // against an empty configuration.
    let reconciler = Reconciler::new(
        vec![],
        Box::new(NoopLister),
        vec![],
        cli.to_reconciler_config(),
        CancellationToken::new(),
    );

    info!("Recovering known hostnames from provider ownership markers...");
    reconciler.recover().await;

    if cli.run_once {
        run_cycle(&reconciler).await;
        return;
    }

    let mut ticker = interval(std::time::Duration::from_secs(cli.interval));
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                run_cycle(&reconciler).await;
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Received shutdown signal, exiting");
                break;
            }
        }
    }
}

async fn run_cycle(reconciler: &Reconciler) {
    info!("Starting reconciliation cycle");
    match reconciler.run_cycle().await {
        Ok(result) => {
            info!(
                "Cycle complete: {} workload(s) scanned, {} hostname(s) discovered ({} duplicate, {} invalid), {} action(s) ({} failed)",
                result.workloads_scanned,
                result.hostnames_discovered,
                result.hostnames_duplicate,
                result.hostnames_invalid,
                result.actions.len(),
                result.failures().count(),
            );
            for failure in result.failures() {
                error!(
                    "action failed: provider={} hostname={} error={}",
                    failure.provider,
                    failure.hostname,
                    failure.error.as_deref().unwrap_or("unknown")
                );
            }
        }
        Err(e) => error!("Reconciliation cycle aborted: {}", e),
    }
}
