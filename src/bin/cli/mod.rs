use clap::Parser;

macro_rules! env_prefix {
    () => {
        "DNSWEAVER_"
    };
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Set the loglevel of the application
    #[arg(
        value_enum,
        short = 'l',
        long,
        default_value_t = Loglevel::Info,
        value_name = "LEVEL",
        env = concat!(env_prefix!(), "LOGLEVEL")
    )]
    pub loglevel: Loglevel,

    /// Only run one reconciliation cycle, then exit
    #[arg(long, default_value_t = false, action)]
    pub run_once: bool,

    /// Time to wait between reconciliation cycles, in seconds
    #[arg(
        short = 'i',
        long,
        default_value_t = 60,
        env = concat!(env_prefix!(), "INTERVAL")
    )]
    pub interval: u64,

    /// Do not make any changes to configured providers, only show what would happen
    #[arg(long, short = 'd', action, default_value_t = false)]
    pub dry_run: bool,

    /// Disable globally; the reconciler will return empty results for every cycle
    #[arg(long, action, default_value_t = false, env = concat!(env_prefix!(), "DISABLED"))]
    pub disabled: bool,

    /// Disable ownership-marker tracking; foreign records may be adopted and
    /// orphan cleanup in managed mode will never delete anything
    #[arg(long, action, default_value_t = false, env = concat!(env_prefix!(), "DISABLE_OWNERSHIP_TRACKING"))]
    pub disable_ownership_tracking: bool,

    /// Adopt pre-existing foreign records by writing an ownership marker,
    /// instead of leaving them untouched
    #[arg(long, action, default_value_t = false, env = concat!(env_prefix!(), "ADOPT_EXISTING"))]
    pub adopt_existing: bool,

    /// Disable orphan cleanup entirely, regardless of per-provider mode
    #[arg(long, action, default_value_t = false, env = concat!(env_prefix!(), "DISABLE_CLEANUP_ORPHANS"))]
    pub disable_cleanup_orphans: bool,
}

use clap::ValueEnum;
use log::LevelFilter;

/// Used to set the application's loglevel.
// This is essentially a re-creation of log::Level. However, that enum doesn't derive ValueEnum, so we have to do it manually here
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, ValueEnum)]
pub enum Loglevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}
impl From<Loglevel> for LevelFilter {
    fn from(ll: Loglevel) -> Self {
        match ll {
            Loglevel::Error => LevelFilter::Error,
            Loglevel::Warn => LevelFilter::Warn,
            Loglevel::Info => LevelFilter::Info,
            Loglevel::Debug => LevelFilter::Debug,
            Loglevel::Trace => LevelFilter::Trace,
        }
    }
}

impl Cli {
    pub fn to_reconciler_config(&self) -> dnsweaver::config::ReconcilerConfig {
        dnsweaver::config::ReconcilerConfig {
            disabled: self.disabled,
            dry_run: self.dry_run,
            ownership_tracking: !self.disable_ownership_tracking,
            adopt_existing: self.adopt_existing,
            cleanup_orphans: !self.disable_cleanup_orphans,
            interval: std::time::Duration::from_secs(self.interval),
        }
    }
}
