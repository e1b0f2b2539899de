//! Bookie: reconcile a declarative sports catalog against a ledger.
//!
//! # Usage
//!
//! ```text
//! bookie sync <description-dir> [--ledger FILE] [--outbox DIR] [--account NAME] [--dry-run]
//! bookie diff <description-dir> [--ledger FILE]
//! bookie status <description-dir> [--ledger FILE] [--json]
//! ```

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{diff::DiffArgs, status::StatusArgs, sync::SyncArgs};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "bookie",
    version,
    about = "Reconcile a declarative sports catalog against a betting ledger",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Propose creates and updates for everything the ledger lacks, as one change-set.
    Sync(SyncArgs),

    /// Show unified diffs for objects whose ledger content has drifted.
    Diff(DiffArgs),

    /// Show the reconciliation state of every described object.
    Status(StatusArgs),
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    match cli.command {
        Commands::Sync(args) => args.run(),
        Commands::Diff(args) => args.run(),
        Commands::Status(args) => args.run(),
    }
}

/// Log to stderr; `RUST_LOG` overrides the default `info` level.
fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
