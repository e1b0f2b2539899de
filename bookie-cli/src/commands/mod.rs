pub mod diff;
pub mod status;
pub mod sync;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use bookie_core::{config, description, BookieConfig, Description};
use bookie_sync::SnapshotLedger;

/// Arguments every command shares: where the description and the ledger live.
#[derive(Args, Debug)]
pub struct SourceArgs {
    /// Description directory (`sports/` and optional `events/`).
    pub description: PathBuf,

    /// Ledger snapshot (JSON). Falls back to `ledger` in the config, then to an empty ledger.
    #[arg(long)]
    pub ledger: Option<PathBuf>,
}

impl SourceArgs {
    pub fn load_description(&self) -> Result<Description> {
        description::load_description_at(&self.description).with_context(|| {
            format!(
                "failed to load description from {}",
                self.description.display()
            )
        })
    }

    pub fn load_ledger(&self, config: &BookieConfig) -> Result<SnapshotLedger> {
        let Some(path) = self.ledger.as_ref().or(config.ledger.as_ref()) else {
            tracing::warn!("no ledger snapshot configured, reconciling against an empty ledger");
            return Ok(SnapshotLedger::new());
        };
        SnapshotLedger::load_at(path)
            .with_context(|| format!("failed to load ledger snapshot {}", path.display()))
    }
}

pub fn load_config() -> Result<BookieConfig> {
    config::load_config().context("failed to load ~/.bookie/config.yaml")
}
