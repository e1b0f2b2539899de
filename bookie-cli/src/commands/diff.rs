//! `bookie diff <description-dir>`: show how drifted ledger objects differ
//! from the description.

use anyhow::{Context, Result};
use clap::Args;

use bookie_sync::{diff::render_drifts, pipeline, PassMode, ProposalBatch};

use super::SourceArgs;

/// Arguments for `bookie diff`.
#[derive(Args, Debug)]
pub struct DiffArgs {
    #[command(flatten)]
    pub source: SourceArgs,
}

impl DiffArgs {
    pub fn run(self) -> Result<()> {
        let config = super::load_config()?;
        let description = self.source.load_description()?;
        let ledger = self.source.load_ledger(&config)?;

        let mut batch = ProposalBatch::new();
        let report = pipeline::reconcile(&description, &ledger, &mut batch, PassMode::Inspect);
        let diffs = render_drifts(&report.drifts).context("failed to render drift")?;

        let missing = report.summary().missing;
        if diffs.is_empty() {
            println!("No differences.");
        }
        for diff in diffs {
            print!("{}", diff.unified_diff);
            if !diff.unified_diff.ends_with('\n') {
                println!();
            }
        }
        if missing > 0 {
            println!("{missing} object(s) missing from the ledger; run `bookie status` to list them.");
        }
        Ok(())
    }
}
