//! `bookie sync`: propose everything the ledger lacks as one change-set.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;

use bookie_sync::{
    pipeline, LedgerSubmit, OutboxSubmitter, ProposalBatch, ReconcileReport, SubmissionReceipt,
    SubmissionStatus,
};

use super::SourceArgs;

/// Arguments for `bookie sync`.
#[derive(Args, Debug)]
pub struct SyncArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Directory change-sets are written to; defaults to `outbox` in the config.
    #[arg(long)]
    pub outbox: Option<PathBuf>,

    /// Account the change-set is proposed from; defaults to `proposing_account` in the config.
    #[arg(long)]
    pub account: Option<String>,

    /// Show what would be proposed without submitting anything.
    #[arg(long)]
    pub dry_run: bool,
}

impl SyncArgs {
    pub fn run(self) -> Result<()> {
        let config = super::load_config()?;
        let description = self.source.load_description()?;
        let ledger = self.source.load_ledger(&config)?;
        let account = self.account.unwrap_or(config.proposing_account);

        let outbox = self.outbox.or(config.outbox).map(OutboxSubmitter::new);
        if outbox.is_none() && !self.dry_run {
            bail!("no outbox configured; pass --outbox or set `outbox` in ~/.bookie/config.yaml");
        }
        let submitter = outbox.as_ref().map(|o| o as &dyn LedgerSubmit);

        let result = pipeline::sync(&description, &ledger, submitter, &account, self.dry_run)
            .context("sync failed")?;

        let prefix = if self.dry_run { "[dry-run] " } else { "" };
        print_outcomes(&result.report, prefix);
        if self.dry_run {
            print_operations(&result.batch);
        }
        if let Some(receipt) = &result.receipt {
            print_receipt(receipt);
        }
        println!("{prefix}{}", result.report.summary());

        let failed = result.report.failures().count();
        if failed > 0 {
            bail!("{failed} object(s) could not be reconciled");
        }
        Ok(())
    }
}

fn print_outcomes(report: &ReconcileReport, prefix: &str) {
    for entry in &report.outcomes {
        println!(
            "{prefix}{:<12} {:<22} {}",
            entry.outcome.label(),
            entry.kind.to_string(),
            entry.identifier
        );
    }
}

fn print_operations(batch: &ProposalBatch) {
    for (index, (identifier, op)) in batch.entries().enumerate() {
        println!(
            "  #{index:<3} {:<28} {:<40} {}",
            op.name(),
            identifier.to_string(),
            op.payload().name().primary().unwrap_or("?")
        );
    }
}

fn print_receipt(receipt: &SubmissionReceipt) {
    match receipt.status {
        SubmissionStatus::Empty => println!("✓ nothing to submit"),
        SubmissionStatus::Accepted => println!(
            "✓ submitted {} operation(s) as change-set {}",
            receipt.operation_count, receipt.fingerprint
        ),
        SubmissionStatus::AlreadySubmitted => println!(
            "✓ change-set {} was already submitted",
            receipt.fingerprint
        ),
    }
    if let Some(location) = &receipt.location {
        println!("  ✎  {}", location.display());
    }
}
