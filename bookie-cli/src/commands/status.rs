//! `bookie status`: reconciliation state of every described object.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use bookie_sync::{
    pipeline::{self, EntityOutcome, Summary},
    Outcome, PassMode, ProposalBatch,
};

use super::SourceArgs;

/// Arguments for `bookie status`.
#[derive(Args, Debug)]
pub struct StatusArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

impl StatusArgs {
    pub fn run(self) -> Result<()> {
        let config = super::load_config()?;
        let description = self.source.load_description()?;
        let ledger = self.source.load_ledger(&config)?;

        let mut batch = ProposalBatch::new();
        let report = pipeline::reconcile(&description, &ledger, &mut batch, PassMode::Inspect);

        if self.json {
            let payload = StatusJson {
                summary: report.summary(),
                objects: &report.outcomes,
            };
            println!(
                "{}",
                serde_json::to_string_pretty(&payload).context("failed to serialize status JSON")?
            );
            return Ok(());
        }

        print_table(&report.outcomes, report.summary());
        Ok(())
    }
}

#[derive(Serialize)]
struct StatusJson<'a> {
    summary: Summary,
    objects: &'a [EntityOutcome],
}

#[derive(Tabled)]
struct StatusRow {
    #[tabled(rename = "")]
    indicator: String,
    #[tabled(rename = "kind")]
    kind: String,
    #[tabled(rename = "object")]
    identifier: String,
    #[tabled(rename = "state")]
    state: String,
    #[tabled(rename = "ledger id")]
    id: String,
}

fn print_table(outcomes: &[EntityOutcome], summary: Summary) {
    println!("Bookie v{} | {summary}", env!("CARGO_PKG_VERSION"));
    if outcomes.is_empty() {
        println!("Nothing described.");
        return;
    }

    let rows: Vec<StatusRow> = outcomes
        .iter()
        .map(|entry| StatusRow {
            indicator: indicator(&entry.outcome),
            kind: entry.kind.to_string(),
            identifier: entry.identifier.clone(),
            state: state_detail(&entry.outcome),
            id: ledger_id(&entry.outcome),
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");

    if summary.missing + summary.stale > 0 {
        println!("Run 'bookie sync' to propose the missing and stale objects.");
    }
}

fn indicator(outcome: &Outcome) -> String {
    match outcome {
        Outcome::Synchronized { .. } => "■".green().bold().to_string(),
        Outcome::Missing | Outcome::Created { .. } => "■".yellow().bold().to_string(),
        Outcome::Stale { .. } | Outcome::Updated { .. } => "■".magenta().bold().to_string(),
        Outcome::Failed { .. } => "■".red().bold().to_string(),
    }
}

fn state_detail(outcome: &Outcome) -> String {
    match outcome {
        Outcome::Failed { error } => format!("failed: {error}"),
        other => other.label().to_string(),
    }
}

fn ledger_id(outcome: &Outcome) -> String {
    match outcome {
        Outcome::Synchronized { id } | Outcome::Updated { id } | Outcome::Stale { id } => {
            id.to_string()
        }
        _ => "-".to_string(),
    }
}
