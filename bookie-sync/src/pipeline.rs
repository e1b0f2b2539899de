//! Reconciliation pass: walks every described sport depth-first, drives each
//! entity through discovery and comparison, and either appends proposals to
//! the batch or records what it would do.
//!
//! A failing object is recorded and its subtree skipped; siblings carry on.
//! The walk never flushes; [`sync`] is the entrypoint that walks and then
//! submits the batch as one change-set.

use std::fmt;

use serde::Serialize;

use bookie_core::{
    Description, EntityKind, EventDeclaration, Identifier, RemoteRef, SportScheme,
    ValidationError,
};

use crate::batch::{Payload, ProposalBatch};
use crate::entity::{BettingMarketGroup, Event, EventGroup, Reconcilable, Sport};
use crate::error::ReconcileError;
use crate::ledger::{LedgerQuery, LedgerSubmit, RemoteObjectView, SubmissionReceipt};
use crate::state::ReconcileState;

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// Whether a pass may append to the batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassMode {
    /// Append creates for absent objects and updates for stale ones.
    Propose,
    /// Append nothing; record drift for stale objects instead.
    Inspect,
}

/// What happened to one object during a pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    Synchronized { id: RemoteRef },
    Created { reference: RemoteRef },
    Updated { id: RemoteRef },
    /// Inspect mode: would be created.
    Missing,
    /// Inspect mode: would be updated.
    Stale { id: RemoteRef },
    Failed { error: String },
}

impl Outcome {
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Synchronized { .. } => "synchronized",
            Outcome::Created { .. } => "create",
            Outcome::Updated { .. } => "update",
            Outcome::Missing => "missing",
            Outcome::Stale { .. } => "stale",
            Outcome::Failed { .. } => "failed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntityOutcome {
    pub identifier: String,
    pub kind: EntityKind,
    #[serde(flatten)]
    pub outcome: Outcome,
}

/// Remote and local content of a stale object.
#[derive(Debug, Clone, PartialEq)]
pub struct Drift {
    pub identifier: Identifier,
    pub id: RemoteRef,
    pub remote: Option<RemoteObjectView>,
    pub local: Payload,
}

/// Outcome counts of a pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub synchronized: usize,
    pub created: usize,
    pub updated: usize,
    pub missing: usize,
    pub stale: usize,
    pub failed: usize,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} synchronized, {} to create, {} to update, {} failed",
            self.synchronized,
            self.created + self.missing,
            self.updated + self.stale,
            self.failed
        )
    }
}

/// Per-object outcomes of a pass, parents before children.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReconcileReport {
    pub outcomes: Vec<EntityOutcome>,
    pub drifts: Vec<Drift>,
}

impl ReconcileReport {
    pub fn failures(&self) -> impl Iterator<Item = &EntityOutcome> {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.outcome, Outcome::Failed { .. }))
    }

    pub fn has_failures(&self) -> bool {
        self.failures().next().is_some()
    }

    pub fn outcome_of(&self, identifier: &str) -> Option<&Outcome> {
        self.outcomes
            .iter()
            .find(|o| o.identifier == identifier)
            .map(|o| &o.outcome)
    }

    pub fn summary(&self) -> Summary {
        let mut summary = Summary::default();
        for entry in &self.outcomes {
            match entry.outcome {
                Outcome::Synchronized { .. } => summary.synchronized += 1,
                Outcome::Created { .. } => summary.created += 1,
                Outcome::Updated { .. } => summary.updated += 1,
                Outcome::Missing => summary.missing += 1,
                Outcome::Stale { .. } => summary.stale += 1,
                Outcome::Failed { .. } => summary.failed += 1,
            }
        }
        summary
    }
}

// ---------------------------------------------------------------------------
// Walk
// ---------------------------------------------------------------------------

/// Run one pass over every sport and event of `description`.
pub fn reconcile(
    description: &Description,
    ledger: &dyn LedgerQuery,
    batch: &mut ProposalBatch,
    mode: PassMode,
) -> ReconcileReport {
    let mut walker = Walker {
        ledger,
        batch,
        mode,
        report: ReconcileReport::default(),
    };
    for scheme in &description.sports {
        walker.sport(scheme, description);
    }
    for declaration in &description.events {
        if description.sport(&declaration.sport).is_none() {
            let err = ValidationError::UnknownSport {
                sport: declaration.sport.clone(),
            };
            walker.fail(event_label(declaration), EntityKind::Event, &err.into());
        }
    }

    let report = walker.report;
    tracing::info!("pass complete: {}", report.summary());
    report
}

struct Walker<'l, 'b> {
    ledger: &'l dyn LedgerQuery,
    batch: &'b mut ProposalBatch,
    mode: PassMode,
    report: ReconcileReport,
}

impl Walker<'_, '_> {
    fn sport(&mut self, scheme: &SportScheme, description: &Description) {
        for declaration in description.events_for(&scheme.identifier) {
            if scheme.eventgroup(&declaration.eventgroup).is_none() {
                let err = ValidationError::UnknownEventGroup {
                    sport: scheme.identifier.clone(),
                    eventgroup: declaration.eventgroup.clone(),
                };
                self.fail(event_label(declaration), EntityKind::Event, &err.into());
            }
        }

        let mut sport = match Sport::new(scheme) {
            Ok(sport) => sport,
            Err(err) => {
                self.fail(scheme.identifier.clone(), EntityKind::Sport, &err);
                return self.skip_events(scheme, None, &scheme.identifier, description);
            }
        };
        if !self.step(&mut sport) {
            return self.skip_events(scheme, None, &scheme.identifier, description);
        }

        for (result, group_scheme) in sport.event_groups().into_iter().zip(&scheme.eventgroups) {
            let mut group = match result {
                Ok(group) => group,
                Err(err) => {
                    let label = Identifier::derive(
                        Some(sport.identifier()),
                        &[group_scheme.identifier.as_str()],
                    );
                    self.fail(label.to_string(), EntityKind::EventGroup, &err);
                    let group_id = Some(group_scheme.identifier.as_str());
                    self.skip_events(scheme, group_id, label.as_str(), description);
                    continue;
                }
            };
            if self.step(&mut group) {
                self.events(&group, description);
            } else {
                let group_id = Some(group_scheme.identifier.as_str());
                self.skip_events(scheme, group_id, group.identifier().as_str(), description);
            }
        }
    }

    /// Fail the declared events below a parent that did not reconcile: those
    /// of `group`, or of every known group of the sport when `None`.
    fn skip_events(
        &mut self,
        scheme: &SportScheme,
        group: Option<&str>,
        parent: &str,
        description: &Description,
    ) {
        let declarations = description
            .events_for(&scheme.identifier)
            .filter(|d| scheme.eventgroup(&d.eventgroup).is_some())
            .filter(|d| group.map_or(true, |g| d.eventgroup == g));
        for declaration in declarations {
            let identifier = event_label(declaration);
            tracing::debug!("event {identifier}: skipped, parent {parent} failed");
            self.report.outcomes.push(EntityOutcome {
                identifier,
                kind: EntityKind::Event,
                outcome: Outcome::Failed {
                    error: format!("parent {parent} failed"),
                },
            });
        }
    }

    fn events(&mut self, group: &EventGroup<'_>, description: &Description) {
        let sport = &group.sport().scheme().identifier;
        let group_id = &group.scheme().identifier;
        let declarations = description
            .events
            .iter()
            .filter(|d| &d.sport == sport && &d.eventgroup == group_id);

        for declaration in declarations {
            let mut event = match Event::new(declaration, group) {
                Ok(event) => event,
                Err(err) => {
                    let label = Identifier::derive(
                        Some(group.identifier()),
                        &[declaration.teams.join("/").as_str()],
                    );
                    self.fail(label.to_string(), EntityKind::Event, &err);
                    continue;
                }
            };
            if self.step(&mut event) {
                self.market_groups(&event);
            }
        }
    }

    fn market_groups(&mut self, event: &Event<'_>) {
        let keys = &event.group().scheme().bettingmarketgroups;
        for (result, key) in event.betting_market_groups().into_iter().zip(keys) {
            let mut group = match result {
                Ok(group) => group,
                Err(err) => {
                    let label = Identifier::derive(Some(event.identifier()), &[key.as_str()]);
                    self.fail(label.to_string(), EntityKind::BettingMarketGroup, &err);
                    continue;
                }
            };
            if self.step(&mut group) {
                self.betting_markets(&group);
            }
        }
    }

    fn betting_markets(&mut self, group: &BettingMarketGroup<'_>) {
        for (index, result) in group.betting_markets().into_iter().enumerate() {
            match result {
                Ok(mut market) => {
                    self.step(&mut market);
                }
                Err(err) => {
                    let label = format!("{}/#{index}", group.identifier());
                    self.fail(label, EntityKind::BettingMarket, &err);
                }
            }
        }
    }

    /// Advance one entity and record the outcome. `false` skips its subtree.
    fn step<E: Reconcilable>(&mut self, entity: &mut E) -> bool {
        match self.advance(entity) {
            Ok(outcome) => {
                tracing::debug!(
                    "{} {}: {}",
                    entity.kind(),
                    entity.identifier(),
                    outcome.label()
                );
                self.report.outcomes.push(EntityOutcome {
                    identifier: entity.identifier().to_string(),
                    kind: entity.kind(),
                    outcome,
                });
                true
            }
            Err(err) => {
                self.fail(entity.identifier().to_string(), entity.kind(), &err);
                false
            }
        }
    }

    fn advance<E: Reconcilable>(&mut self, entity: &mut E) -> Result<Outcome, ReconcileError> {
        if entity.state() == ReconcileState::Unresolved {
            entity.find_id(self.ledger)?;
        }

        let Some(id) = entity.remote_ref() else {
            return match self.mode {
                PassMode::Propose => Ok(Outcome::Created {
                    reference: entity.propose_new(self.batch)?,
                }),
                PassMode::Inspect => Ok(Outcome::Missing),
            };
        };

        if entity.is_synced(self.ledger)? {
            return Ok(Outcome::Synchronized { id });
        }
        match self.mode {
            PassMode::Propose => {
                entity.propose_update(self.batch)?;
                Ok(Outcome::Updated { id })
            }
            PassMode::Inspect => {
                self.record_drift(entity, id)?;
                Ok(Outcome::Stale { id })
            }
        }
    }

    fn record_drift<E: Reconcilable>(
        &mut self,
        entity: &E,
        id: RemoteRef,
    ) -> Result<(), ReconcileError> {
        let remote = self
            .ledger
            .get_object(&id)
            .map_err(ReconcileError::query)?;
        match entity.payload() {
            Ok(local) => self.report.drifts.push(Drift {
                identifier: entity.identifier().clone(),
                id,
                remote,
                local,
            }),
            Err(err) => tracing::debug!("{}: no drift recorded: {err}", entity.identifier()),
        }
        Ok(())
    }

    fn fail(&mut self, identifier: String, kind: EntityKind, err: &ReconcileError) {
        tracing::warn!("{kind} {identifier}: {err}");
        self.report.outcomes.push(EntityOutcome {
            identifier,
            kind,
            outcome: Outcome::Failed {
                error: err.to_string(),
            },
        });
    }
}

fn event_label(declaration: &EventDeclaration) -> String {
    let mut parts = vec![declaration.sport.as_str(), declaration.eventgroup.as_str()];
    parts.extend(declaration.teams.iter().map(String::as_str));
    Identifier::derive(None, &parts).to_string()
}

// ---------------------------------------------------------------------------
// Sync
// ---------------------------------------------------------------------------

/// Result of [`sync`].
#[derive(Debug)]
pub struct SyncResult {
    pub report: ReconcileReport,
    /// Operations of the pass; emptied by a successful flush.
    pub batch: ProposalBatch,
    /// `None` on a dry run.
    pub receipt: Option<SubmissionReceipt>,
}

/// Reconcile `description` against `ledger` and submit every proposal of the
/// pass as one change-set.
///
/// With `dry_run` (or no submitter) the batch is returned unsubmitted.
/// A submission failure aborts the whole change-set.
pub fn sync(
    description: &Description,
    ledger: &dyn LedgerQuery,
    submitter: Option<&dyn LedgerSubmit>,
    account: &str,
    dry_run: bool,
) -> Result<SyncResult, ReconcileError> {
    let mut batch = ProposalBatch::new();
    let report = reconcile(description, ledger, &mut batch, PassMode::Propose);

    let receipt = match submitter {
        Some(submitter) if !dry_run => Some(batch.flush(submitter, account)?),
        _ => {
            tracing::info!("[dry-run] {} operation(s) not submitted", batch.len());
            None
        }
    };
    Ok(SyncResult {
        report,
        batch,
        receipt,
    })
}
