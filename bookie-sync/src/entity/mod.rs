//! Hierarchy entities and the reconciliation contract they share.
//!
//! Every kind (sport, event group, event, betting market group, betting
//! market) implements [`Reconcilable`] by saying what it is: its identifier,
//! resolved names, parent, the content equality is decided on and the
//! payload it would propose. The four contract operations are provided on
//! top of that and drive the [`ReconcileState`] machine.
//!
//! Children are built on demand from the parent and the sport scheme; every
//! call produces a fresh `Vec` with one `Result` per child.

mod event;
mod event_group;
mod market;
mod market_group;
mod sport;

pub use event::Event;
pub use event_group::EventGroup;
pub use market::BettingMarket;
pub use market_group::BettingMarketGroup;
pub use sport::Sport;

use bookie_core::{EntityKind, Identifier, NameSet, RemoteRef, ValidationError};

use crate::batch::{Operation, Payload, ProposalBatch};
use crate::discovery::{self, Scope};
use crate::error::ReconcileError;
use crate::ledger::LedgerQuery;
use crate::oracle::{self, LocalView};
use crate::state::ReconcileState;

// ---------------------------------------------------------------------------
// Tracker
// ---------------------------------------------------------------------------

/// Per-object reconciliation bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tracker {
    remote_ref: Option<RemoteRef>,
    pending_ref: Option<RemoteRef>,
    state: ReconcileState,
}

impl Tracker {
    /// A declared id of space `0` counts as no id.
    pub fn new(declared: Option<RemoteRef>) -> Self {
        let remote_ref = declared.filter(|r| !r.is_pending());
        Self {
            remote_ref,
            pending_ref: None,
            state: ReconcileState::initial(remote_ref.as_ref()),
        }
    }

    /// Ledger id, known from the declaration or from discovery.
    pub fn remote_ref(&self) -> Option<RemoteRef> {
        self.remote_ref
    }

    /// In-batch reference of this object's proposed create.
    pub fn pending_ref(&self) -> Option<RemoteRef> {
        self.pending_ref
    }

    pub fn state(&self) -> ReconcileState {
        self.state
    }

    /// Reference children link to: the ledger id, else the pending create.
    pub fn linkage(&self) -> Option<RemoteRef> {
        self.remote_ref.or(self.pending_ref)
    }
}

// ---------------------------------------------------------------------------
// Reconcilable
// ---------------------------------------------------------------------------

pub trait Reconcilable {
    fn kind(&self) -> EntityKind;

    fn identifier(&self) -> &Identifier;

    /// Resolved names; always carry primary-language text.
    fn names(&self) -> &NameSet;

    /// Tracker of the parent entity; `None` for roots.
    fn parent_tracker(&self) -> Option<&Tracker>;

    fn tracker(&self) -> &Tracker;

    fn tracker_mut(&mut self) -> &mut Tracker;

    /// Content compared against the remote object.
    fn local_view(&self) -> LocalView<'_>;

    /// Content proposed for this object, linked to `parent` (the parent's
    /// ledger id or pending reference, if it has either).
    fn build_payload(&self, parent: Option<RemoteRef>) -> Result<Payload, ReconcileError>;

    // -- provided ----------------------------------------------------------

    fn state(&self) -> ReconcileState {
        self.tracker().state()
    }

    fn remote_ref(&self) -> Option<RemoteRef> {
        self.tracker().remote_ref()
    }

    fn pending_ref(&self) -> Option<RemoteRef> {
        self.tracker().pending_ref()
    }

    /// Payload linked to the parent's current linkage.
    fn payload(&self) -> Result<Payload, ReconcileError> {
        self.build_payload(self.parent_tracker().and_then(Tracker::linkage))
    }

    /// `parent`, or `ParentUnresolved` when the parent has nothing to link to.
    fn require_link(&self, parent: Option<RemoteRef>) -> Result<RemoteRef, ReconcileError> {
        parent.ok_or_else(|| ReconcileError::ParentUnresolved {
            identifier: self.identifier().clone(),
        })
    }

    /// Discover this object's ledger id.
    ///
    /// A known id is returned without searching. A parent that is only a
    /// proposal (or unresolved) yields `None` without querying.
    fn find_id(&mut self, ledger: &dyn LedgerQuery) -> Result<Option<RemoteRef>, ReconcileError> {
        if let Some(known) = self.remote_ref() {
            return Ok(Some(known));
        }
        let state = self.state();
        if !matches!(state, ReconcileState::Unresolved | ReconcileState::Absent) {
            return Err(invalid(self, "search for a ledger id", state));
        }
        let primary = self.names().primary().ok_or_else(|| missing_primary(self))?;
        let scope = match self.parent_tracker() {
            None => Scope::Root,
            Some(parent) => Scope::Under(parent.linkage()),
        };
        let found = discovery::find(ledger, scope, primary, self.kind())?;

        let tracker = self.tracker_mut();
        tracker.remote_ref = found;
        tracker.state = match found {
            Some(_) => ReconcileState::KnownUnchecked,
            None => ReconcileState::Absent,
        };
        Ok(found)
    }

    /// Compare against the remote object with the known ledger id.
    ///
    /// Without a known id this is `false` and no discovery is attempted.
    fn is_synced(&mut self, ledger: &dyn LedgerQuery) -> Result<bool, ReconcileError> {
        let Some(id) = self.remote_ref() else {
            return Ok(false);
        };
        let remote = ledger.get_object(&id).map_err(ReconcileError::query)?;
        let parent = self.parent_tracker().and_then(Tracker::remote_ref);
        let view = LocalView {
            parent,
            ..self.local_view()
        };
        let synced = oracle::is_synchronized(&view, remote.as_ref());
        tracing::debug!(
            "{}: {} against {id}",
            self.identifier(),
            if synced { "in sync" } else { "differs" }
        );

        let tracker = self.tracker_mut();
        if tracker.state != ReconcileState::PendingProposal {
            tracker.state = if synced {
                ReconcileState::Synchronized
            } else {
                ReconcileState::Stale
            };
        }
        Ok(synced)
    }

    /// Append a create for this object.
    ///
    /// Records the returned in-batch reference as the pending reference for
    /// children to link to; the ledger id stays unknown.
    fn propose_new(&mut self, batch: &mut ProposalBatch) -> Result<RemoteRef, ReconcileError> {
        let state = self.state();
        if self.remote_ref().is_some() || state != ReconcileState::Absent {
            return Err(invalid(self, "propose a create", state));
        }
        let payload = self.payload()?;
        let reference = batch.append_create(self.identifier(), payload)?;

        let tracker = self.tracker_mut();
        tracker.pending_ref = Some(reference);
        tracker.state = ReconcileState::PendingProposal;
        Ok(reference)
    }

    /// Append an update of the stale remote object.
    fn propose_update(&mut self, batch: &mut ProposalBatch) -> Result<(), ReconcileError> {
        let state = self.state();
        let id = match (state, self.remote_ref()) {
            (ReconcileState::Stale, Some(id)) => id,
            _ => return Err(invalid(self, "propose an update", state)),
        };
        let payload = self.payload()?;
        batch.append(self.identifier(), Operation::Update { id, payload })?;
        self.tracker_mut().state = ReconcileState::PendingProposal;
        Ok(())
    }
}

fn invalid<E: Reconcilable + ?Sized>(
    entity: &E,
    operation: &'static str,
    state: ReconcileState,
) -> ReconcileError {
    ReconcileError::InvalidTransition {
        identifier: entity.identifier().clone(),
        operation,
        state,
    }
}

fn missing_primary<E: Reconcilable + ?Sized>(entity: &E) -> ReconcileError {
    ReconcileError::Validation(ValidationError::MissingPrimaryName {
        kind: entity.kind().to_string(),
        names: format!("{:?}", entity.names()),
    })
}

/// Fails with `MissingPrimaryName` unless `names` carry primary-language text.
pub(crate) fn require_primary(kind: EntityKind, names: &NameSet) -> Result<&str, ValidationError> {
    names.primary().ok_or_else(|| ValidationError::MissingPrimaryName {
        kind: kind.to_string(),
        names: format!("{names:?}"),
    })
}
