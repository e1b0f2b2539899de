//! Reconciliation state of a single hierarchy object.
//!
//! ```text
//! Unresolved ──found──▶ KnownUnchecked ──synced──▶ Synchronized
//!     │                       │
//!  not found             not synced
//!     ▼                       ▼
//!   Absent ──propose_new──▶ PendingProposal ◀──propose_update── Stale
//! ```
//!
//! An object declared with a ledger id starts in `KnownUnchecked`.

use std::fmt;

use serde::{Deserialize, Serialize};

use bookie_core::{exists_remotely, RemoteRef};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReconcileState {
    /// Ledger id not known yet and discovery has not run.
    Unresolved,
    /// Ledger id known, content not compared yet.
    KnownUnchecked,
    /// Remote content equals the local description.
    Synchronized,
    /// Remote object exists but differs from the local description.
    Stale,
    /// Discovery found no remote object.
    Absent,
    /// A create or update for this object is in the batch.
    PendingProposal,
}

impl ReconcileState {
    /// Starting state for an object declared with `declared` as its ledger id.
    pub fn initial(declared: Option<&RemoteRef>) -> Self {
        if exists_remotely(declared) {
            ReconcileState::KnownUnchecked
        } else {
            ReconcileState::Unresolved
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ReconcileState::Unresolved => "unresolved",
            ReconcileState::KnownUnchecked => "known",
            ReconcileState::Synchronized => "synchronized",
            ReconcileState::Stale => "stale",
            ReconcileState::Absent => "absent",
            ReconcileState::PendingProposal => "pending proposal",
        }
    }
}

impl fmt::Display for ReconcileState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
