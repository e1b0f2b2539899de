//! Error types for bookie-sync.

use std::path::PathBuf;

use thiserror::Error;

use bookie_core::{Identifier, InvariantViolation, ValidationError};
use bookie_names::ResolveError;

use crate::state::ReconcileState;

/// Failures of a ledger collaborator (query or submission side).
#[derive(Debug, Error)]
pub enum LedgerError {
    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A ledger snapshot file that is not valid snapshot JSON.
    #[error("failed to parse ledger snapshot {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// JSON encoding of a change-set failed.
    #[error("change-set JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The ledger could not answer; carries the collaborator's own message.
    #[error("ledger unavailable: {reason}")]
    Unavailable { reason: String },

    /// The requested object exists but cannot be represented.
    #[error("malformed ledger object: {0}")]
    Invariant(#[from] InvariantViolation),
}

/// All errors that can arise while reconciling one object.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// Malformed local attributes; fatal to this object only.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The name resolver's engine rejected a compiled pattern.
    #[error(transparent)]
    Resolve(ResolveError),

    /// A ledger query failed. Never means "not found".
    #[error("remote query failed: {0}")]
    RemoteQuery(#[source] LedgerError),

    /// The submitter rejected the change-set; the batch is left intact.
    #[error("submission failed: {0}")]
    Submission(#[source] LedgerError),

    /// Remote data this model cannot represent.
    #[error(transparent)]
    Invariant(#[from] InvariantViolation),

    /// An operation was invoked in a state that does not allow it.
    #[error("{identifier}: cannot {operation} while {state}")]
    InvalidTransition {
        identifier: Identifier,
        operation: &'static str,
        state: ReconcileState,
    },

    /// The batch already holds an operation for this object.
    #[error("{identifier}: a proposal for this object is already in the batch")]
    DuplicateProposal { identifier: Identifier },

    /// The parent has neither a ledger id nor a pending proposal to link to.
    #[error("{identifier}: parent has no ledger id and no pending proposal")]
    ParentUnresolved { identifier: Identifier },
}

impl From<ResolveError> for ReconcileError {
    fn from(err: ResolveError) -> Self {
        match err {
            ResolveError::Validation(v) => ReconcileError::Validation(v),
            other => ReconcileError::Resolve(other),
        }
    }
}

impl ReconcileError {
    /// A failed ledger query. Malformed remote data aborts the object asked
    /// about; every other failure is a query error.
    pub(crate) fn query(err: LedgerError) -> Self {
        match err {
            LedgerError::Invariant(violation) => ReconcileError::Invariant(violation),
            other => ReconcileError::RemoteQuery(other),
        }
    }
}

/// Convenience constructor for [`LedgerError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> LedgerError {
    LedgerError::Io {
        path: path.into(),
        source,
    }
}
