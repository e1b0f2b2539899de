//! # bookie-sync
//!
//! Reconciliation of a declarative sports catalog against a remote ledger.
//!
//! Call [`pipeline::sync`] to reconcile a whole [`bookie_core::Description`]
//! and submit the resulting change-set, or [`pipeline::reconcile`] to run a
//! pass against a caller-owned [`ProposalBatch`]. Individual objects can be
//! driven through the [`Reconcilable`] contract directly.

pub mod batch;
pub mod diff;
pub mod discovery;
pub mod entity;
pub mod error;
pub mod ledger;
pub mod oracle;
pub mod outbox;
pub mod pipeline;
pub mod state;

pub use batch::{Operation, Payload, ProposalBatch};
pub use entity::{
    BettingMarket, BettingMarketGroup, Event, EventGroup, Reconcilable, Sport, Tracker,
};
pub use error::{LedgerError, ReconcileError};
pub use ledger::{
    LedgerQuery, LedgerSubmit, RemoteFields, RemoteObject, RemoteObjectView, SnapshotLedger,
    SubmissionReceipt, SubmissionStatus,
};
pub use outbox::OutboxSubmitter;
pub use pipeline::{reconcile, sync, Outcome, PassMode, ReconcileReport, SyncResult};
pub use state::ReconcileState;
