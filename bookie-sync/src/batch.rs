//! Proposal batch: the ordered buffer of create/update operations of one
//! reconciliation pass, submitted as a single change-set.
//!
//! The batch is owned by the caller and handed to every entity operation by
//! `&mut`. Nothing is ever submitted implicitly: only [`ProposalBatch::flush`]
//! contacts the submitter.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use bookie_core::{EntityKind, Identifier, NameSet, RemoteRef};

use crate::error::{LedgerError, ReconcileError};
use crate::ledger::{LedgerSubmit, SubmissionReceipt};

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

/// Kind-tagged content of a proposed object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Payload {
    Sport {
        name: NameSet,
    },
    EventGroup {
        name: NameSet,
        sport_id: RemoteRef,
    },
    Event {
        name: NameSet,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        season: Option<NameSet>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        start_time: Option<DateTime<Utc>>,
        event_group_id: RemoteRef,
    },
    BettingMarketGroup {
        name: NameSet,
        event_id: RemoteRef,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        rules_id: Option<RemoteRef>,
        #[serde(default)]
        is_live: bool,
    },
    BettingMarket {
        name: NameSet,
        group_id: RemoteRef,
    },
}

impl Payload {
    pub fn kind(&self) -> EntityKind {
        match self {
            Payload::Sport { .. } => EntityKind::Sport,
            Payload::EventGroup { .. } => EntityKind::EventGroup,
            Payload::Event { .. } => EntityKind::Event,
            Payload::BettingMarketGroup { .. } => EntityKind::BettingMarketGroup,
            Payload::BettingMarket { .. } => EntityKind::BettingMarket,
        }
    }

    pub fn name(&self) -> &NameSet {
        match self {
            Payload::Sport { name }
            | Payload::EventGroup { name, .. }
            | Payload::Event { name, .. }
            | Payload::BettingMarketGroup { name, .. }
            | Payload::BettingMarket { name, .. } => name,
        }
    }

    /// Reference of the parent object; `None` for sports.
    pub fn parent(&self) -> Option<RemoteRef> {
        match self {
            Payload::Sport { .. } => None,
            Payload::EventGroup { sport_id, .. } => Some(*sport_id),
            Payload::Event { event_group_id, .. } => Some(*event_group_id),
            Payload::BettingMarketGroup { event_id, .. } => Some(*event_id),
            Payload::BettingMarket { group_id, .. } => Some(*group_id),
        }
    }
}

/// One change-proposal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Create(Payload),
    Update { id: RemoteRef, payload: Payload },
}

impl Operation {
    pub fn payload(&self) -> &Payload {
        match self {
            Operation::Create(payload) | Operation::Update { payload, .. } => payload,
        }
    }

    /// Ledger operation name, e.g. `event_create`.
    pub fn name(&self) -> &'static str {
        match self {
            Operation::Create(payload) => payload.kind().create_operation(),
            Operation::Update { payload, .. } => payload.kind().update_operation(),
        }
    }

    /// Flat wire form: operation name, target id for updates, payload fields.
    pub fn record(&self) -> OperationRecord<'_> {
        OperationRecord {
            operation: self.name(),
            id: match self {
                Operation::Create(_) => None,
                Operation::Update { id, .. } => Some(*id),
            },
            payload: self.payload(),
        }
    }
}

/// Serialized shape of an [`Operation`] inside a change-set.
#[derive(Debug, Serialize)]
pub struct OperationRecord<'a> {
    pub operation: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<RemoteRef>,
    #[serde(flatten)]
    pub payload: &'a Payload,
}

/// SHA-256 hex digest of the wire form of `operations`, in order.
pub fn fingerprint(operations: &[Operation]) -> Result<String, serde_json::Error> {
    let records: Vec<OperationRecord<'_>> = operations.iter().map(Operation::record).collect();
    let encoded = serde_json::to_vec(&records)?;
    let mut h = Sha256::new();
    h.update(&encoded);
    Ok(hex::encode(h.finalize()))
}

// ---------------------------------------------------------------------------
// ProposalBatch
// ---------------------------------------------------------------------------

/// Append-only operation buffer, cleared by a successful flush or by [`clear`].
///
/// [`clear`]: ProposalBatch::clear
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProposalBatch {
    identifiers: Vec<Identifier>,
    operations: Vec<Operation>,
}

impl ProposalBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `operation` for the object `identifier`.
    ///
    /// Creates return the in-batch reference `0.0.<index>` that later
    /// operations of the same batch link to; updates return `None`.
    /// A second operation for an identifier already in the batch is rejected.
    pub fn append(
        &mut self,
        identifier: &Identifier,
        operation: Operation,
    ) -> Result<Option<RemoteRef>, ReconcileError> {
        let is_create = matches!(operation, Operation::Create(_));
        let index = self.push(identifier, operation)?;
        Ok(is_create.then(|| RemoteRef::relative(index as u64)))
    }

    /// Append a create and return its in-batch reference.
    pub fn append_create(
        &mut self,
        identifier: &Identifier,
        payload: Payload,
    ) -> Result<RemoteRef, ReconcileError> {
        let index = self.push(identifier, Operation::Create(payload))?;
        Ok(RemoteRef::relative(index as u64))
    }

    fn push(&mut self, identifier: &Identifier, operation: Operation) -> Result<usize, ReconcileError> {
        if self.contains(identifier) {
            return Err(ReconcileError::DuplicateProposal {
                identifier: identifier.clone(),
            });
        }
        let index = self.operations.len();
        tracing::info!("proposed {} #{index}: {identifier}", operation.name());
        self.identifiers.push(identifier.clone());
        self.operations.push(operation);
        Ok(index)
    }

    pub fn contains(&self, identifier: &Identifier) -> bool {
        self.identifiers.contains(identifier)
    }

    /// `(identifier, operation)` pairs in append order.
    pub fn entries(&self) -> impl Iterator<Item = (&Identifier, &Operation)> {
        self.identifiers.iter().zip(self.operations.iter())
    }

    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn fingerprint(&self) -> Result<String, serde_json::Error> {
        fingerprint(&self.operations)
    }

    /// Drop every pending operation without submitting.
    pub fn clear(&mut self) {
        self.identifiers.clear();
        self.operations.clear();
    }

    /// Hand the whole ordered batch to `submitter` as one change-set.
    ///
    /// On success the batch is cleared. On failure the error is returned as
    /// `Submission` and the batch is left as it was.
    pub fn flush(
        &mut self,
        submitter: &dyn LedgerSubmit,
        account: &str,
    ) -> Result<SubmissionReceipt, ReconcileError> {
        if self.is_empty() {
            tracing::debug!("flush: batch is empty, nothing to submit");
            return Ok(SubmissionReceipt::empty());
        }
        let digest = self
            .fingerprint()
            .map_err(|e| ReconcileError::Submission(LedgerError::Json(e)))?;
        tracing::info!(
            "flushing {} operation(s) as {account}, change-set {digest}",
            self.len()
        );
        let receipt = submitter
            .submit(&self.operations, account)
            .map_err(ReconcileError::Submission)?;
        self.clear();
        Ok(receipt)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
