//! File outbox submitter: each change-set becomes one JSON file that a
//! signing/broadcasting process picks up.
//!
//! ## Write protocol
//!
//! 1. Fingerprint the ordered operations (SHA-256 of their wire form).
//! 2. `<outbox>/<fingerprint>.json` already exists → already submitted, skip.
//! 3. Write to `<outbox>/<fingerprint>.json.tmp`.
//! 4. Rename to the final path (atomic on POSIX).

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::batch::{fingerprint, Operation, OperationRecord};
use crate::error::{io_err, LedgerError};
use crate::ledger::{LedgerSubmit, SubmissionReceipt, SubmissionStatus};

/// On-disk change-set document.
#[derive(Debug, Serialize)]
struct ChangeSet<'a> {
    fingerprint: &'a str,
    account: &'a str,
    written_at: DateTime<Utc>,
    operations: Vec<OperationRecord<'a>>,
}

/// Submits change-sets by writing them into a directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboxSubmitter {
    dir: PathBuf,
}

impl OutboxSubmitter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// `<outbox>/<fingerprint>.json`
    pub fn change_set_path(&self, fingerprint: &str) -> PathBuf {
        self.dir.join(format!("{fingerprint}.json"))
    }
}

impl LedgerSubmit for OutboxSubmitter {
    fn submit(
        &self,
        operations: &[Operation],
        account: &str,
    ) -> Result<SubmissionReceipt, LedgerError> {
        let digest = fingerprint(operations)?;
        let path = self.change_set_path(&digest);
        let mut receipt = SubmissionReceipt {
            fingerprint: digest.clone(),
            operation_count: operations.len(),
            status: SubmissionStatus::Accepted,
            location: Some(path.clone()),
        };

        if path.exists() {
            tracing::info!("change-set {digest} already in outbox, not writing again");
            receipt.status = SubmissionStatus::AlreadySubmitted;
            return Ok(receipt);
        }

        let document = ChangeSet {
            fingerprint: &digest,
            account,
            written_at: Utc::now(),
            operations: operations.iter().map(Operation::record).collect(),
        };
        let json = serde_json::to_string_pretty(&document)?;
        let tmp = PathBuf::from(format!("{}.tmp", path.display()));
        write_atomic(&path, &tmp, &json)?;

        tracing::info!("wrote change-set: {}", path.display());
        Ok(receipt)
    }
}

fn write_atomic(path: &Path, tmp: &Path, content: &str) -> Result<(), LedgerError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
    }
    std::fs::write(tmp, content).map_err(|e| io_err(tmp, e))?;
    if let Err(e) = std::fs::rename(tmp, path) {
        let _ = std::fs::remove_file(tmp);
        return Err(io_err(path, e));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
