//! Remote discovery: find the ledger object a local object corresponds to.

use bookie_core::{exists_remotely, EntityKind, RemoteRef, PRIMARY_LANGUAGE};

use crate::error::ReconcileError;
use crate::ledger::LedgerQuery;

/// Where to look for an object's remote counterpart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Ledger root; sports live here.
    Root,
    /// Children of a parent whose reference may be absent or pending.
    Under(Option<RemoteRef>),
}

/// Search `scope` for an object of `kind` whose primary-language name is
/// exactly `primary_name`. First match wins.
///
/// A scope whose parent does not exist on the ledger yet cannot contain
/// anything, so it yields `None` without querying.
pub fn find(
    ledger: &dyn LedgerQuery,
    scope: Scope,
    primary_name: &str,
    kind: EntityKind,
) -> Result<Option<RemoteRef>, ReconcileError> {
    let parent = match scope {
        Scope::Root => None,
        Scope::Under(parent) if exists_remotely(parent.as_ref()) => parent,
        Scope::Under(_) => {
            tracing::debug!("{kind} '{primary_name}': parent not on ledger, skipping search");
            return Ok(None);
        }
    };

    let candidates = ledger
        .list_children(parent.as_ref(), kind)
        .map_err(ReconcileError::query)?;
    let found = candidates
        .iter()
        .find(|view| view.fields().name.get(PRIMARY_LANGUAGE) == Some(primary_name))
        .map(|view| view.id());

    match found {
        Some(id) => tracing::debug!("{kind} '{primary_name}': found {id}"),
        None => tracing::debug!(
            "{kind} '{primary_name}': no match among {} candidate(s)",
            candidates.len()
        ),
    }
    Ok(found)
}
