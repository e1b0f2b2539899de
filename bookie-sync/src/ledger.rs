//! Ledger collaborators: the query and submission seams, the remote object
//! views they exchange, and a file-backed snapshot ledger.
//!
//! ## Snapshot format
//!
//! ```json
//! {"objects": [
//!   {"kind": "event", "id": "1.22.5", "name": [["en", "Lions vs Bears"]], "parent_id": "1.21.0"},
//!   {"kind": "event", "id": "1.22.6", "new_name": [["en", "Cats vs Dogs"]], "new_parent_id": "1.21.0"}
//! ]}
//! ```
//!
//! Unprefixed keys describe committed content; `new_*` keys describe an
//! update proposed but not yet applied. An object carrying both is read as
//! committed. An object carrying neither is an `UnrecognizedRemoteShape`.
//!
//! Objects are decoded one at a time. An object with a malformed id or no
//! recognisable shape does not fail the load: it is kept aside, and asking
//! for it by id yields [`LedgerError::Invariant`]. Listings skip it.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use bookie_core::{EntityKind, InvariantViolation, NameSet, RemoteRef};

use crate::batch::Operation;
use crate::error::{io_err, LedgerError};

// ---------------------------------------------------------------------------
// Remote views
// ---------------------------------------------------------------------------

/// The content of a remote object that equality is decided on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFields {
    pub id: RemoteRef,
    pub name: NameSet,
    pub season: Option<NameSet>,
    pub rules: Option<RemoteRef>,
    pub parent: Option<RemoteRef>,
}

/// A remote object as presented for comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteObjectView {
    /// Content already applied on the ledger.
    Committed(RemoteFields),
    /// Content of an update proposed against the object but not applied yet.
    PendingUpdate(RemoteFields),
}

impl RemoteObjectView {
    pub fn fields(&self) -> &RemoteFields {
        match self {
            RemoteObjectView::Committed(f) | RemoteObjectView::PendingUpdate(f) => f,
        }
    }

    pub fn id(&self) -> RemoteRef {
        self.fields().id
    }

    pub fn is_pending_update(&self) -> bool {
        matches!(self, RemoteObjectView::PendingUpdate(_))
    }
}

/// A ledger object of a known kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "WireObject", into = "WireObject")]
pub struct RemoteObject {
    pub kind: EntityKind,
    pub view: RemoteObjectView,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireObject {
    kind: EntityKind,
    id: RemoteRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<NameSet>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    season: Option<NameSet>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    rules_id: Option<RemoteRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    parent_id: Option<RemoteRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    new_name: Option<NameSet>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    new_season: Option<NameSet>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    new_rules_id: Option<RemoteRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    new_parent_id: Option<RemoteRef>,
}

impl TryFrom<WireObject> for RemoteObject {
    type Error = InvariantViolation;

    fn try_from(wire: WireObject) -> Result<Self, Self::Error> {
        let view = match (wire.name, wire.new_name) {
            (Some(name), _) => RemoteObjectView::Committed(RemoteFields {
                id: wire.id,
                name,
                season: wire.season,
                rules: wire.rules_id,
                parent: wire.parent_id,
            }),
            (None, Some(name)) => RemoteObjectView::PendingUpdate(RemoteFields {
                id: wire.id,
                name,
                season: wire.new_season,
                rules: wire.new_rules_id,
                parent: wire.new_parent_id,
            }),
            (None, None) => {
                return Err(InvariantViolation::UnrecognizedRemoteShape {
                    id: wire.id.to_string(),
                })
            }
        };
        Ok(RemoteObject {
            kind: wire.kind,
            view,
        })
    }
}

impl From<RemoteObject> for WireObject {
    fn from(object: RemoteObject) -> Self {
        let mut wire = WireObject {
            kind: object.kind,
            id: object.view.id(),
            name: None,
            season: None,
            rules_id: None,
            parent_id: None,
            new_name: None,
            new_season: None,
            new_rules_id: None,
            new_parent_id: None,
        };
        match object.view {
            RemoteObjectView::Committed(f) => {
                wire.name = Some(f.name);
                wire.season = f.season;
                wire.rules_id = f.rules;
                wire.parent_id = f.parent;
            }
            RemoteObjectView::PendingUpdate(f) => {
                wire.new_name = Some(f.name);
                wire.new_season = f.season;
                wire.new_rules_id = f.rules;
                wire.new_parent_id = f.parent;
            }
        }
        wire
    }
}

// ---------------------------------------------------------------------------
// Collaborator traits
// ---------------------------------------------------------------------------

/// Read side of the ledger.
pub trait LedgerQuery: Send + Sync {
    /// Objects of `kind` whose parent is `parent`. `None` lists roots.
    fn list_children(
        &self,
        parent: Option<&RemoteRef>,
        kind: EntityKind,
    ) -> Result<Vec<RemoteObjectView>, LedgerError>;

    /// The object with ledger id `id`, or `None` if the ledger has no such object.
    fn get_object(&self, id: &RemoteRef) -> Result<Option<RemoteObjectView>, LedgerError>;
}

/// How a submitter disposed of a change-set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStatus {
    /// Nothing to submit; the submitter was not contacted.
    Empty,
    /// The change-set was handed over.
    Accepted,
    /// An identical change-set had been handed over before.
    AlreadySubmitted,
}

/// Acknowledgement of a submitted change-set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionReceipt {
    pub fingerprint: String,
    pub operation_count: usize,
    pub status: SubmissionStatus,
    /// Where the submitter put the change-set, if it is addressable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<PathBuf>,
}

impl SubmissionReceipt {
    /// Receipt of a flush that had nothing to submit.
    pub fn empty() -> Self {
        Self {
            fingerprint: String::new(),
            operation_count: 0,
            status: SubmissionStatus::Empty,
            location: None,
        }
    }
}

/// Write side of the ledger: takes an ordered change-set as one unit.
pub trait LedgerSubmit: Send + Sync {
    fn submit(&self, operations: &[Operation], account: &str)
        -> Result<SubmissionReceipt, LedgerError>;
}

// ---------------------------------------------------------------------------
// SnapshotLedger
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Serialize, Deserialize)]
struct SnapshotFile {
    #[serde(default)]
    objects: Vec<RemoteObject>,
}

#[derive(Deserialize)]
struct RawSnapshot {
    #[serde(default)]
    objects: Vec<Value>,
}

const REF_KEYS: [&str; 5] = ["id", "parent_id", "new_parent_id", "rules_id", "new_rules_id"];

/// A snapshot entry this model cannot represent, kept by whatever could
/// still be read from it.
#[derive(Debug, Clone, PartialEq, Eq)]
struct BrokenObject {
    kind: Option<EntityKind>,
    id: Option<String>,
    parent: Option<String>,
    violation: InvariantViolation,
}

impl BrokenObject {
    /// `None` when the entry fails for a reason other than an invariant
    /// violation (wrong types, unknown kind, missing id).
    fn diagnose(value: &Value) -> Option<Self> {
        let text = |key: &str| value.get(key).and_then(Value::as_str).map(str::to_owned);
        let present = |key: &str| value.get(key).is_some_and(|v| !v.is_null());
        let id = text("id");

        let violation = REF_KEYS
            .iter()
            .filter_map(|&key| text(key))
            .find_map(|raw| raw.parse::<RemoteRef>().err())
            .or_else(|| {
                let shapeless = id.is_some() && !present("name") && !present("new_name");
                shapeless.then(|| InvariantViolation::UnrecognizedRemoteShape {
                    id: id.clone().unwrap_or_default(),
                })
            })?;

        Some(Self {
            kind: value
                .get("kind")
                .and_then(|kind| EntityKind::deserialize(kind).ok()),
            parent: text("parent_id").or_else(|| text("new_parent_id")),
            id,
            violation,
        })
    }

    fn has_id(&self, id: &RemoteRef) -> bool {
        self.id
            .as_deref()
            .and_then(|raw| raw.parse::<RemoteRef>().ok())
            .is_some_and(|own| own == *id)
    }
}

/// In-memory ledger state, usually read from a JSON snapshot file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnapshotLedger {
    objects: Vec<RemoteObject>,
    broken: Vec<BrokenObject>,
}

impl SnapshotLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_objects(objects: Vec<RemoteObject>) -> Self {
        Self {
            objects,
            broken: Vec::new(),
        }
    }

    /// Builder-style insert.
    pub fn with(mut self, kind: EntityKind, view: RemoteObjectView) -> Self {
        self.objects.push(RemoteObject { kind, view });
        self
    }

    /// Load a snapshot file. Entries violating a ledger invariant are kept
    /// aside per object; anything else that is not snapshot JSON fails the load.
    pub fn load_at(path: &Path) -> Result<Self, LedgerError> {
        let contents = std::fs::read_to_string(path).map_err(|e| io_err(path, e))?;
        let parse_err = |source: serde_json::Error| LedgerError::Parse {
            path: path.to_path_buf(),
            source,
        };
        let raw: RawSnapshot = serde_json::from_str(&contents).map_err(parse_err)?;

        let mut ledger = Self::new();
        for value in &raw.objects {
            match RemoteObject::deserialize(value) {
                Ok(object) => ledger.objects.push(object),
                Err(err) => {
                    let broken = BrokenObject::diagnose(value).ok_or_else(|| parse_err(err))?;
                    tracing::warn!(
                        "{}: skipping ledger {} {} (parent {}): {}",
                        path.display(),
                        broken.kind.map_or("object".to_string(), |kind| kind.to_string()),
                        broken.id.as_deref().unwrap_or("?"),
                        broken.parent.as_deref().unwrap_or("-"),
                        broken.violation
                    );
                    ledger.broken.push(broken);
                }
            }
        }
        tracing::debug!(
            "loaded {} ledger object(s) from {}",
            ledger.objects.len(),
            path.display()
        );
        Ok(ledger)
    }

    /// Pretty JSON in the snapshot format.
    pub fn to_json(&self) -> Result<String, LedgerError> {
        let file = SnapshotFile {
            objects: self.objects.clone(),
        };
        Ok(serde_json::to_string_pretty(&file)?)
    }

    pub fn objects(&self) -> &[RemoteObject] {
        &self.objects
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

impl LedgerQuery for SnapshotLedger {
    fn list_children(
        &self,
        parent: Option<&RemoteRef>,
        kind: EntityKind,
    ) -> Result<Vec<RemoteObjectView>, LedgerError> {
        Ok(self
            .objects
            .iter()
            .filter(|o| o.kind == kind)
            .filter(|o| parent.is_none() || o.view.fields().parent.as_ref() == parent)
            .map(|o| o.view.clone())
            .collect())
    }

    fn get_object(&self, id: &RemoteRef) -> Result<Option<RemoteObjectView>, LedgerError> {
        if let Some(broken) = self.broken.iter().find(|b| b.has_id(id)) {
            return Err(LedgerError::Invariant(broken.violation.clone()));
        }
        Ok(self
            .objects
            .iter()
            .find(|o| o.view.id() == *id)
            .map(|o| o.view.clone()))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SNAPSHOT: &str = r#"{"objects": [
        {"kind": "sport", "id": "1.20.0", "name": [["en", "American Football"]]},
        {"kind": "event", "id": "1.22.5", "name": [["en", "Lions vs Bears"]], "parent_id": "1.21.0"},
        {"kind": "event", "id": "1.22.6", "new_name": {"en": "Cats vs Dogs"}, "new_parent_id": "1.21.0"},
        {"kind": "event", "id": "1.22.7", "name": [["en", "A vs B"]], "new_name": [["en", "B vs A"]]}
    ]}"#;

    fn snapshot() -> SnapshotLedger {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("ledger.json");
        std::fs::write(&path, SNAPSHOT).unwrap();
        SnapshotLedger::load_at(&path).expect("load")
    }

    #[test]
    fn committed_and_pending_shapes_are_distinguished() {
        let ledger = snapshot();
        let committed = ledger.get_object(&"1.22.5".parse().unwrap()).unwrap().unwrap();
        assert!(!committed.is_pending_update());
        assert_eq!(committed.fields().parent, Some(RemoteRef::new(1, 21, 0)));

        let pending = ledger.get_object(&"1.22.6".parse().unwrap()).unwrap().unwrap();
        assert!(pending.is_pending_update());
        assert_eq!(pending.fields().name.primary(), Some("Cats vs Dogs"));
    }

    #[test]
    fn committed_wins_when_both_shapes_present() {
        let ledger = snapshot();
        let view = ledger.get_object(&"1.22.7".parse().unwrap()).unwrap().unwrap();
        assert!(!view.is_pending_update());
        assert_eq!(view.fields().name.primary(), Some("A vs B"));
    }

    #[test]
    fn list_children_filters_by_kind_and_parent() {
        let ledger = snapshot();
        let parent = RemoteRef::new(1, 21, 0);
        let events = ledger.list_children(Some(&parent), EntityKind::Event).unwrap();
        assert_eq!(events.len(), 2);

        let sports = ledger.list_children(None, EntityKind::Sport).unwrap();
        assert_eq!(sports.len(), 1);

        let other = RemoteRef::new(1, 21, 9);
        assert!(ledger.list_children(Some(&other), EntityKind::Event).unwrap().is_empty());
    }

    #[test]
    fn unknown_id_is_none_not_error() {
        let ledger = snapshot();
        assert!(ledger.get_object(&RemoteRef::new(1, 22, 99)).unwrap().is_none());
    }

    fn load(json: &str) -> Result<SnapshotLedger, LedgerError> {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("ledger.json");
        std::fs::write(&path, json).unwrap();
        SnapshotLedger::load_at(&path)
    }

    #[test]
    fn shapeless_object_is_an_invariant_error_for_that_id_only() {
        let ledger = load(
            r#"{"objects": [
                {"kind": "event", "id": "1.22.1"},
                {"kind": "event", "id": "1.22.2", "name": [["en", "A vs B"]], "parent_id": "1.21.0"}
            ]}"#,
        )
        .unwrap();
        assert_eq!(ledger.len(), 1);

        let err = ledger.get_object(&RemoteRef::new(1, 22, 1)).unwrap_err();
        assert!(matches!(
            err,
            LedgerError::Invariant(InvariantViolation::UnrecognizedRemoteShape { ref id }) if id == "1.22.1"
        ));
        assert!(ledger.get_object(&RemoteRef::new(1, 22, 2)).unwrap().is_some());
    }

    #[test]
    fn two_part_parent_keeps_the_rest_of_the_snapshot() {
        let ledger = load(
            r#"{"objects": [
                {"kind": "sport", "id": "1.20.0", "name": [["en", "American Football"]]},
                {"kind": "event_group", "id": "1.21.0", "name": [["en", "NFL - Week 1"]], "parent_id": "1.20.0"},
                {"kind": "event", "id": "1.22.9", "name": [["en", "Lions vs Bears"]], "parent_id": "1.21"}
            ]}"#,
        )
        .unwrap();
        assert_eq!(ledger.len(), 2);
        assert_eq!(ledger.broken[0].kind, Some(EntityKind::Event));
        assert_eq!(ledger.broken[0].parent.as_deref(), Some("1.21"));

        let err = ledger.get_object(&RemoteRef::new(1, 22, 9)).unwrap_err();
        assert!(err.to_string().contains("'1.21'"), "{err}");

        let parent = RemoteRef::new(1, 21, 0);
        assert!(ledger.list_children(Some(&parent), EntityKind::Event).unwrap().is_empty());
        assert_eq!(ledger.list_children(None, EntityKind::EventGroup).unwrap().len(), 1);
    }

    #[test]
    fn structurally_invalid_snapshot_fails_load() {
        let err = load(r#"{"objects": [{"kind": "stadium", "id": "1.30.0", "name": []}]}"#)
            .unwrap_err();
        assert!(matches!(err, LedgerError::Parse { .. }));
        assert!(err.to_string().contains("ledger.json"));

        let err = load("not json").unwrap_err();
        assert!(matches!(err, LedgerError::Parse { .. }));
    }

    #[test]
    fn snapshot_json_round_trips_views() {
        let ledger = snapshot();
        let json = ledger.to_json().unwrap();
        assert!(json.contains("new_name"));
        let reparsed: SnapshotFile = serde_json::from_str(&json).unwrap();
        assert_eq!(SnapshotLedger::from_objects(reparsed.objects), ledger);
    }

    #[test]
    fn missing_snapshot_is_io_error() {
        let tmp = TempDir::new().unwrap();
        let err = SnapshotLedger::load_at(&tmp.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, LedgerError::Io { .. }));
    }
}
