use bookie_core::{EntityKind, Identifier, NameSet, RemoteRef, SportScheme};

use crate::batch::Payload;
use crate::entity::{require_primary, EventGroup, Reconcilable, Tracker};
use crate::error::ReconcileError;
use crate::oracle::LocalView;

/// Root of the hierarchy.
#[derive(Debug, Clone)]
pub struct Sport<'a> {
    scheme: &'a SportScheme,
    identifier: Identifier,
    tracker: Tracker,
}

impl<'a> Sport<'a> {
    pub fn new(scheme: &'a SportScheme) -> Result<Self, ReconcileError> {
        require_primary(EntityKind::Sport, &scheme.name)?;
        Ok(Self {
            scheme,
            identifier: Identifier::derive(None, &[scheme.identifier.as_str()]),
            tracker: Tracker::new(scheme.id),
        })
    }

    pub fn scheme(&self) -> &'a SportScheme {
        self.scheme
    }

    /// Event groups in declaration order.
    pub fn event_groups(&self) -> Vec<Result<EventGroup<'_>, ReconcileError>> {
        self.scheme
            .eventgroups
            .iter()
            .map(|scheme| EventGroup::new(self, scheme))
            .collect()
    }
}

impl Reconcilable for Sport<'_> {
    fn kind(&self) -> EntityKind {
        EntityKind::Sport
    }

    fn identifier(&self) -> &Identifier {
        &self.identifier
    }

    fn names(&self) -> &NameSet {
        &self.scheme.name
    }

    fn parent_tracker(&self) -> Option<&Tracker> {
        None
    }

    fn tracker(&self) -> &Tracker {
        &self.tracker
    }

    fn tracker_mut(&mut self) -> &mut Tracker {
        &mut self.tracker
    }

    fn local_view(&self) -> LocalView<'_> {
        LocalView::new(&self.scheme.name)
    }

    fn build_payload(&self, _parent: Option<RemoteRef>) -> Result<Payload, ReconcileError> {
        Ok(Payload::Sport {
            name: self.scheme.name.clone(),
        })
    }
}
