use bookie_core::{EntityKind, EventGroupScheme, Identifier, NameSet, RemoteRef};

use crate::batch::Payload;
use crate::entity::{require_primary, Reconcilable, Sport, Tracker};
use crate::error::ReconcileError;
use crate::oracle::LocalView;

/// A league or tournament inside a sport.
#[derive(Debug, Clone)]
pub struct EventGroup<'a> {
    sport: &'a Sport<'a>,
    scheme: &'a EventGroupScheme,
    identifier: Identifier,
    tracker: Tracker,
}

impl<'a> EventGroup<'a> {
    pub fn new(sport: &'a Sport<'a>, scheme: &'a EventGroupScheme) -> Result<Self, ReconcileError> {
        require_primary(EntityKind::EventGroup, &scheme.name)?;
        Ok(Self {
            sport,
            scheme,
            identifier: Identifier::derive(
                Some(sport.identifier()),
                &[scheme.identifier.as_str()],
            ),
            tracker: Tracker::new(scheme.id),
        })
    }

    pub fn sport(&self) -> &'a Sport<'a> {
        self.sport
    }

    pub fn scheme(&self) -> &'a EventGroupScheme {
        self.scheme
    }
}

impl Reconcilable for EventGroup<'_> {
    fn kind(&self) -> EntityKind {
        EntityKind::EventGroup
    }

    fn identifier(&self) -> &Identifier {
        &self.identifier
    }

    fn names(&self) -> &NameSet {
        &self.scheme.name
    }

    fn parent_tracker(&self) -> Option<&Tracker> {
        Some(self.sport.tracker())
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

    fn build_payload(&self, parent: Option<RemoteRef>) -> Result<Payload, ReconcileError> {
        Ok(Payload::EventGroup {
            name: self.scheme.name.clone(),
            sport_id: self.require_link(parent)?,
        })
    }
}
