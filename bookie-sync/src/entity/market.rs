use bookie_core::{BettingMarketDef, EntityKind, Identifier, NameSet, RemoteRef};

use crate::batch::Payload;
use crate::entity::{require_primary, BettingMarketGroup, Reconcilable, Tracker};
use crate::error::ReconcileError;
use crate::oracle::LocalView;

/// A single outcome that can be backed inside a group.
#[derive(Debug, Clone)]
pub struct BettingMarket<'a> {
    group: &'a BettingMarketGroup<'a>,
    identifier: Identifier,
    names: NameSet,
    tracker: Tracker,
}

impl<'a> BettingMarket<'a> {
    pub fn new(
        group: &'a BettingMarketGroup<'a>,
        def: &'a BettingMarketDef,
    ) -> Result<Self, ReconcileError> {
        let mut attributes = group.attributes().clone();
        attributes.extend_from(&def.extra);
        let names = bookie_names::resolve(&def.name_template(), &attributes)?;
        let primary = require_primary(EntityKind::BettingMarket, &names)?;
        let identifier = Identifier::derive(Some(group.identifier()), &[primary]);
        Ok(Self {
            group,
            identifier,
            names,
            tracker: Tracker::new(None),
        })
    }

    pub fn group(&self) -> &'a BettingMarketGroup<'a> {
        self.group
    }
}

impl Reconcilable for BettingMarket<'_> {
    fn kind(&self) -> EntityKind {
        EntityKind::BettingMarket
    }

    fn identifier(&self) -> &Identifier {
        &self.identifier
    }

    fn names(&self) -> &NameSet {
        &self.names
    }

    fn parent_tracker(&self) -> Option<&Tracker> {
        Some(self.group.tracker())
    }

    fn tracker(&self) -> &Tracker {
        &self.tracker
    }

    fn tracker_mut(&mut self) -> &mut Tracker {
        &mut self.tracker
    }

    fn local_view(&self) -> LocalView<'_> {
        LocalView::new(&self.names)
    }

    fn build_payload(&self, parent: Option<RemoteRef>) -> Result<Payload, ReconcileError> {
        Ok(Payload::BettingMarket {
            name: self.names.clone(),
            group_id: self.require_link(parent)?,
        })
    }
}
