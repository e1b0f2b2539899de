use bookie_core::{
    exists_remotely, AttributeBag, BettingMarketGroupDef, EntityKind, Identifier, NameSet,
    RemoteRef, ValidationError,
};

use crate::batch::Payload;
use crate::entity::{require_primary, BettingMarket, Event, Reconcilable, Tracker};
use crate::error::ReconcileError;
use crate::oracle::LocalView;

/// A market type offered on an event (moneyline, handicap, ...).
#[derive(Debug, Clone)]
pub struct BettingMarketGroup<'a> {
    event: &'a Event<'a>,
    key: &'a str,
    def: &'a BettingMarketGroupDef,
    identifier: Identifier,
    attributes: AttributeBag,
    names: NameSet,
    rules: Option<RemoteRef>,
    tracker: Tracker,
}

impl<'a> BettingMarketGroup<'a> {
    /// Resolve the definition `key` of the sport scheme for `event`.
    pub fn new(
        event: &'a Event<'a>,
        key: &'a str,
        def: &'a BettingMarketGroupDef,
    ) -> Result<Self, ReconcileError> {
        // The definition's own attributes shadow the event's.
        let mut attributes = event.attributes().clone();
        attributes.extend_from(&def.extra);
        let names = bookie_names::resolve(&def.name_template(), &attributes)?;
        let primary = require_primary(EntityKind::BettingMarketGroup, &names)?;
        let identifier = Identifier::derive(Some(event.identifier()), &[primary]);

        let rules = match &def.rules {
            None => None,
            Some(rules_key) => {
                let sport = event.group().sport().scheme();
                let entry = sport.rules.get(rules_key).ok_or_else(|| {
                    ValidationError::UnknownRules {
                        sport: sport.identifier.clone(),
                        key: rules_key.clone(),
                    }
                })?;
                entry.id.filter(|id| exists_remotely(Some(id)))
            }
        };

        Ok(Self {
            event,
            key,
            def,
            identifier,
            attributes,
            names,
            rules,
            tracker: Tracker::new(None),
        })
    }

    pub fn event(&self) -> &'a Event<'a> {
        self.event
    }

    /// Key of the definition in the sport scheme.
    pub fn key(&self) -> &'a str {
        self.key
    }

    /// Event attributes layered under the definition's own.
    pub fn attributes(&self) -> &AttributeBag {
        &self.attributes
    }

    /// Ledger id of the grading rules, when the rules entry has one.
    pub fn rules(&self) -> Option<RemoteRef> {
        self.rules
    }

    /// Betting markets in declared order.
    pub fn betting_markets(&self) -> Vec<Result<BettingMarket<'_>, ReconcileError>> {
        self.def
            .bettingmarkets
            .iter()
            .map(|def| BettingMarket::new(self, def))
            .collect()
    }
}

impl Reconcilable for BettingMarketGroup<'_> {
    fn kind(&self) -> EntityKind {
        EntityKind::BettingMarketGroup
    }

    fn identifier(&self) -> &Identifier {
        &self.identifier
    }

    fn names(&self) -> &NameSet {
        &self.names
    }

    fn parent_tracker(&self) -> Option<&Tracker> {
        Some(self.event.tracker())
    }

    fn tracker(&self) -> &Tracker {
        &self.tracker
    }

    fn tracker_mut(&mut self) -> &mut Tracker {
        &mut self.tracker
    }

    fn local_view(&self) -> LocalView<'_> {
        LocalView {
            rules: self.rules,
            ..LocalView::new(&self.names)
        }
    }

    fn build_payload(&self, parent: Option<RemoteRef>) -> Result<Payload, ReconcileError> {
        Ok(Payload::BettingMarketGroup {
            name: self.names.clone(),
            event_id: self.require_link(parent)?,
            rules_id: self.rules,
            is_live: self.def.is_live,
        })
    }
}
