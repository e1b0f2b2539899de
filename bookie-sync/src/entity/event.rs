use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde_json::{json, Value};

use bookie_core::{
    AttributeBag, EntityKind, EventDeclaration, Identifier, NameSet, RemoteRef, ValidationError,
};

use crate::batch::Payload;
use crate::entity::{require_primary, BettingMarketGroup, EventGroup, Reconcilable, Tracker};
use crate::error::ReconcileError;
use crate::oracle::LocalView;

/// A fixture between two teams, home first.
#[derive(Debug, Clone)]
pub struct Event<'a> {
    group: &'a EventGroup<'a>,
    declaration: &'a EventDeclaration,
    identifier: Identifier,
    names: NameSet,
    start_time: Option<DateTime<Utc>>,
    attributes: AttributeBag,
    tracker: Tracker,
}

impl<'a> Event<'a> {
    /// Attach `declaration` to `group`.
    ///
    /// Validates the teams and start time, then resolves the group's event
    /// name scheme with `teams.home` / `teams.away` bound.
    pub fn new(
        declaration: &'a EventDeclaration,
        group: &'a EventGroup<'a>,
    ) -> Result<Self, ReconcileError> {
        let [home, away] = declaration.teams.as_slice() else {
            return Err(ValidationError::InvalidTeamCount {
                count: declaration.teams.len(),
                teams: declaration.teams.clone(),
            }
            .into());
        };
        let (home, away) = (home.as_str(), away.as_str());
        let start_time = parse_start_time(declaration.start_time.as_ref())?;

        let mut attributes = declaration.extra.clone();
        attributes.insert("teams", json!({ "home": home, "away": away }));

        let template = group.scheme().eventscheme.name_template();
        let names = bookie_names::resolve(&template, &attributes)?;
        require_primary(EntityKind::Event, &names)?;

        let identifier = Identifier::derive(Some(group.identifier()), &[home, away]);

        Ok(Self {
            group,
            declaration,
            identifier,
            names,
            start_time,
            attributes,
            tracker: Tracker::new(declaration.id),
        })
    }

    pub fn group(&self) -> &'a EventGroup<'a> {
        self.group
    }

    pub fn home(&self) -> &str {
        &self.declaration.teams[0]
    }

    pub fn away(&self) -> &str {
        &self.declaration.teams[1]
    }

    pub fn start_time(&self) -> Option<DateTime<Utc>> {
        self.start_time
    }

    pub fn season(&self) -> Option<&'a NameSet> {
        self.declaration.season.as_ref()
    }

    /// Passthrough attributes plus `teams`; what market group names resolve against.
    pub fn attributes(&self) -> &AttributeBag {
        &self.attributes
    }

    /// Betting market groups the event group uses, in declared order.
    pub fn betting_market_groups(&self) -> Vec<Result<BettingMarketGroup<'_>, ReconcileError>> {
        let sport = self.group.sport().scheme();
        self.group
            .scheme()
            .bettingmarketgroups
            .iter()
            .map(|key| -> Result<_, ReconcileError> {
                let def = sport.bettingmarketgroups.get(key).ok_or_else(|| {
                    ValidationError::UnknownBettingMarketGroup {
                        sport: sport.identifier.clone(),
                        key: key.clone(),
                    }
                })?;
                BettingMarketGroup::new(self, key, def)
            })
            .collect()
    }
}

impl Reconcilable for Event<'_> {
    fn kind(&self) -> EntityKind {
        EntityKind::Event
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
        LocalView {
            season: self.declaration.season.as_ref(),
            ..LocalView::new(&self.names)
        }
    }

    fn build_payload(&self, parent: Option<RemoteRef>) -> Result<Payload, ReconcileError> {
        Ok(Payload::Event {
            name: self.names.clone(),
            season: self.declaration.season.clone(),
            start_time: self.start_time,
            event_group_id: self.require_link(parent)?,
        })
    }
}

/// RFC 3339, or minute precision in UTC (`2024-09-08T17:00Z`).
fn parse_start_time(value: Option<&Value>) -> Result<Option<DateTime<Utc>>, ValidationError> {
    let text = match value {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::String(text)) => text,
        Some(other) => {
            return Err(ValidationError::InvalidStartTime {
                value: other.to_string(),
            })
        }
    };
    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Ok(Some(parsed.with_timezone(&Utc)));
    }
    text.strip_suffix('Z')
        .and_then(|naive| NaiveDateTime::parse_from_str(naive, "%Y-%m-%dT%H:%M").ok())
        .map(|naive| Some(Utc.from_utc_datetime(&naive)))
        .ok_or_else(|| ValidationError::InvalidStartTime {
            value: text.clone(),
        })
}
