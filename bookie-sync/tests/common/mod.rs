//! Shared fixtures: an American football scheme and a ledger that already
//! holds the sport and its event group.

#![allow(dead_code)]

use bookie_core::{Description, EntityKind, EventDeclaration, NameSet, RemoteRef, SportScheme};
use bookie_sync::{RemoteFields, RemoteObjectView, SnapshotLedger};

pub const SPORT: &str = r#"
identifier: AmericanFootball
name:
  en: American Football
eventgroups:
  - identifier: "NFL#Week1"
    name:
      en: NFL - Week 1
    eventscheme:
      name:
        en: "{teams.home} vs {teams.away}"
    bettingmarketgroups: [MoneyLine, HandyCap]
bettingmarketgroups:
  MoneyLine:
    name:
      en: Moneyline
    rules: R_NFL_MO_1
    bettingmarkets:
      - name:
          en: "{teams.home}"
      - name:
          en: "{teams.away}"
  HandyCap:
    name:
      en: "Handy Cap - {HC}"
    name_parameters:
      HC: handy_cap
    bettingmarkets:
      - name:
          en: "{teams.home} ({handy_cap})"
      - name:
          en: "{teams.away}"
rules:
  R_NFL_MO_1:
    id: "1.19.3"
    name:
      en: NFL Moneyline rules
"#;

pub const SPORT_ID: RemoteRef = RemoteRef::new(1, 20, 0);
pub const GROUP_ID: RemoteRef = RemoteRef::new(1, 21, 0);
pub const LIONS_BEARS: &str = "AmericanFootball/NFL#Week1/Lions/Bears";

pub fn sport_scheme() -> SportScheme {
    serde_yaml::from_str(SPORT).expect("sport fixture")
}

pub fn declaration(yaml: &str) -> EventDeclaration {
    serde_yaml::from_str(yaml).expect("event fixture")
}

pub fn lions_bears() -> EventDeclaration {
    declaration(
        r#"
sport: AmericanFootball
eventgroup: "NFL#Week1"
teams: [Lions, Bears]
start_time: "2024-09-08T17:00Z"
handy_cap: 3.5
"#,
    )
}

pub fn description(events: Vec<EventDeclaration>) -> Description {
    Description {
        sports: vec![sport_scheme()],
        events,
    }
}

pub fn names(en: &str) -> NameSet {
    NameSet::new().with("en", en)
}

pub fn committed(id: RemoteRef, name: &str, parent: Option<RemoteRef>) -> RemoteObjectView {
    RemoteObjectView::Committed(RemoteFields {
        id,
        name: names(name),
        season: None,
        rules: None,
        parent,
    })
}

/// Ledger holding the sport and the `NFL#Week1` group.
pub fn ledger() -> SnapshotLedger {
    SnapshotLedger::new()
        .with(
            EntityKind::Sport,
            committed(SPORT_ID, "American Football", None),
        )
        .with(
            EntityKind::EventGroup,
            committed(GROUP_ID, "NFL - Week 1", Some(SPORT_ID)),
        )
}
