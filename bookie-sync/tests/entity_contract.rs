//! The reconciliation contract on individual entities: discovery, equality
//! against committed and pending remote shapes, proposals and state.

mod common;

use bookie_core::{EntityKind, RemoteRef, ValidationError};
use bookie_sync::{
    Operation, Payload, ProposalBatch, Reconcilable, ReconcileError, ReconcileState,
    RemoteFields, RemoteObjectView, Sport,
};
use chrono::{TimeZone, Utc};
use common::*;

// ---------------------------------------------------------------------------
// 1. Create when absent
// ---------------------------------------------------------------------------

#[test]
fn absent_event_is_proposed_once_and_stays_without_ledger_id() {
    let scheme = sport_scheme();
    let ledger = ledger();
    let mut batch = ProposalBatch::new();

    let mut sport = Sport::new(&scheme).unwrap();
    assert_eq!(sport.find_id(&ledger).unwrap(), Some(SPORT_ID));
    let groups = sport.event_groups();
    let mut group = groups.into_iter().next().unwrap().unwrap();
    assert_eq!(group.find_id(&ledger).unwrap(), Some(GROUP_ID));

    let declaration = lions_bears();
    let mut event = bookie_sync::Event::new(&declaration, &group).unwrap();
    assert_eq!(event.identifier().as_str(), LIONS_BEARS);
    assert_eq!(event.state(), ReconcileState::Unresolved);

    assert_eq!(event.find_id(&ledger).unwrap(), None);
    assert_eq!(event.state(), ReconcileState::Absent);
    assert!(!event.is_synced(&ledger).unwrap());

    let reference = event.propose_new(&mut batch).unwrap();
    assert_eq!(reference, RemoteRef::relative(0));
    assert_eq!(event.remote_ref(), None);
    assert_eq!(event.pending_ref(), Some(reference));
    assert_eq!(event.state(), ReconcileState::PendingProposal);

    assert_eq!(batch.len(), 1);
    match &batch.operations()[0] {
        Operation::Create(Payload::Event {
            name,
            start_time,
            event_group_id,
            ..
        }) => {
            assert_eq!(name.primary(), Some("Lions vs Bears"));
            assert_eq!(*event_group_id, GROUP_ID);
            assert_eq!(
                *start_time,
                Some(Utc.with_ymd_and_hms(2024, 9, 8, 17, 0, 0).unwrap())
            );
        }
        other => panic!("expected an event create, got {other:?}"),
    }

    // Keep `group` borrowed by `event` until here.
    drop(event);
    group.is_synced(&ledger).unwrap();
    assert_eq!(group.state(), ReconcileState::Synchronized);
}

#[test]
fn children_of_a_proposed_event_link_to_its_pending_reference() {
    let scheme = sport_scheme();
    let ledger = ledger();
    let mut batch = ProposalBatch::new();

    let mut sport = Sport::new(&scheme).unwrap();
    sport.find_id(&ledger).unwrap();
    let mut group = sport.event_groups().remove(0).unwrap();
    group.find_id(&ledger).unwrap();

    let declaration = lions_bears();
    let mut event = bookie_sync::Event::new(&declaration, &group).unwrap();
    event.find_id(&ledger).unwrap();
    let event_ref = event.propose_new(&mut batch).unwrap();

    let mut money_line = event.betting_market_groups().remove(0).unwrap();
    assert_eq!(money_line.find_id(&ledger).unwrap(), None);
    money_line.propose_new(&mut batch).unwrap();

    match &batch.operations()[1] {
        Operation::Create(Payload::BettingMarketGroup {
            event_id, rules_id, ..
        }) => {
            assert_eq!(*event_id, event_ref);
            assert_eq!(*rules_id, Some(RemoteRef::new(1, 19, 3)));
        }
        other => panic!("expected a market group create, got {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// 2. Equality against committed and pending shapes
// ---------------------------------------------------------------------------

#[test]
fn committed_match_is_synchronized_without_proposals() {
    let scheme = sport_scheme();
    let event_id = RemoteRef::new(1, 22, 5);
    let ledger = ledger().with(
        EntityKind::Event,
        committed(event_id, "Lions vs Bears", Some(GROUP_ID)),
    );
    let mut batch = ProposalBatch::new();

    let mut sport = Sport::new(&scheme).unwrap();
    sport.find_id(&ledger).unwrap();
    let mut group = sport.event_groups().remove(0).unwrap();
    group.find_id(&ledger).unwrap();

    let declaration = lions_bears();
    let mut event = bookie_sync::Event::new(&declaration, &group).unwrap();
    assert_eq!(event.find_id(&ledger).unwrap(), Some(event_id));
    assert!(event.is_synced(&ledger).unwrap());
    assert_eq!(event.state(), ReconcileState::Synchronized);

    let err = event.propose_update(&mut batch).unwrap_err();
    assert!(matches!(err, ReconcileError::InvalidTransition { .. }));
    assert!(batch.is_empty());
}

#[test]
fn pending_update_with_matching_new_name_is_synchronized() {
    let scheme = sport_scheme();
    let event_id = RemoteRef::new(1, 22, 5);
    let ledger = ledger().with(
        EntityKind::Event,
        RemoteObjectView::PendingUpdate(RemoteFields {
            id: event_id,
            name: names("Lions vs Bears"),
            season: None,
            rules: None,
            parent: Some(GROUP_ID),
        }),
    );

    let mut sport = Sport::new(&scheme).unwrap();
    sport.find_id(&ledger).unwrap();
    let mut group = sport.event_groups().remove(0).unwrap();
    group.find_id(&ledger).unwrap();

    let declaration = lions_bears();
    let mut event = bookie_sync::Event::new(&declaration, &group).unwrap();
    event.find_id(&ledger).unwrap();
    assert!(event.is_synced(&ledger).unwrap());
}

#[test]
fn declared_id_with_different_content_is_stale_and_updated() {
    let scheme = sport_scheme();
    let event_id = RemoteRef::new(1, 22, 5);
    let ledger = ledger().with(
        EntityKind::Event,
        committed(event_id, "Lions v Bears", Some(GROUP_ID)),
    );
    let mut batch = ProposalBatch::new();

    let mut sport = Sport::new(&scheme).unwrap();
    sport.find_id(&ledger).unwrap();
    let mut group = sport.event_groups().remove(0).unwrap();
    group.find_id(&ledger).unwrap();

    let mut declaration = lions_bears();
    declaration.id = Some(event_id);
    let mut event = bookie_sync::Event::new(&declaration, &group).unwrap();
    assert_eq!(event.state(), ReconcileState::KnownUnchecked);

    assert!(!event.is_synced(&ledger).unwrap());
    assert_eq!(event.state(), ReconcileState::Stale);

    let err = event.propose_new(&mut batch).unwrap_err();
    assert!(matches!(err, ReconcileError::InvalidTransition { .. }));

    event.propose_update(&mut batch).unwrap();
    assert_eq!(event.state(), ReconcileState::PendingProposal);
    match &batch.operations()[0] {
        Operation::Update { id, payload } => {
            assert_eq!(*id, event_id);
            assert_eq!(payload.name().primary(), Some("Lions vs Bears"));
        }
        other => panic!("expected an update, got {other:?}"),
    }
}

#[test]
fn unknown_id_is_not_synced_and_runs_no_discovery() {
    let scheme = sport_scheme();
    let ledger = ledger();
    let mut sport = Sport::new(&scheme).unwrap();
    assert!(!sport.is_synced(&ledger).unwrap());
    assert_eq!(sport.state(), ReconcileState::Unresolved);
    assert_eq!(sport.remote_ref(), None);
}

// ---------------------------------------------------------------------------
// 3. Templated market group names and validation
// ---------------------------------------------------------------------------

#[test]
fn handy_cap_group_name_is_resolved_from_event_attributes() {
    let scheme = sport_scheme();
    let sport = Sport::new(&scheme).unwrap();
    let group = sport.event_groups().remove(0).unwrap();
    let declaration = lions_bears();
    let event = bookie_sync::Event::new(&declaration, &group).unwrap();

    let groups = event.betting_market_groups();
    let handy_cap = groups[1].as_ref().unwrap();
    assert_eq!(handy_cap.names().primary(), Some("Handy Cap - 3.5"));
    assert_eq!(
        handy_cap.identifier().as_str(),
        format!("{LIONS_BEARS}/Handy Cap - 3.5")
    );

    let markets = handy_cap.betting_markets();
    let home = markets[0].as_ref().unwrap();
    assert_eq!(home.names().primary(), Some("Lions (3.5)"));
}

#[test]
fn missing_handy_cap_fails_only_that_group() {
    let scheme = sport_scheme();
    let sport = Sport::new(&scheme).unwrap();
    let group = sport.event_groups().remove(0).unwrap();
    let mut declaration = lions_bears();
    declaration.extra = Default::default();
    let event = bookie_sync::Event::new(&declaration, &group).unwrap();

    let groups = event.betting_market_groups();
    assert!(groups[0].is_ok(), "moneyline does not need HC");
    match &groups[1] {
        Err(ReconcileError::Validation(ValidationError::TemplateParameterMissing {
            parameter,
            ..
        })) => assert_eq!(parameter, "HC"),
        other => panic!("expected missing HC, got {other:?}"),
    }
}

#[test]
fn handy_cap_declared_on_the_group_definition_is_bound() {
    let mut scheme = sport_scheme();
    scheme
        .bettingmarketgroups
        .get_mut("HandyCap")
        .unwrap()
        .extra
        .insert("handy_cap", 2.5);
    let sport = Sport::new(&scheme).unwrap();
    let group = sport.event_groups().remove(0).unwrap();
    let mut declaration = lions_bears();
    declaration.extra = Default::default();
    let event = bookie_sync::Event::new(&declaration, &group).unwrap();

    let groups = event.betting_market_groups();
    assert!(groups[0].is_ok());
    let handy_cap = groups[1].as_ref().unwrap();
    assert_eq!(handy_cap.names().primary(), Some("Handy Cap - 2.5"));

    let markets = handy_cap.betting_markets();
    assert_eq!(markets[0].as_ref().unwrap().names().primary(), Some("Lions (2.5)"));
}

#[test]
fn group_definition_attribute_shadows_the_event_attribute() {
    let mut scheme = sport_scheme();
    let def = scheme.bettingmarketgroups.get_mut("HandyCap").unwrap();
    def.extra.insert("handy_cap", 7.5);
    def.bettingmarkets[0].extra.insert("handy_cap", 1.5);
    let sport = Sport::new(&scheme).unwrap();
    let group = sport.event_groups().remove(0).unwrap();
    let declaration = lions_bears();
    let event = bookie_sync::Event::new(&declaration, &group).unwrap();

    let groups = event.betting_market_groups();
    let handy_cap = groups[1].as_ref().unwrap();
    assert_eq!(handy_cap.names().primary(), Some("Handy Cap - 7.5"));

    let markets = handy_cap.betting_markets();
    assert_eq!(markets[0].as_ref().unwrap().names().primary(), Some("Lions (1.5)"));
    assert_eq!(markets[1].as_ref().unwrap().names().primary(), Some("Bears"));
}

#[test]
fn event_needs_exactly_two_teams() {
    let scheme = sport_scheme();
    let sport = Sport::new(&scheme).unwrap();
    let group = sport.event_groups().remove(0).unwrap();
    let mut declaration = lions_bears();
    declaration.teams.push("Packers".to_string());

    let err = bookie_sync::Event::new(&declaration, &group).unwrap_err();
    assert!(matches!(
        err,
        ReconcileError::Validation(ValidationError::InvalidTeamCount { count: 3, .. })
    ));
}

#[test]
fn malformed_start_time_is_rejected() {
    let scheme = sport_scheme();
    let sport = Sport::new(&scheme).unwrap();
    let group = sport.event_groups().remove(0).unwrap();
    let mut declaration = lions_bears();
    declaration.start_time = Some(serde_json::Value::from("sunday evening"));

    let err = bookie_sync::Event::new(&declaration, &group).unwrap_err();
    assert!(matches!(
        err,
        ReconcileError::Validation(ValidationError::InvalidStartTime { .. })
    ));
}

#[test]
fn child_of_unresolved_parent_cannot_build_a_payload() {
    let scheme = sport_scheme();
    let ledger = ledger();
    let mut batch = ProposalBatch::new();
    let sport = Sport::new(&scheme).unwrap();
    let group = sport.event_groups().remove(0).unwrap();
    let declaration = lions_bears();
    let mut event = bookie_sync::Event::new(&declaration, &group).unwrap();

    // Group never searched: nothing to link to, nothing to query under.
    assert_eq!(event.find_id(&ledger).unwrap(), None);
    let err = event.propose_new(&mut batch).unwrap_err();
    assert!(matches!(err, ReconcileError::ParentUnresolved { .. }));
    assert!(batch.is_empty());
}

#[test]
fn children_are_rebuilt_on_every_call() {
    let scheme = sport_scheme();
    let sport = Sport::new(&scheme).unwrap();
    let first: Vec<_> = sport
        .event_groups()
        .into_iter()
        .map(|g| g.unwrap().identifier().clone())
        .collect();
    let second: Vec<_> = sport
        .event_groups()
        .into_iter()
        .map(|g| g.unwrap().identifier().clone())
        .collect();
    assert_eq!(first, second);
    assert_eq!(first[0].as_str(), "AmericanFootball/NFL#Week1");
}
