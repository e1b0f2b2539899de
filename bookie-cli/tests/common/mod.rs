//! Description and ledger fixtures written into temp directories.

#![allow(dead_code)]

use std::path::Path;
use std::process::Command;

use assert_fs::prelude::*;
use assert_fs::TempDir;

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
    bettingmarketgroups: [MoneyLine]
bettingmarketgroups:
  MoneyLine:
    name:
      en: Moneyline
    bettingmarkets:
      - name:
          en: "{teams.home}"
      - name:
          en: "{teams.away}"
"#;

pub const EVENTS: &str = r#"
- sport: AmericanFootball
  eventgroup: "NFL#Week1"
  teams: [Lions, Bears]
  id: "1.22.5"
  start_time: "2024-09-08T17:00Z"
"#;

/// Sport and event group on the ledger; Lions vs Bears is there under an older name.
pub const LEDGER: &str = r#"{
  "objects": [
    { "kind": "sport", "id": "1.20.0", "name": [["en", "American Football"]] },
    { "kind": "event_group", "id": "1.21.0", "name": [["en", "NFL - Week 1"]], "parent_id": "1.20.0" },
    { "kind": "event", "id": "1.22.5", "name": [["en", "Lions v Bears"]], "parent_id": "1.21.0" }
  ]
}"#;

pub fn bookie_cmd(home: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("bookie"));
    cmd.env("HOME", home)
        .env("USERPROFILE", home)
        .env("RUST_LOG", "warn");
    cmd
}

/// `<root>/catalog` with one sport file and one events file.
pub fn write_description(root: &TempDir) -> std::path::PathBuf {
    let catalog = root.child("catalog");
    catalog
        .child("sports/american_football.yaml")
        .write_str(SPORT)
        .expect("write sport");
    catalog
        .child("events/week1.yaml")
        .write_str(EVENTS)
        .expect("write events");
    catalog.path().to_path_buf()
}

pub fn write_ledger(root: &TempDir) -> std::path::PathBuf {
    let ledger = root.child("ledger.json");
    ledger.write_str(LEDGER).expect("write ledger");
    ledger.path().to_path_buf()
}
