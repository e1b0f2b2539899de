//! Declarative catalog description loaded from YAML.
//!
//! # Storage layout
//!
//! ```text
//! <description>/
//!   sports/
//!     <sport>.yaml     (one SportScheme per file)
//!   events/
//!     <anything>.yaml  (a list of EventDeclaration; optional directory)
//! ```
//!
//! Files are read in file-name order so repeated loads yield the same
//! description. The description is immutable input for a reconciliation run.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::DescriptionError;
use crate::types::{AttributeBag, NameSet, NameTemplate, RemoteRef};

// ---------------------------------------------------------------------------
// Scheme types
// ---------------------------------------------------------------------------

/// A sport with its event groups and the shared betting-market-group and
/// rules definitions its event groups refer to by key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SportScheme {
    pub identifier: String,
    /// Known ledger id, if the sport was created before.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RemoteRef>,
    pub name: NameSet,
    #[serde(default)]
    pub eventgroups: Vec<EventGroupScheme>,
    #[serde(default)]
    pub bettingmarketgroups: BTreeMap<String, BettingMarketGroupDef>,
    #[serde(default)]
    pub rules: BTreeMap<String, RulesDef>,
    #[serde(flatten)]
    pub extra: AttributeBag,
}

impl SportScheme {
    pub fn eventgroup(&self, identifier: &str) -> Option<&EventGroupScheme> {
        self.eventgroups.iter().find(|g| g.identifier == identifier)
    }
}

/// An event group (league, tournament) and the scheme its events follow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventGroupScheme {
    pub identifier: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RemoteRef>,
    pub name: NameSet,
    pub eventscheme: EventScheme,
    /// Keys into [`SportScheme::bettingmarketgroups`], in proposal order.
    #[serde(default)]
    pub bettingmarketgroups: Vec<String>,
    #[serde(flatten)]
    pub extra: AttributeBag,
}

/// How events of a group are named, e.g. `{teams.home} vs {teams.away}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventScheme {
    pub name: BTreeMap<String, String>,
    #[serde(default)]
    pub name_parameters: BTreeMap<String, String>,
}

impl EventScheme {
    pub fn name_template(&self) -> NameTemplate {
        NameTemplate {
            patterns: self.name.clone(),
            parameters: self.name_parameters.clone(),
        }
    }
}

/// A betting market group definition shared by the event groups of a sport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BettingMarketGroupDef {
    pub name: BTreeMap<String, String>,
    #[serde(default)]
    pub name_parameters: BTreeMap<String, String>,
    /// Key into [`SportScheme::rules`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rules: Option<String>,
    #[serde(default)]
    pub bettingmarkets: Vec<BettingMarketDef>,
    #[serde(default)]
    pub dynamic: bool,
    #[serde(default)]
    pub is_live: bool,
    #[serde(flatten)]
    pub extra: AttributeBag,
}

impl BettingMarketGroupDef {
    pub fn name_template(&self) -> NameTemplate {
        NameTemplate {
            patterns: self.name.clone(),
            parameters: self.name_parameters.clone(),
        }
    }
}

/// A single betting market (outcome) inside a group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BettingMarketDef {
    pub name: BTreeMap<String, String>,
    #[serde(default)]
    pub name_parameters: BTreeMap<String, String>,
    #[serde(flatten)]
    pub extra: AttributeBag,
}

impl BettingMarketDef {
    pub fn name_template(&self) -> NameTemplate {
        NameTemplate {
            patterns: self.name.clone(),
            parameters: self.name_parameters.clone(),
        }
    }
}

/// Grading rules a betting market group is settled by.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RulesDef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RemoteRef>,
    pub name: NameSet,
    #[serde(flatten)]
    pub extra: AttributeBag,
}

/// One event as declared locally: two teams (home first) in an event group.
///
/// `start_time` is kept as a raw value here; it is validated when the event
/// is attached to its group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventDeclaration {
    pub sport: String,
    pub eventgroup: String,
    pub teams: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub season: Option<NameSet>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RemoteRef>,
    /// Passthrough attributes, e.g. `handy_cap` for templated group names.
    #[serde(flatten)]
    pub extra: AttributeBag,
}

/// Everything a reconciliation run reads.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Description {
    pub sports: Vec<SportScheme>,
    pub events: Vec<EventDeclaration>,
}

impl Description {
    pub fn sport(&self, identifier: &str) -> Option<&SportScheme> {
        self.sports.iter().find(|s| s.identifier == identifier)
    }

    /// Event declarations of one sport, in declaration order.
    pub fn events_for<'a>(&'a self, sport: &'a str) -> impl Iterator<Item = &'a EventDeclaration> {
        self.events.iter().filter(move |e| e.sport == sport)
    }
}

// ---------------------------------------------------------------------------
// Load
// ---------------------------------------------------------------------------

/// `<dir>/sports/`
pub fn sports_dir_at(dir: &Path) -> PathBuf {
    dir.join("sports")
}

/// `<dir>/events/`
pub fn events_dir_at(dir: &Path) -> PathBuf {
    dir.join("events")
}

/// Load a single sport scheme file.
///
/// Returns `DescriptionError::Parse` (with path + line context) if malformed.
pub fn load_sport_at(path: &Path) -> Result<SportScheme, DescriptionError> {
    let contents = std::fs::read_to_string(path).map_err(|e| io_err(path, e))?;
    serde_yaml::from_str(&contents).map_err(|e| DescriptionError::Parse {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Load a file of event declarations.
pub fn load_events_at(path: &Path) -> Result<Vec<EventDeclaration>, DescriptionError> {
    let contents = std::fs::read_to_string(path).map_err(|e| io_err(path, e))?;
    serde_yaml::from_str(&contents).map_err(|e| DescriptionError::Parse {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Load the full description rooted at `dir`.
///
/// `sports/` is required; `events/` is optional and yields no events when absent.
pub fn load_description_at(dir: &Path) -> Result<Description, DescriptionError> {
    let sports_dir = sports_dir_at(dir);
    if !sports_dir.is_dir() {
        return Err(DescriptionError::NotFound { path: sports_dir });
    }

    let mut sports = Vec::new();
    for path in yaml_files(&sports_dir)? {
        sports.push(load_sport_at(&path)?);
    }

    let mut events = Vec::new();
    let events_dir = events_dir_at(dir);
    if events_dir.is_dir() {
        for path in yaml_files(&events_dir)? {
            events.extend(load_events_at(&path)?);
        }
    }

    Ok(Description { sports, events })
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> DescriptionError {
    DescriptionError::Io {
        path: path.into(),
        source,
    }
}

/// `*.yaml` / `*.yml` files directly inside `dir`, sorted by file name.
fn yaml_files(dir: &Path) -> Result<Vec<PathBuf>, DescriptionError> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)
        .map_err(|e| io_err(dir, e))?
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().map(|t| t.is_file()).unwrap_or(false))
        .map(|e| e.path())
        .filter(|p| {
            matches!(
                p.extension().and_then(|s| s.to_str()),
                Some("yaml") | Some("yml")
            )
        })
        .collect();
    files.sort();
    Ok(files)
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
