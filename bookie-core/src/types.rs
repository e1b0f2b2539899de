//! Domain types shared by every bookie crate.
//!
//! Name sets and remote references use the ledger's wire shapes: a name set
//! serializes as a list of `[language, text]` pairs and a remote reference as
//! a `"space.type.instance"` string.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::InvariantViolation;

/// Separator between the parts of an [`Identifier`].
pub const IDENTIFIER_SEPARATOR: &str = "/";

/// Language whose text is used for discovery and identifiers.
pub const PRIMARY_LANGUAGE: &str = "en";

// ---------------------------------------------------------------------------
// Identifier
// ---------------------------------------------------------------------------

/// Local, human-readable path of a hierarchy object, e.g. `"NFL/Week1/Lions/Bears"`.
///
/// Never sent to the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Identifier(pub String);

impl Identifier {
    /// Joins the parent identifier (if any) with the discriminant parts.
    ///
    /// Parts keep the order they are given in; `["Home", "Away"]` and
    /// `["Away", "Home"]` are different objects.
    pub fn derive(parent: Option<&Identifier>, discriminant: &[&str]) -> Identifier {
        let mut parts: Vec<&str> = Vec::with_capacity(discriminant.len() + 1);
        if let Some(parent) = parent {
            parts.push(parent.as_str());
        }
        parts.extend_from_slice(discriminant);
        Identifier(parts.join(IDENTIFIER_SEPARATOR))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for Identifier {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for Identifier {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// RemoteRef
// ---------------------------------------------------------------------------

/// Ledger object id of the shape `space.type.instance`.
///
/// Space `0` marks an object that does not exist on the ledger yet; in-batch
/// references to proposed creates use `0.0.<index>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RemoteRef {
    pub space: u64,
    pub kind: u64,
    pub instance: u64,
}

impl RemoteRef {
    pub const fn new(space: u64, kind: u64, instance: u64) -> Self {
        Self { space, kind, instance }
    }

    /// Reference to the create operation at `index` inside the current batch.
    pub const fn relative(index: u64) -> Self {
        Self::new(0, 0, index)
    }

    /// `true` when the reference names an object that is not on the ledger yet.
    pub fn is_pending(&self) -> bool {
        self.space == 0
    }
}

/// `true` only for a reference to an object that already exists on the ledger.
///
/// An absent reference and a space-`0` reference both mean "not created yet".
pub fn exists_remotely(reference: Option<&RemoteRef>) -> bool {
    reference.is_some_and(|r| !r.is_pending())
}

impl fmt::Display for RemoteRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.space, self.kind, self.instance)
    }
}

impl FromStr for RemoteRef {
    type Err = InvariantViolation;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || InvariantViolation::MalformedRemoteRef {
            value: s.to_owned(),
        };
        let parts: Vec<&str> = s.split('.').collect();
        let [space, kind, instance] = parts.as_slice() else {
            return Err(malformed());
        };
        let parse = |part: &str| part.parse::<u64>().map_err(|_| malformed());
        Ok(Self::new(parse(*space)?, parse(*kind)?, parse(*instance)?))
    }
}

impl TryFrom<String> for RemoteRef {
    type Error = InvariantViolation;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<RemoteRef> for String {
    fn from(r: RemoteRef) -> Self {
        r.to_string()
    }
}

// ---------------------------------------------------------------------------
// NameSet
// ---------------------------------------------------------------------------

/// Resolved, language-keyed display text of an object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "NameSetCompat", into = "Vec<(String, String)>")]
pub struct NameSet(BTreeMap<String, String>);

/// Accepts both the YAML mapping form and the ledger's pair-list form.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum NameSetCompat {
    Map(BTreeMap<String, String>),
    Pairs(Vec<(String, String)>),
}

impl From<NameSetCompat> for NameSet {
    fn from(compat: NameSetCompat) -> Self {
        match compat {
            NameSetCompat::Map(map) => NameSet(map),
            NameSetCompat::Pairs(pairs) => pairs.into_iter().collect(),
        }
    }
}

impl From<NameSet> for Vec<(String, String)> {
    fn from(names: NameSet) -> Self {
        names.0.into_iter().collect()
    }
}

impl NameSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, language: impl Into<String>, text: impl Into<String>) -> Self {
        self.insert(language, text);
        self
    }

    pub fn insert(&mut self, language: impl Into<String>, text: impl Into<String>) {
        self.0.insert(language.into(), text.into());
    }

    pub fn get(&self, language: &str) -> Option<&str> {
        self.0.get(language).map(String::as_str)
    }

    /// Text in [`PRIMARY_LANGUAGE`].
    pub fn primary(&self) -> Option<&str> {
        self.get(PRIMARY_LANGUAGE)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(l, t)| (l.as_str(), t.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Content equality: every (language, text) pair of each set appears in
    /// the other. A subset in either direction does not match.
    pub fn matches(&self, other: &NameSet) -> bool {
        self.contained_in(other) && other.contained_in(self)
    }

    fn contained_in(&self, other: &NameSet) -> bool {
        self.0
            .iter()
            .all(|(language, text)| other.0.get(language) == Some(text))
    }
}

impl<L: Into<String>, T: Into<String>> FromIterator<(L, T)> for NameSet {
    fn from_iter<I: IntoIterator<Item = (L, T)>>(iter: I) -> Self {
        NameSet(
            iter.into_iter()
                .map(|(l, t)| (l.into(), t.into()))
                .collect(),
        )
    }
}

// ---------------------------------------------------------------------------
// NameTemplate
// ---------------------------------------------------------------------------

/// Per-language name pattern with `{placeholder}` tokens, plus the table of
/// declared parameters (`placeholder -> attribute path`).
///
/// Placeholders missing from `parameters` read the attribute of the same path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameTemplate {
    pub patterns: BTreeMap<String, String>,
    #[serde(default)]
    pub parameters: BTreeMap<String, String>,
}

impl NameTemplate {
    pub fn new(patterns: BTreeMap<String, String>) -> Self {
        Self {
            patterns,
            parameters: BTreeMap::new(),
        }
    }

    /// Builder-style pattern insert.
    pub fn with_pattern(mut self, language: impl Into<String>, pattern: impl Into<String>) -> Self {
        self.patterns.insert(language.into(), pattern.into());
        self
    }

    /// Builder-style parameter declaration.
    pub fn with_parameter(mut self, placeholder: impl Into<String>, path: impl Into<String>) -> Self {
        self.parameters.insert(placeholder.into(), path.into());
        self
    }

    /// Attribute path a placeholder draws from.
    pub fn attribute_path<'a>(&'a self, placeholder: &'a str) -> &'a str {
        self.parameters
            .get(placeholder)
            .map(String::as_str)
            .unwrap_or(placeholder)
    }
}

// ---------------------------------------------------------------------------
// AttributeBag
// ---------------------------------------------------------------------------

/// Passthrough attributes of a declared object (`handy_cap`, `teams`, ...).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttributeBag(serde_json::Map<String, Value>);

impl AttributeBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Looks up a dotted path: `teams.home` reads the `home` key of the
    /// `teams` object. A key that itself contains dots wins over nesting.
    pub fn lookup(&self, path: &str) -> Option<&Value> {
        if let Some(value) = self.0.get(path) {
            return Some(value);
        }
        let mut segments = path.split('.');
        let mut current = self.0.get(segments.next()?)?;
        for segment in segments {
            current = current.as_object()?.get(segment)?;
        }
        Some(current)
    }

    /// Copies every entry of `other` into `self`, overwriting existing keys.
    pub fn extend_from(&mut self, other: &AttributeBag) {
        for (key, value) in &other.0 {
            self.0.insert(key.clone(), value.clone());
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// ---------------------------------------------------------------------------
// EntityKind
// ---------------------------------------------------------------------------

/// The five levels of the catalog hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Sport,
    EventGroup,
    Event,
    BettingMarketGroup,
    BettingMarket,
}

impl EntityKind {
    /// Ledger operation name used when proposing a new object.
    pub fn create_operation(&self) -> &'static str {
        match self {
            EntityKind::Sport => "sport_create",
            EntityKind::EventGroup => "event_group_create",
            EntityKind::Event => "event_create",
            EntityKind::BettingMarketGroup => "betting_market_group_create",
            EntityKind::BettingMarket => "betting_market_create",
        }
    }

    /// Ledger operation name used when proposing changes to an existing object.
    pub fn update_operation(&self) -> &'static str {
        match self {
            EntityKind::Sport => "sport_update",
            EntityKind::EventGroup => "event_group_update",
            EntityKind::Event => "event_update",
            EntityKind::BettingMarketGroup => "betting_market_group_update",
            EntityKind::BettingMarket => "betting_market_update",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Sport => write!(f, "sport"),
            EntityKind::EventGroup => write!(f, "event group"),
            EntityKind::Event => write!(f, "event"),
            EntityKind::BettingMarketGroup => write!(f, "betting market group"),
            EntityKind::BettingMarket => write!(f, "betting market"),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
