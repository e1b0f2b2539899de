//! Error types for bookie-core.

use std::path::PathBuf;

use thiserror::Error;

/// Malformed local attributes. Fatal to the single object that carries them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// An event must name exactly two teams, home first.
    #[error("an event needs exactly two teams (home first), got {count}: {teams:?}")]
    InvalidTeamCount { count: usize, teams: Vec<String> },

    /// `start_time` was supplied but is not an RFC 3339 date-time.
    #[error("start_time must be an RFC 3339 date-time, got {value}")]
    InvalidStartTime { value: String },

    /// A name template references a parameter the attributes do not provide.
    #[error("template parameter '{parameter}' is missing (language '{language}')")]
    TemplateParameterMissing { parameter: String, language: String },

    /// The resolved names have no primary-language text to discover or identify by.
    #[error("{kind} has no primary-language name: {names}")]
    MissingPrimaryName { kind: String, names: String },

    /// An event declaration names a sport that is not described.
    #[error("unknown sport '{sport}'")]
    UnknownSport { sport: String },

    /// An event declaration names an event group its sport does not define.
    #[error("sport '{sport}' has no event group '{eventgroup}'")]
    UnknownEventGroup { sport: String, eventgroup: String },

    /// An event group uses a betting market group key its sport does not define.
    #[error("sport '{sport}' defines no betting market group '{key}'")]
    UnknownBettingMarketGroup { sport: String, key: String },

    /// A betting market group references rules its sport does not define.
    #[error("sport '{sport}' defines no rules '{key}'")]
    UnknownRules { sport: String, key: String },
}

/// Remote data this model cannot represent. Reconciliation of the affected
/// object aborts instead of guessing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    #[error("'{value}' is not a space.type.instance object id")]
    MalformedRemoteRef { value: String },

    #[error("remote object {id} carries neither committed nor proposed content")]
    UnrecognizedRemoteShape { id: String },
}

/// Errors that can arise while loading the declarative description.
#[derive(Debug, Error)]
pub enum DescriptionError {
    /// Underlying I/O failure, annotated with the path.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML parse error, with the file it came from.
    #[error("failed to parse description file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// The description directory (or its `sports/` subdirectory) is missing.
    #[error("description not found at {path}")]
    NotFound { path: PathBuf },
}

/// Errors that can arise while loading `~/.bookie/config.yaml`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// `dirs::home_dir()` returned `None`.
    #[error("cannot determine home directory; set $HOME or equivalent")]
    HomeNotFound,
}
