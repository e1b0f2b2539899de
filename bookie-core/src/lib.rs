//! bookie core library: domain types, declarative description, config, errors.
//!
//! Public API surface:
//! - [`types`]: identifiers, remote references, name sets, templates, attribute bags
//! - [`error`]: [`ValidationError`], [`InvariantViolation`], [`DescriptionError`], [`ConfigError`]
//! - [`description`]: sport schemes and event declarations, YAML loader
//! - [`config`]: `~/.bookie/config.yaml`

pub mod config;
pub mod description;
pub mod error;
pub mod types;

pub use config::BookieConfig;
pub use description::{
    BettingMarketDef, BettingMarketGroupDef, Description, EventDeclaration, EventGroupScheme,
    EventScheme, RulesDef, SportScheme,
};
pub use error::{ConfigError, DescriptionError, InvariantViolation, ValidationError};
pub use types::{
    exists_remotely, AttributeBag, EntityKind, Identifier, NameSet, NameTemplate, RemoteRef,
    PRIMARY_LANGUAGE,
};
