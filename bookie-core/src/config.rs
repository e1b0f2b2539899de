//! User configuration at `~/.bookie/config.yaml`.
//!
//! Every loader has two forms, following the rest of the workspace:
//! - `fn_at(home: &Path, …)`: explicit home; used in tests with `TempDir`
//! - `fn(…)`: derives home from `dirs::home_dir()`, delegates to `_at`

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Account proposals are attributed to when nothing else is configured.
pub const DEFAULT_PROPOSING_ACCOUNT: &str = "init0";

/// Settings a reconciliation run falls back to when the CLI omits them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookieConfig {
    #[serde(default = "default_account")]
    pub proposing_account: String,
    /// Ledger snapshot file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ledger: Option<PathBuf>,
    /// Directory change-sets are submitted to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outbox: Option<PathBuf>,
}

impl Default for BookieConfig {
    fn default() -> Self {
        Self {
            proposing_account: default_account(),
            ledger: None,
            outbox: None,
        }
    }
}

fn default_account() -> String {
    DEFAULT_PROPOSING_ACCOUNT.to_string()
}

/// `<home>/.bookie/config.yaml`: pure, no I/O.
pub fn config_path_at(home: &Path) -> PathBuf {
    home.join(".bookie").join("config.yaml")
}

/// Load the config under `home`; a missing file yields the defaults.
pub fn load_config_at(home: &Path) -> Result<BookieConfig, ConfigError> {
    let path = config_path_at(home);
    if !path.exists() {
        return Ok(BookieConfig::default());
    }
    let contents = std::fs::read_to_string(&path).map_err(|e| ConfigError::Io {
        path: path.clone(),
        source: e,
    })?;
    serde_yaml::from_str(&contents).map_err(|e| ConfigError::Parse { path, source: e })
}

/// `load_config_at` convenience wrapper.
pub fn load_config() -> Result<BookieConfig, ConfigError> {
    load_config_at(&home()?)
}

fn home() -> Result<PathBuf, ConfigError> {
    dirs::home_dir().ok_or(ConfigError::HomeNotFound)
}
