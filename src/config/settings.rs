//! Bot settings loaded from `config.toml`.
//!
//! Every key is optional. A missing file yields the defaults, which match
//! the page sizes and session lengths the bot has always used:
//!
//! ```toml
//! [pagination]
//! leaderboard_page_size = 10
//! matches_page_size = 5
//! debt_list_page_size = 10
//! deferred_timeout_secs = 300
//! inline_timeout_secs = 60
//! ```

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// Default location of the settings file.
pub const DEFAULT_SETTINGS_PATH: &str = "config.toml";

/// Root of `config.toml`.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Page sizes and session timeouts
    pub pagination: PaginationSettings,
}

/// The `[pagination]` table.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PaginationSettings {
    /// Players per `/leaderboard` page
    pub leaderboard_page_size: u64,
    /// Matches per `/matches` page
    pub matches_page_size: u64,
    /// Players per `/debtlist` page
    pub debt_list_page_size: u64,
    /// Session length for replies that are deferred first
    pub deferred_timeout_secs: u64,
    /// Session length for replies sent directly
    pub inline_timeout_secs: u64,
}

impl Default for PaginationSettings {
    fn default() -> Self {
        Self {
            leaderboard_page_size: 10,
            matches_page_size: 5,
            debt_list_page_size: 10,
            deferred_timeout_secs: 300,
            inline_timeout_secs: 60,
        }
    }
}

impl PaginationSettings {
    /// Session length for deferred replies.
    #[must_use]
    pub const fn deferred_timeout(&self) -> Duration {
        Duration::from_secs(self.deferred_timeout_secs)
    }

    /// Session length for inline replies.
    #[must_use]
    pub const fn inline_timeout(&self) -> Duration {
        Duration::from_secs(self.inline_timeout_secs)
    }

    /// Rejects page sizes and timeouts of zero.
    fn validate(&self) -> Result<()> {
        let values = [
            ("leaderboard_page_size", self.leaderboard_page_size),
            ("matches_page_size", self.matches_page_size),
            ("debt_list_page_size", self.debt_list_page_size),
            ("deferred_timeout_secs", self.deferred_timeout_secs),
            ("inline_timeout_secs", self.inline_timeout_secs),
        ];
        if let Some((key, _)) = values.iter().find(|(_, value)| *value == 0) {
            return Err(Error::Config {
                message: format!("[pagination] {key} must be greater than zero"),
            });
        }
        Ok(())
    }
}

/// Parses settings from TOML text.
///
/// # Errors
/// Returns [`Error::Config`] for invalid TOML or a zero page size or timeout.
pub fn parse_settings(contents: &str) -> Result<Settings> {
    let settings: Settings = toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })?;
    settings.pagination.validate()?;
    Ok(settings)
}

/// Loads settings from a TOML file.
///
/// # Errors
/// Returns an error if the file cannot be read or is not valid TOML.
pub fn load_settings<P: AsRef<Path>>(path: P) -> Result<Settings> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read config file: {e}"),
    })?;
    parse_settings(&contents)
}

/// Loads `./config.toml`, or the defaults when the file does not exist.
pub fn load_default_settings() -> Result<Settings> {
    let path = Path::new(DEFAULT_SETTINGS_PATH);
    if !path.exists() {
        info!("No {} found, using default settings", DEFAULT_SETTINGS_PATH);
        return Ok(Settings::default());
    }
    load_settings(path)
}
