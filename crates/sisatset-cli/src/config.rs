//! Configuration loading and management.

use std::fmt;
use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use sisatset_core::{HouseholdId, ValidationError};

/// Owner used when no household is configured.
pub const DEFAULT_HOUSEHOLD: &str = "local";

/// Application configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to the database file.
    pub database_path: PathBuf,

    /// Household that owns records created from this machine.
    pub household_id: String,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("database_path", &self.database_path)
            .field("household_id", &self.household_id)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs_data_path().unwrap_or_else(|| PathBuf::from("."));
        Self {
            database_path: data_dir.join("sisatset.db"),
            household_id: DEFAULT_HOUSEHOLD.to_string(),
        }
    }
}

impl Config {
    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Load from default config location
        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        // Load from specified config file
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // Load from environment variables (SISATSET_*)
        figment = figment.merge(Env::prefixed("SISATSET_"));

        figment.extract()
    }

    /// The configured household as a validated owner ID.
    pub fn household(&self) -> Result<HouseholdId, ValidationError> {
        HouseholdId::new(self.household_id.as_str())
    }
}

/// Returns the platform-specific config directory for sisatset.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("sisatset"))
}

/// Returns the platform-specific data directory for sisatset.
///
/// On Linux: `~/.local/share/sisatset`
pub fn dirs_data_path() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join("sisatset"))
}
