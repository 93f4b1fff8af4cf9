use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{StemDurationConvention, countdown::DEFAULT_WARNING_DAYS};

/// Configuration for timeline planning.
///
/// Controls how results are reported; the filing offsets themselves are
/// regulatory constants and are not configurable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Versions", into = "Versions")]
pub struct Config {
    /// Whether a STEM student's duration is reported as the extension alone
    /// (24 months) or as the whole authorised period (36 months).
    pub stem_duration: StemDurationConvention,

    /// Countdowns at or below this many days are highlighted as urgent.
    warning_days: i64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            stem_duration: StemDurationConvention::default(),
            warning_days: default_warning_days(),
        }
    }
}

impl Config {
    /// Loads the configuration from a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the TOML content is
    /// invalid.
    pub fn load(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file: {e}"))?;
        toml::from_str(&content).map_err(|e| format!("Failed to parse config file: {e}"))
    }

    /// Loads the configuration if the file exists, otherwise returns the
    /// defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_or_default(path: &Path) -> Result<Self, String> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Saves the configuration to a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be serialized to TOML or if
    /// the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), String> {
        let content =
            toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize config: {e}"))?;
        std::fs::write(path, content).map_err(|e| format!("Failed to write config file: {e}"))
    }

    /// Returns the urgency threshold in days.
    #[must_use]
    pub const fn warning_days(&self) -> i64 {
        self.warning_days
    }

    /// Sets the urgency threshold.
    ///
    /// # Errors
    ///
    /// Returns an error if `days` is negative.
    pub fn set_warning_days(&mut self, days: i64) -> Result<(), String> {
        self.warning_days = validate_warning_days(days)?;
        Ok(())
    }
}

fn validate_warning_days(days: i64) -> Result<i64, String> {
    if days < 0 {
        return Err(format!("warning_days must not be negative, got {days}"));
    }
    Ok(days)
}

const fn default_warning_days() -> i64 {
    DEFAULT_WARNING_DAYS
}

/// The serialized versions of the configuration.
/// This allows for future changes to the configuration format and to the domain
/// type without breaking compatibility.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "_version")]
enum Versions {
    #[serde(rename = "1")]
    V1 {
        #[serde(default)]
        stem_duration: StemDurationConvention,

        #[serde(default = "default_warning_days")]
        warning_days: i64,
    },
}

impl TryFrom<Versions> for Config {
    type Error = String;

    fn try_from(versions: Versions) -> Result<Self, Self::Error> {
        match versions {
            Versions::V1 {
                stem_duration,
                warning_days,
            } => Ok(Self {
                stem_duration,
                warning_days: validate_warning_days(warning_days)?,
            }),
        }
    }
}

impl From<Config> for Versions {
    fn from(config: Config) -> Self {
        Self::V1 {
            stem_duration: config.stem_duration,
            warning_days: config.warning_days,
        }
    }
}
