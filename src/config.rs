//! Game configuration loaded from TOML.

use std::path::Path;
use std::time::Duration;

use derive_getters::Getters;
use derive_more::{Display, Error};
use derive_setters::Setters;
use serde::{Deserialize, Serialize};
use strictly_freecell::SequenceRule;
use tracing::{debug, info, instrument};

use crate::driver::AutoCompletePacing;

/// Freecell settings. Every key is optional in the file.
#[derive(Debug, Clone, PartialEq, Getters, Setters, Serialize, Deserialize)]
#[setters(prefix = "with_")]
pub struct FreecellConfig {
    /// SQLite database holding statistics.
    #[serde(default = "default_db_path")]
    db_path: String,

    /// Display name of the signed-in player; anonymous when absent.
    #[serde(default)]
    player: Option<String>,

    /// Delay between auto-complete steps, in milliseconds.
    #[serde(default = "default_auto_complete_delay_ms")]
    auto_complete_delay_ms: u64,

    /// Delay before the first auto-complete step, in milliseconds.
    #[serde(default = "default_auto_complete_start_delay_ms")]
    auto_complete_start_delay_ms: u64,

    /// Whether column-to-column runs are bounded by free space.
    #[serde(default)]
    sequence_rule: SequenceRule,

    /// Fixed deal seed for reproducible games.
    #[serde(default)]
    seed: Option<u64>,
}

#[instrument]
fn default_db_path() -> String {
    "freecell.db".to_string()
}

#[instrument]
fn default_auto_complete_delay_ms() -> u64 {
    800
}

#[instrument]
fn default_auto_complete_start_delay_ms() -> u64 {
    300
}

impl Default for FreecellConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            player: None,
            auto_complete_delay_ms: default_auto_complete_delay_ms(),
            auto_complete_start_delay_ms: default_auto_complete_start_delay_ms(),
            sequence_rule: SequenceRule::default(),
            seed: None,
        }
    }
}

impl FreecellConfig {
    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;

        info!(
            db_path = %config.db_path,
            player = ?config.player,
            rule = ?config.sequence_rule,
            "Config loaded successfully"
        );
        Ok(config)
    }

    /// Loads `path` if it exists, otherwise returns the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file exists but cannot be read or
    /// parsed.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            Self::from_file(path)
        } else {
            debug!("No config file, using defaults");
            Ok(Self::default())
        }
    }

    /// Auto-complete timing.
    pub fn pacing(&self) -> AutoCompletePacing {
        AutoCompletePacing::new(
            Duration::from_millis(self.auto_complete_start_delay_ms),
            Duration::from_millis(self.auto_complete_delay_ms),
        )
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("temp file");
        file.write_all(contents.as_bytes()).expect("write config");
        file
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let file = write_config("");
        let config = FreecellConfig::from_file(file.path()).expect("parse");
        assert_eq!(config, FreecellConfig::default());
        assert_eq!(config.db_path(), "freecell.db");
        assert_eq!(*config.auto_complete_delay_ms(), 800);
        assert_eq!(*config.sequence_rule(), SequenceRule::Capacity);
    }

    #[test]
    fn test_overrides_are_read() {
        let file = write_config(
            r#"
            db_path = "stats.sqlite"
            player = "ada"
            auto_complete_delay_ms = 50
            sequence_rule = "unbounded"
            seed = 42
            "#,
        );
        let config = FreecellConfig::from_file(file.path()).expect("parse");
        assert_eq!(config.db_path(), "stats.sqlite");
        assert_eq!(config.player().as_deref(), Some("ada"));
        assert_eq!(*config.sequence_rule(), SequenceRule::Unbounded);
        assert_eq!(*config.seed(), Some(42));
        assert_eq!(config.pacing().step_delay(), Duration::from_millis(50));
        assert_eq!(config.pacing().start_delay(), Duration::from_millis(300));
    }

    #[test]
    fn test_bad_rule_is_rejected() {
        let file = write_config(r#"sequence_rule = "sometimes""#);
        let err = FreecellConfig::from_file(file.path()).unwrap_err();
        assert!(err.message.contains("Failed to parse config"));
    }

    #[test]
    fn test_missing_file_falls_back() {
        let config = FreecellConfig::load_or_default("/nonexistent/freecell.toml").expect("defaults");
        assert_eq!(config, FreecellConfig::default());
    }

    #[test]
    fn test_setters_chain() {
        let config = FreecellConfig::default()
            .with_seed(Some(7))
            .with_player(Some("grace".to_string()));
        assert_eq!(*config.seed(), Some(7));
        assert_eq!(config.player().as_deref(), Some("grace"));
    }
}
