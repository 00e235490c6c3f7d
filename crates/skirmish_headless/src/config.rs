//! Match configuration loading.
//!
//! The runner plays the standard setup unless RON files override the rules
//! or the roster. Headless matches are always AI against AI.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use skirmish_core::config::{MatchSetup, RulesConfig};
use skirmish_core::data::RosterData;
use skirmish_core::error::GameError;
use skirmish_core::side::Controller;

/// Error type for configuration loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// File not found.
    #[error("Config file not found: {0}")]
    FileNotFound(String),
    /// Failed to read file.
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),
    /// The file parsed but the engine rejected its content.
    #[error("Invalid config: {0}")]
    Invalid(#[from] GameError),
    /// Failed to render RON.
    #[error("Failed to render config: {0}")]
    RenderError(#[from] ron::Error),
}

/// Everything needed to start a headless match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchConfig {
    /// Setup with both sides under AI control.
    pub setup: MatchSetup,
    /// Unit and move definitions.
    pub roster: RosterData,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            setup: MatchSetup::standard(Controller::Ai, Controller::Ai),
            roster: RosterData::standard(),
        }
    }
}

impl MatchConfig {
    /// Standard setup with optional rule and roster overrides.
    pub fn load(rules: Option<&Path>, roster: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(path) = rules {
            config.setup.rules = load_rules(path)?;
        }
        if let Some(path) = roster {
            config.roster = load_roster(path)?;
        }
        Ok(config)
    }

    /// Replace the rules.
    #[must_use]
    pub fn with_rules(mut self, rules: RulesConfig) -> Self {
        self.setup.rules = rules;
        self
    }
}

fn read_source(path: &Path) -> Result<(String, String), ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.display().to_string()));
    }
    let text = std::fs::read_to_string(path)?;
    Ok((path.display().to_string(), text))
}

/// The default rules as pretty RON, a starting point for `--rules` files.
pub fn rules_template() -> Result<String, ConfigError> {
    Ok(ron::ser::to_string_pretty(
        &RulesConfig::default(),
        ron::ser::PrettyConfig::default(),
    )?)
}

/// Load and validate a rules file.
pub fn load_rules(path: &Path) -> Result<RulesConfig, ConfigError> {
    let (name, text) = read_source(path)?;
    Ok(RulesConfig::from_ron_str(&name, &text)?)
}

/// Load and validate a roster file.
///
/// A roster missing a unit the setup fields is rejected when the match is
/// created, not here.
pub fn load_roster(path: &Path) -> Result<RosterData, ConfigError> {
    let (name, text) = read_source(path)?;
    Ok(RosterData::from_ron_str(&name, &text)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config_is_ai_vs_ai() {
        let config = MatchConfig::default();
        assert!(config
            .setup
            .sides
            .iter()
            .all(|side| side.controller == Controller::Ai));
    }

    #[test]
    fn test_load_rules_override() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "RulesConfig(victory_score: 25, upgrades_enabled: false)").unwrap();

        let config = MatchConfig::load(Some(file.path()), None).unwrap();
        assert_eq!(config.setup.rules.victory_score, 25);
        assert!(!config.setup.rules.upgrades_enabled);
        assert_eq!(config.roster, RosterData::standard());
    }

    #[test]
    fn test_missing_file() {
        let err = MatchConfig::load(Some(Path::new("/nonexistent/rules.ron")), None).unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound(_)));
    }

    #[test]
    fn test_invalid_rules_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "RulesConfig(board_size: 2)").unwrap();
        let err = load_rules(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(GameError::InvalidData(_))));
    }

    #[test]
    fn test_rules_template_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rules.ron");
        std::fs::write(&path, rules_template().unwrap()).unwrap();
        assert_eq!(load_rules(&path).unwrap(), RulesConfig::default());
    }

    #[test]
    fn test_roster_round_trip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("roster.ron");
        std::fs::write(&path, RosterData::standard().to_ron_string().unwrap()).unwrap();
        assert_eq!(load_roster(&path).unwrap(), RosterData::standard());
    }
}
