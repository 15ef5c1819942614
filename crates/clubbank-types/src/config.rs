//! Configuration types for a ClubBank engine.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{ClubbankError, Result, constants};

/// What `resetSystem` clears.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResetPolicy {
    /// Clear the audit log only; keep the live allocation state.
    LogsOnly,
    /// Clear the audit log and reload the default scenario.
    #[default]
    LogsAndState,
}

/// Output format of the binary's log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing` filter directive, overridden by `RUST_LOG`.
    pub filter: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: constants::DEFAULT_LOG_FILTER.to_string(),
            format: LogFormat::default(),
        }
    }
}

/// Configuration for one engine instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Labels of the resource kinds, in vector order.
    pub resource_kinds: Vec<String>,
    /// Scenario loaded at session start and on a full reset.
    pub default_scenario: String,
    pub reset_policy: ResetPolicy,
    /// Clubs without a supplied name are called `"{prefix} {index}"`.
    pub club_name_prefix: String,
    pub logging: LoggingConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            resource_kinds: constants::DEFAULT_RESOURCE_KINDS
                .iter()
                .map(|k| (*k).to_string())
                .collect(),
            default_scenario: constants::DEFAULT_SCENARIO.to_string(),
            reset_policy: ResetPolicy::default(),
            club_name_prefix: constants::DEFAULT_CLUB_NAME_PREFIX.to_string(),
            logging: LoggingConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Load a JSON config file. Missing fields take their defaults.
    ///
    /// # Errors
    /// `Io` if the file cannot be read, `Configuration` if it does not parse
    /// or fails [`Self::validate`].
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&raw)
    }

    /// Parse and validate a JSON config.
    ///
    /// # Errors
    /// `Configuration` on parse or validation failure.
    pub fn from_json_str(raw: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(raw)
            .map_err(|e| ClubbankError::Configuration(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    /// `Configuration` describing the first bad value.
    pub fn validate(&self) -> Result<()> {
        if self.resource_kinds.is_empty()
            || self.resource_kinds.len() > constants::MAX_RESOURCE_KINDS
        {
            return Err(ClubbankError::Configuration(format!(
                "resource_kinds must list 1..={} kinds",
                constants::MAX_RESOURCE_KINDS
            )));
        }
        if self.resource_kinds.iter().any(|k| k.trim().is_empty()) {
            return Err(ClubbankError::Configuration(
                "resource kind labels must not be blank".to_string(),
            ));
        }
        if self.default_scenario.trim().is_empty() {
            return Err(ClubbankError::Configuration(
                "default_scenario must not be blank".to_string(),
            ));
        }
        if self.club_name_prefix.trim().is_empty() {
            return Err(ClubbankError::Configuration(
                "club_name_prefix must not be blank".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_deployment() {
        let cfg = EngineConfig::default();
        assert_eq!(cfg.resource_kinds, vec!["Stage", "Projector", "Sound"]);
        assert_eq!(cfg.default_scenario, "basic");
        assert_eq!(cfg.reset_policy, ResetPolicy::LogsAndState);
        assert_eq!(cfg.logging.format, LogFormat::Pretty);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let cfg = EngineConfig::from_json_str(
            r#"{"reset_policy": "logs_only", "logging": {"format": "json"}}"#,
        )
        .unwrap();
        assert_eq!(cfg.reset_policy, ResetPolicy::LogsOnly);
        assert_eq!(cfg.logging.format, LogFormat::Json);
        assert_eq!(cfg.logging.filter, "info");
        assert_eq!(cfg.default_scenario, "basic");
    }

    #[test]
    fn empty_resource_kinds_rejected() {
        let err = EngineConfig::from_json_str(r#"{"resource_kinds": []}"#).unwrap_err();
        assert!(matches!(err, ClubbankError::Configuration(_)));
    }

    #[test]
    fn garbage_is_configuration_error() {
        let err = EngineConfig::from_json_str("not json").unwrap_err();
        assert!(matches!(err, ClubbankError::Configuration(_)));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = EngineConfig::from_json_file("/nonexistent/clubbank.json").unwrap_err();
        assert!(matches!(err, ClubbankError::Io(_)));
    }
}
