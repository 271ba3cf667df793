//! Configuration types for vly-ability
//!
//! This module defines the configuration structure that can be loaded from
//! TOML files and/or environment variables.

use crate::ability::Role;
use serde::Deserialize;
use std::collections::HashMap;

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Ability compiler settings
    pub engine: EngineConfig,

    /// Transition tables keyed by resource name; replace the built-in ones
    pub transitions: HashMap<String, TransitionTableConfig>,

    /// Fixture data for the command line tool
    pub store: StoreConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Ability compiler settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Run per-role rule builders concurrently
    pub concurrent_builders: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            concurrent_builders: true,
        }
    }
}

/// One transition table
///
/// ```toml
/// [transitions.interest]
/// actor = "volunteer"
/// field = "status"
/// allowed = { invited = ["committed"], committed = ["interested"] }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TransitionTableConfig {
    /// Role whose updates are restricted
    pub actor: Role,

    /// Status-bearing field
    pub field: String,

    /// Current state → permitted next states
    pub allowed: HashMap<String, Vec<String>>,
}

impl Default for TransitionTableConfig {
    fn default() -> Self {
        Self {
            actor: Role::Volunteer,
            field: "status".to_string(),
            allowed: HashMap::new(),
        }
    }
}

/// Fixture location
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Path to a JSON or TOML fixture file
    pub fixtures: Option<String>,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Output format (pretty, json)
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable output
    #[default]
    Pretty,
    /// JSON structured output
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert!(config.engine.concurrent_builders);
        assert!(config.transitions.is_empty());
        assert!(config.store.fixtures.is_none());
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, LogFormat::Pretty);
    }

    #[test]
    fn test_default_transition_table() {
        let table = TransitionTableConfig::default();
        assert_eq!(table.actor, Role::Volunteer);
        assert_eq!(table.field, "status");
        assert!(table.allowed.is_empty());
    }

    #[test]
    fn test_deserialize_log_format() {
        let format: LogFormat = serde_json::from_str(r#""json""#).unwrap();
        assert_eq!(format, LogFormat::Json);

        let format: LogFormat = serde_json::from_str(r#""pretty""#).unwrap();
        assert_eq!(format, LogFormat::Pretty);
    }

    #[test]
    fn test_deserialize_transition_table() {
        let table: TransitionTableConfig = toml::from_str(
            r#"
actor = "opportunity-provider"
allowed = { interested = ["invited", "declined"] }
"#,
        )
        .unwrap();
        assert_eq!(table.actor, Role::OpportunityProvider);
        assert_eq!(table.field, "status");
        assert_eq!(table.allowed["interested"], vec!["invited", "declined"]);
    }
}
