//! Configuration loading
//!
//! `VLY_ABILITY_*` environment variables override the TOML file, which
//! overrides the built-in defaults.

use crate::ability::TransitionGuard;
use crate::config::types::AppConfig;
use crate::error::ConfigError;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File, FileFormat};
use std::path::PathBuf;
use tracing::debug;

const DEFAULT_CONFIG_PATHS: &[&str] = &[
    "vly-ability.toml",
    ".vly-ability.toml",
    "~/.config/vly-ability/config.toml",
    "/etc/vly-ability/config.toml",
];

/// e.g. `VLY_ABILITY_ENGINE__CONCURRENT_BUILDERS`
const ENV_PREFIX: &str = "VLY_ABILITY";

/// Parse and validate a TOML document, without consulting the environment
pub fn load_config_from_str(toml_str: &str) -> Result<AppConfig, ConfigError> {
    finish(Config::builder().add_source(File::from_str(toml_str, FileFormat::Toml)))
}

/// Load from `config_path`, or the first default path that exists, then
/// apply environment overrides
pub fn load_config(config_path: Option<&str>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder();
    if let Some(path) = config_file(config_path)? {
        debug!(path = %path.display(), "Using configuration file");
        builder = builder.add_source(File::from(path).format(FileFormat::Toml));
    }

    finish(
        builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        ),
    )
}

/// An explicit path must exist. Without one, a missing file is not an error.
fn config_file(explicit: Option<&str>) -> Result<Option<PathBuf>, ConfigError> {
    if let Some(path) = explicit {
        let path = PathBuf::from(path);
        return if path.exists() {
            Ok(Some(path))
        } else {
            Err(ConfigError::Load(format!(
                "Configuration file not found: {}",
                path.display()
            )))
        };
    }

    Ok(DEFAULT_CONFIG_PATHS
        .iter()
        .map(|path| PathBuf::from(shellexpand::tilde(path).into_owned()))
        .find(|path| path.exists()))
}

fn finish(builder: ConfigBuilder<DefaultState>) -> Result<AppConfig, ConfigError> {
    let app_config: AppConfig = builder
        .build()
        .and_then(|config| config.try_deserialize())
        .map_err(|e| ConfigError::Load(e.to_string()))?;

    validate_config(&app_config)?;
    Ok(app_config)
}

/// Validate configuration values
fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    if config.logging.level.trim().is_empty() {
        return Err(ConfigError::Missing {
            field: "logging.level".to_string(),
        });
    }

    if let Some(path) = &config.store.fixtures
        && path.trim().is_empty()
    {
        return Err(ConfigError::Invalid {
            message: "store.fixtures must not be empty when set".to_string(),
        });
    }

    // Builds and discards the guard so bad tables fail at load time
    TransitionGuard::from_config(&config.transitions)?;

    Ok(())
}
