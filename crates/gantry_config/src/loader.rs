//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::types::ProjectConfig;
use std::path::Path;

/// Name of the project configuration file.
pub const CONFIG_FILE: &str = "gantry.toml";

/// Loads and validates a `gantry.toml` configuration from a project directory.
pub fn load_config(project_dir: &Path) -> Result<ProjectConfig, ConfigError> {
    let config_path = project_dir.join(CONFIG_FILE);
    let content = std::fs::read_to_string(&config_path).map_err(|source| ConfigError::Read {
        path: config_path,
        source,
    })?;
    load_config_from_str(&content)
}

/// Parses and validates a `gantry.toml` configuration from a string.
///
/// Useful for testing without filesystem dependencies.
pub fn load_config_from_str(content: &str) -> Result<ProjectConfig, ConfigError> {
    let config: ProjectConfig = toml::from_str(content).map_err(|e| ConfigError::Parse {
        reason: e.to_string(),
    })?;
    validate_config(&config)?;
    Ok(config)
}

/// Validates that required fields are present and configuration values are consistent.
fn validate_config(config: &ProjectConfig) -> Result<(), ConfigError> {
    if config.project.name.is_empty() {
        return Err(ConfigError::MissingField {
            field: "project.name".to_string(),
        });
    }
    if config.compiler.command.is_empty() {
        return Err(ConfigError::MissingField {
            field: "compiler.command".to_string(),
        });
    }
    if config.contracts.extensions.is_empty() {
        return Err(ConfigError::Invalid {
            reason: "contracts.extensions must list at least one extension".to_string(),
        });
    }
    Ok(())
}
