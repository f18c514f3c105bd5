//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::types::FileConfig;
use std::path::Path;

/// The file name looked up in the working directory when no `--config` is given.
pub const CONFIG_FILE_NAME: &str = "bitfasm.toml";

/// Loads and validates a `bitfasm.toml` configuration file.
pub fn load_config(path: &Path) -> Result<FileConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    load_config_from_str(&content)
}

/// Parses and validates a `bitfasm.toml` configuration from a string.
///
/// Useful for testing without filesystem dependencies.
pub fn load_config_from_str(content: &str) -> Result<FileConfig, ConfigError> {
    let config: FileConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

/// Rejects settings that are present but empty.
fn validate_config(config: &FileConfig) -> Result<(), ConfigError> {
    if config
        .database
        .root
        .as_ref()
        .is_some_and(|r| r.as_os_str().is_empty())
    {
        return Err(ConfigError::ValidationError(
            "database.root is empty".to_string(),
        ));
    }
    if config.database.part.as_ref().is_some_and(|p| p.is_empty()) {
        return Err(ConfigError::ValidationError(
            "database.part is empty".to_string(),
        ));
    }
    if config
        .tools
        .bitread
        .as_ref()
        .is_some_and(|b| b.as_os_str().is_empty())
    {
        return Err(ConfigError::ValidationError(
            "tools.bitread is empty".to_string(),
        ));
    }
    Ok(())
}
