//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::types::HarnessConfig;
use std::path::Path;

/// File name looked up inside a project directory.
pub const CONFIG_FILE_NAME: &str = "rvtb.toml";

/// Loads and validates `<dir>/rvtb.toml`.
pub fn load_config(dir: &Path) -> Result<HarnessConfig, ConfigError> {
    load_config_file(&dir.join(CONFIG_FILE_NAME))
}

/// Loads and validates a configuration file at an explicit path.
pub fn load_config_file(path: &Path) -> Result<HarnessConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    load_config_from_str(&content)
}

/// Parses and validates an `rvtb.toml` configuration from a string.
///
/// Useful for testing without filesystem dependencies.
pub fn load_config_from_str(content: &str) -> Result<HarnessConfig, ConfigError> {
    let config: HarnessConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

/// Checks the cross-field constraints serde cannot express.
pub fn validate_config(config: &HarnessConfig) -> Result<(), ConfigError> {
    let h = &config.harness;
    if h.horizon == 0 {
        return Err(ConfigError::ValidationError(
            "harness.horizon must be at least 1".to_string(),
        ));
    }
    if h.reset_release_tick > h.horizon {
        return Err(ConfigError::ValidationError(format!(
            "harness.reset_release_tick ({}) is beyond harness.horizon ({})",
            h.reset_release_tick, h.horizon
        )));
    }
    if config.trace.enabled && config.trace.path.as_os_str().is_empty() {
        return Err(ConfigError::ValidationError(
            "trace.path must not be empty when tracing is enabled".to_string(),
        ));
    }
    Ok(())
}
