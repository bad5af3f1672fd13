//! Settings loading from configuration files.
//!
//! ## Loading Order
//!
//! 1. Start with default settings.
//! 2. Load from a TOML or JSON file (missing keys keep their defaults).
//! 3. Apply environment variable overrides (highest priority).
//!
//! ## Environment Variable Mapping
//!
//! | Env Var | Setting |
//! |---|---|
//! | `DESTINATION_DEBUG` | `debug` |
//! | `DESTINATION_LOG_LEVEL` | `log_level` |
//! | `DESTINATION_ROUTES_FILE` | `routes_file` |
//!
//! ## Examples
//!
//! ```rust,no_run
//! use destination_core::settings_loader;
//!
//! let settings = settings_loader::from_toml_file_with_env("config/destination.toml").unwrap();
//! ```

use std::path::{Path, PathBuf};

use crate::error::DestinationError;
use crate::settings::Settings;

/// Loads settings from a TOML string.
///
/// # Errors
///
/// Returns an error if the TOML is malformed or cannot be deserialized.
pub fn from_toml_str(toml_str: &str) -> Result<Settings, DestinationError> {
    toml::from_str(toml_str).map_err(|e| {
        DestinationError::ConfigurationError(format!("Failed to parse settings TOML: {e}"))
    })
}

/// Loads settings from a TOML file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or the TOML is malformed.
pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Settings, DestinationError> {
    from_toml_str(&read_config(path.as_ref(), "TOML")?)
}

/// Loads settings from a TOML file and then applies environment variable overrides.
///
/// # Errors
///
/// Returns an error if the file cannot be read or the TOML is malformed.
pub fn from_toml_file_with_env(path: impl AsRef<Path>) -> Result<Settings, DestinationError> {
    let mut settings = from_toml_file(path)?;
    apply_env_overrides(&mut settings);
    Ok(settings)
}

/// Loads settings from a JSON string.
///
/// # Errors
///
/// Returns an error if the JSON is malformed or cannot be deserialized.
pub fn from_json_str(json_str: &str) -> Result<Settings, DestinationError> {
    serde_json::from_str(json_str).map_err(|e| {
        DestinationError::ConfigurationError(format!("Failed to parse settings JSON: {e}"))
    })
}

/// Loads settings from a JSON file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or the JSON is malformed.
pub fn from_json_file(path: impl AsRef<Path>) -> Result<Settings, DestinationError> {
    from_json_str(&read_config(path.as_ref(), "JSON")?)
}

/// Loads settings from just environment variables (starting from defaults).
pub fn from_env() -> Settings {
    let mut settings = Settings::default();
    apply_env_overrides(&mut settings);
    settings
}

/// Applies environment variable overrides to a settings struct.
///
/// - `DESTINATION_DEBUG` -> `debug` ("true"/"1"/"yes" => true, anything else => false)
/// - `DESTINATION_LOG_LEVEL` -> `log_level`
/// - `DESTINATION_ROUTES_FILE` -> `routes_file` (empty unsets it)
pub fn apply_env_overrides(settings: &mut Settings) {
    if let Ok(val) = std::env::var("DESTINATION_DEBUG") {
        settings.debug = matches!(val.to_lowercase().as_str(), "true" | "1" | "yes");
    }

    if let Ok(val) = std::env::var("DESTINATION_LOG_LEVEL") {
        settings.log_level = val;
    }

    if let Ok(val) = std::env::var("DESTINATION_ROUTES_FILE") {
        settings.routes_file = if val.trim().is_empty() {
            None
        } else {
            Some(PathBuf::from(val))
        };
    }
}

/// Reads a configuration file, labelling failures with the expected format.
///
/// # Errors
///
/// Returns [`DestinationError::ConfigurationError`] if the file cannot be read.
pub fn read_config(path: &Path, format: &str) -> Result<String, DestinationError> {
    std::fs::read_to_string(path).map_err(|e| {
        DestinationError::ConfigurationError(format!(
            "Failed to read {format} file '{}': {e}",
            path.display()
        ))
    })
}
