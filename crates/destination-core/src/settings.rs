//! Runtime settings for destination.
//!
//! Rules are registered on a dispatcher, not configured here; [`Settings`]
//! only covers logging and where to find a declarative route table. See
//! [`settings_loader`](crate::settings_loader) for loading them from files and
//! the environment.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// The complete set of runtime settings.
///
/// Every field has a default, so partial configuration files are valid.
///
/// # Examples
///
/// ```
/// use destination_core::settings::Settings;
///
/// let settings = Settings::default();
/// assert!(!settings.debug);
/// assert_eq!(settings.log_level, "info");
/// assert!(settings.routes_file.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Whether debug mode is enabled. Selects pretty rather than JSON logs.
    pub debug: bool,
    /// The log filter directive (e.g. "info", "destination_routing=trace").
    pub log_level: String,
    /// Path of a TOML route table to build the root dispatcher from.
    pub routes_file: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            debug: false,
            log_level: "info".to_string(),
            routes_file: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert!(!settings.debug);
        assert_eq!(settings.log_level, "info");
        assert_eq!(settings.routes_file, None);
    }

    #[test]
    fn test_serialize_round_trip_through_json() {
        let settings = Settings {
            debug: true,
            log_level: "debug".to_string(),
            routes_file: Some(PathBuf::from("routes.toml")),
        };
        let json = serde_json::to_string(&settings).unwrap();
        let back: Settings = serde_json::from_str(&json).unwrap();
        assert_eq!(back, settings);
    }
}
