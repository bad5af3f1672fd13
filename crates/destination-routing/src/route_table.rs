//! Declarative route tables.
//!
//! A route table describes a rule tree as data. Each [`RouteSpec`] with a
//! `handler` becomes a leaf [`ReRule`] resolving to that handler string; a
//! route without one becomes a [`ReSubDispatcher`] built from its nested
//! `rules`. Order in the file is match priority.
//!
//! ```toml
//! [[rules]]
//! name = "page"
//! pattern = '^(?P<pagename>[a-z]+)\.htm$'
//! handler = "pages.show"
//!
//! [[rules]]
//! name = "api"
//! pattern = "^api/"
//!
//!   [[rules.rules]]
//!   name = "login"
//!   pattern = '^login/(?P<user_id>[0-9a-zA-Z]{2,30})$'
//!   handler = "auth.login"
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use destination_core::settings::Settings;
use destination_core::settings_loader::read_config;
use destination_core::{DestinationError, DestinationResult};

use crate::dispatcher::{Dispatcher, Entry};
use crate::rule::ReRule;
use crate::sub_dispatcher::ReSubDispatcher;

/// One rule in a route table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteSpec {
    /// The regex pattern; must start with `^`, and end with `$` for leaves.
    pub pattern: String,
    /// The registration name used for reverse lookups.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// The identifier a leaf rule resolves to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handler: Option<String>,
    /// Nested rules; only valid without a `handler`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rules: Vec<RouteSpec>,
}

impl RouteSpec {
    fn build(&self) -> DestinationResult<Entry<String>> {
        match &self.handler {
            Some(handler) if !self.rules.is_empty() => Err(DestinationError::ConfigurationError(
                format!(
                    "Route '{}' has a handler '{handler}' and nested rules; use one or the other",
                    self.pattern
                ),
            )),
            Some(handler) => Ok(ReRule::with_identifier(&self.pattern, handler.clone())?.into()),
            None => {
                let mut sub = ReSubDispatcher::new(&self.pattern)?;
                register_all(sub.dispatcher_mut(), &self.rules)?;
                Ok(sub.into())
            }
        }
    }
}

/// A whole route table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteTable {
    /// Top-level rules in match-priority order.
    #[serde(default)]
    pub rules: Vec<RouteSpec>,
}

impl RouteTable {
    /// Parses a route table from TOML.
    ///
    /// # Errors
    ///
    /// Returns [`DestinationError::ConfigurationError`] if the TOML is
    /// malformed or does not describe a route table.
    pub fn from_toml_str(toml_str: &str) -> DestinationResult<Self> {
        toml::from_str(toml_str).map_err(|e| {
            DestinationError::ConfigurationError(format!("Failed to parse route table TOML: {e}"))
        })
    }

    /// Reads and parses a TOML route table file.
    ///
    /// # Errors
    ///
    /// Returns [`DestinationError::ConfigurationError`] if the file cannot be
    /// read or parsed.
    pub fn from_toml_file(path: impl AsRef<Path>) -> DestinationResult<Self> {
        Self::from_toml_str(&read_config(path.as_ref(), "TOML")?)
    }

    /// Parses a route table from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`DestinationError::ConfigurationError`] if the JSON is
    /// malformed or does not describe a route table.
    pub fn from_json_str(json_str: &str) -> DestinationResult<Self> {
        serde_json::from_str(json_str).map_err(|e| {
            DestinationError::ConfigurationError(format!("Failed to parse route table JSON: {e}"))
        })
    }

    /// Builds a dispatcher from the table.
    ///
    /// # Errors
    ///
    /// Returns the first construction or registration error, such as a
    /// missing anchor, an invalid or duplicate name, or a route with both a
    /// handler and nested rules.
    pub fn build(&self) -> DestinationResult<Dispatcher<String>> {
        let mut dispatcher = Dispatcher::new();
        register_all(&mut dispatcher, &self.rules)?;
        tracing::debug!(rules = dispatcher.len(), "built dispatcher from route table");
        Ok(dispatcher)
    }
}

fn register_all(dispatcher: &mut Dispatcher<String>, specs: &[RouteSpec]) -> DestinationResult<()> {
    for spec in specs {
        dispatcher.add(spec.build()?, spec.name.as_deref())?;
    }
    Ok(())
}

/// Builds the root dispatcher from the route table named in the settings.
///
/// # Errors
///
/// Returns [`DestinationError::ImproperlyConfigured`] if
/// `settings.routes_file` is unset, otherwise any error from loading or
/// building the table.
pub fn from_settings(settings: &Settings) -> DestinationResult<Dispatcher<String>> {
    let path = settings.routes_file.as_ref().ok_or_else(|| {
        DestinationError::ImproperlyConfigured("routes_file is not set".to_string())
    })?;
    tracing::info!("Loading route table from {}", path.display());
    RouteTable::from_toml_file(path)?.build()
}
