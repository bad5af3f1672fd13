//! # destination
//!
//! A regex path dispatcher with nested sub-dispatchers and reverse
//! composition.
//!
//! This is the meta-crate that re-exports the sub-crates for convenient
//! access. Depend on `destination` to get everything, or on the individual
//! crates for finer-grained control.
//!
//! ```
//! use std::collections::HashMap;
//! use destination::{Dispatcher, ReRule, ReSubDispatcher};
//!
//! let mut api = ReSubDispatcher::new("^api/").unwrap();
//! let login = ReRule::with_identifier(r"^login/(?P<user_id>[0-9a-z]+)$", "login").unwrap();
//! api.add(login, Some("login")).unwrap();
//!
//! let mut root = Dispatcher::new();
//! root.add(api, Some("api")).unwrap();
//!
//! let mut kwargs = HashMap::new();
//! kwargs.insert("user_id", "alice");
//! let path = root.reverse("api.login", &kwargs).unwrap();
//! assert_eq!(path, "/api/login/alice");
//! assert_eq!(root.resolve(&path).unwrap().identifier, "login");
//! ```

/// Error types, settings, logging and check diagnostics.
pub use destination_core as core;

/// Rules, dispatchers, reverse composition and route tables.
pub use destination_routing as routing;

pub use destination_core::{DestinationError, DestinationResult, Settings};
pub use destination_routing::{
    Dispatcher, Entry, ReRule, ReSubDispatcher, ResolvedPath, Rule, RuleId,
};

/// Third-party crates re-exported for use in route definitions and setup.
pub use regex;
pub use tracing;
pub use tracing_subscriber;
