//! # destination-core
//!
//! Error types, settings, logging and check diagnostics shared by the
//! destination crates. This crate knows nothing about routing itself.
//!
//! ## Modules
//!
//! - [`error`] - The [`DestinationError`] taxonomy and result alias
//! - [`settings`] - Runtime settings
//! - [`settings_loader`] - Loading settings from TOML, JSON and the environment
//! - [`logging`] - Tracing-based logging integration
//! - [`checks`] - Diagnostic messages produced by configuration checks

pub mod checks;
pub mod error;
pub mod logging;
pub mod settings;
pub mod settings_loader;

// Re-export the most commonly used types at the crate root.
pub use error::{DestinationError, DestinationResult};
pub use settings::Settings;
