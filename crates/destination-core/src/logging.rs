//! Logging integration for destination.
//!
//! The routing crate emits [`tracing`] events and wraps every top-level
//! resolution in a [`resolve_span`]. This module turns [`Settings`] into an
//! installed subscriber.

use tracing_subscriber::fmt;
use tracing_subscriber::EnvFilter;

use crate::settings::Settings;

/// Output format of the installed subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Multi-line, human-readable output with source locations.
    Pretty,
    /// One JSON object per event.
    Json,
}

impl LogFormat {
    /// Pretty in debug mode, JSON otherwise.
    pub const fn for_settings(settings: &Settings) -> Self {
        if settings.debug {
            Self::Pretty
        } else {
            Self::Json
        }
    }
}

/// Builds the event filter from `settings.log_level`.
///
/// An unparsable directive falls back to `info` instead of failing startup.
pub fn filter_for(settings: &Settings) -> EnvFilter {
    EnvFilter::try_new(&settings.log_level).unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Installs the global tracing subscriber described by `settings`.
///
/// Returns `false` if a global subscriber was already installed, in which
/// case the existing one is kept.
pub fn setup_logging(settings: &Settings) -> bool {
    let builder = fmt::Subscriber::builder()
        .with_env_filter(filter_for(settings))
        .with_target(true);

    let installed = match LogFormat::for_settings(settings) {
        LogFormat::Pretty => builder
            .with_file(true)
            .with_line_number(true)
            .pretty()
            .try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    installed.is_ok()
}

/// Creates the span that groups the events of one resolution.
///
/// The `rule` field starts empty; the dispatcher records the matching rule
/// into it once resolution succeeds.
///
/// # Examples
///
/// ```
/// use destination_core::logging::resolve_span;
///
/// let span = resolve_span("/api/login/alice");
/// let _guard = span.enter();
/// span.record("rule", "rule#1");
/// tracing::debug!("resolving");
/// ```
pub fn resolve_span(path: &str) -> tracing::Span {
    tracing::info_span!("resolve", path, rule = tracing::field::Empty)
}
