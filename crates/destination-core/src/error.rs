//! Core error types for destination.
//!
//! Every fallible operation in the workspace returns [`DestinationResult`].
//! The variants are grouped by the phase that raises them: forward
//! resolution, registry management, reverse composition and configuration.
//! Callers usually branch on the classification helpers
//! ([`DestinationError::is_not_matched`], [`DestinationError::is_not_found`],
//! [`DestinationError::is_reverse_error`]) rather than on single variants.

use thiserror::Error;

/// The error type for every destination operation.
#[derive(Error, Debug)]
pub enum DestinationError {
    // ── Forward resolution ───────────────────────────────────────────

    /// A single rule's pattern did not match the path at offset 0.
    ///
    /// Dispatchers recover from this locally by trying the next rule.
    #[error("Not matched: {0}")]
    NotMatched(String),

    /// A dispatcher tried every rule and none matched.
    #[error("No matches found: {0}")]
    NoMatchesFound(String),

    // ── Registry ─────────────────────────────────────────────────────

    /// A registration name does not match `^[A-Za-z][A-Za-z0-9_]*$`.
    #[error("Invalid name: {0}")]
    InvalidName(String),

    /// A registration name is already taken in this dispatcher.
    #[error("Duplicate name: {0}")]
    DuplicateName(String),

    /// A rule or name is not registered.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A dotted name reaches into a rule that has no sub-rules.
    #[error("Not addressable: {0}")]
    NotAddressable(String),

    /// An operation was called in a way its receiver does not support.
    #[error("Invalid usage: {0}")]
    Usage(String),

    // ── Reverse composition ──────────────────────────────────────────

    /// A capture group has no value in the supplied keyword arguments.
    #[error("Missing argument: {0}")]
    MissingArgument(String),

    /// A supplied value does not satisfy its capture group's pattern.
    #[error("Reverse error: {0}")]
    Reverse(String),

    /// The pattern cannot be inverted into a template.
    #[error("Non-reversible pattern: {0}")]
    NonReversible(String),

    // ── Configuration ────────────────────────────────────────────────

    /// A rule was constructed from an invalid pattern.
    #[error("Improperly configured: {0}")]
    ImproperlyConfigured(String),

    /// A settings or route table source could not be loaded.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// An I/O error occurred.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl DestinationError {
    /// Returns `true` for "this input did not match" errors.
    ///
    /// [`NoMatchesFound`](Self::NoMatchesFound) is a specialization of
    /// [`NotMatched`](Self::NotMatched), so a nested dispatcher that runs out
    /// of rules reads as a plain mismatch to its parent.
    pub const fn is_not_matched(&self) -> bool {
        matches!(self, Self::NotMatched(_) | Self::NoMatchesFound(_))
    }

    /// Returns `true` for lookup failures: nothing resolves, an unknown name,
    /// or a keyword argument that was not supplied.
    pub const fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::NoMatchesFound(_) | Self::NotFound(_) | Self::MissingArgument(_)
        )
    }

    /// Returns `true` for failures raised while composing a path.
    pub const fn is_reverse_error(&self) -> bool {
        matches!(self, Self::Reverse(_) | Self::NonReversible(_))
    }

    /// Returns an HTTP-style status code for presenting this error.
    ///
    /// - `NotMatched`, `NoMatchesFound`, `NotFound` -> 404
    /// - `InvalidName`, `DuplicateName`, `NotAddressable`, `Usage`,
    ///   `MissingArgument`, `Reverse` -> 400
    /// - Everything else -> 500
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::NotMatched(_) | Self::NoMatchesFound(_) | Self::NotFound(_) => 404,
            Self::InvalidName(_)
            | Self::DuplicateName(_)
            | Self::NotAddressable(_)
            | Self::Usage(_)
            | Self::MissingArgument(_)
            | Self::Reverse(_) => 400,
            Self::NonReversible(_)
            | Self::ImproperlyConfigured(_)
            | Self::ConfigurationError(_)
            | Self::IoError(_) => 500,
        }
    }
}

/// A convenience type alias for `Result<T, DestinationError>`.
pub type DestinationResult<T> = Result<T, DestinationError>;
