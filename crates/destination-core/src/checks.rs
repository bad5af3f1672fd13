//! Diagnostic messages for configuration checks.
//!
//! Checks inspect a finished configuration (for example a dispatcher's rule
//! set) and report problems before the first request arrives. This module only
//! defines the message types; the routing crate provides the checks.
//!
//! ## Examples
//!
//! ```
//! use destination_core::checks::{CheckLevel, CheckMessage};
//!
//! let msg = CheckMessage::warning(
//!     "Rule 'login' cannot be reversed",
//!     Some("Escape literal metacharacters."),
//!     Some("login"),
//!     Some("routing.W001"),
//! );
//! assert!(msg.is_serious());
//! assert_eq!(msg.level, CheckLevel::Warning);
//! ```

use std::fmt;

/// Severity level for a check message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CheckLevel {
    /// Informational message.
    Info,
    /// A potential problem.
    Warning,
    /// A definite problem that should be fixed.
    Error,
}

impl fmt::Display for CheckLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "INFO"),
            Self::Warning => write!(f, "WARNING"),
            Self::Error => write!(f, "ERROR"),
        }
    }
}

/// A diagnostic message produced by a check.
#[derive(Debug, Clone)]
pub struct CheckMessage {
    /// The severity level.
    pub level: CheckLevel,
    /// The human-readable message describing the issue.
    pub msg: String,
    /// An optional hint on how to fix the issue.
    pub hint: Option<String>,
    /// The object (rule name, setting, ...) that the issue relates to.
    pub obj: Option<String>,
    /// A unique identifier for this kind of message (e.g. "routing.W001").
    pub id: Option<String>,
}

impl CheckMessage {
    /// Creates a new `CheckMessage` with the given level and details.
    pub fn new(
        level: CheckLevel,
        msg: impl Into<String>,
        hint: Option<&str>,
        obj: Option<&str>,
        id: Option<&str>,
    ) -> Self {
        Self {
            level,
            msg: msg.into(),
            hint: hint.map(String::from),
            obj: obj.map(String::from),
            id: id.map(String::from),
        }
    }

    /// Creates a warning-level message.
    pub fn warning(
        msg: impl Into<String>,
        hint: Option<&str>,
        obj: Option<&str>,
        id: Option<&str>,
    ) -> Self {
        Self::new(CheckLevel::Warning, msg, hint, obj, id)
    }

    /// Returns `true` if this is a warning or higher severity.
    pub fn is_serious(&self) -> bool {
        self.level >= CheckLevel::Warning
    }
}

impl fmt::Display for CheckMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref id) = self.id {
            write!(f, "({id}) ")?;
        }
        write!(f, "{}: {}", self.level, self.msg)?;
        if let Some(ref hint) = self.hint {
            write!(f, "\n\tHINT: {hint}")?;
        }
        if let Some(ref obj) = self.obj {
            write!(f, "\n\tObject: {obj}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_ordering() {
        assert!(CheckLevel::Info < CheckLevel::Warning);
        assert!(CheckLevel::Warning < CheckLevel::Error);
    }

    #[test]
    fn test_is_serious() {
        assert!(!CheckMessage::new(CheckLevel::Info, "fine", None, None, None).is_serious());
        assert!(CheckMessage::warning("hm", None, None, None).is_serious());
        assert!(CheckMessage::new(CheckLevel::Error, "bad", None, None, None).is_serious());
    }

    #[test]
    fn test_display_full() {
        let msg = CheckMessage::new(
            CheckLevel::Error,
            "Something broke",
            Some("Fix it"),
            Some("api.login"),
            Some("routing.E001"),
        );
        let text = msg.to_string();
        assert!(text.starts_with("(routing.E001) ERROR: Something broke"));
        assert!(text.contains("HINT: Fix it"));
        assert!(text.contains("Object: api.login"));
    }

    #[test]
    fn test_display_minimal() {
        let msg = CheckMessage::new(CheckLevel::Info, "Just so you know", None, None, None);
        assert_eq!(msg.to_string(), "INFO: Just so you know");
    }
}
