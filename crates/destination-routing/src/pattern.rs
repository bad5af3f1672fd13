//! Anchored rule patterns.
//!
//! [`RulePattern`] is the part shared by leaf rules and sub-dispatchers: a
//! compiled regex anchored at the start of the path, a process-unique
//! [`RuleId`], and the lazily computed reverse decomposition of the regex.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;
use std::hash::{BuildHasher, Hash};
use std::sync::atomic::{AtomicU64, Ordering};

use once_cell::sync::OnceCell;
use regex::Regex;

use destination_core::{DestinationError, DestinationResult};

use crate::reverse::{self, ReverseFragment};
use crate::rule::Kwargs;

/// A process-unique handle for a rule or sub-dispatcher.
///
/// Assigned at construction and used to remove entries from a dispatcher.
/// It is also the default identifier of a rule built with
/// [`ReRule::new`](crate::rule::ReRule::new).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RuleId(u64);

impl RuleId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the raw numeric value.
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rule#{}", self.0)
    }
}

/// A regex anchored at the start of the path, with its reverse decomposition.
#[derive(Debug)]
pub struct RulePattern {
    id: RuleId,
    /// The compiled regex used for matching
    regex: Regex,
    /// Decomposition for reverse composition, computed on first use
    fragments: OnceCell<Vec<ReverseFragment>>,
}

impl RulePattern {
    /// Compiles `pattern` and validates its anchors.
    ///
    /// A `terminal` pattern belongs to a leaf rule and must also end with an
    /// unescaped `$`.
    ///
    /// # Errors
    ///
    /// Returns [`DestinationError::ImproperlyConfigured`] if the regex is
    /// invalid or an anchor is missing.
    pub fn compile(pattern: &str, terminal: bool) -> DestinationResult<Self> {
        let regex = Regex::new(pattern).map_err(|e| {
            DestinationError::ImproperlyConfigured(format!(
                "Invalid regex pattern '{pattern}': {e}"
            ))
        })?;
        Self::new(regex, terminal)
    }

    /// Wraps an already compiled regex, validating its anchors.
    ///
    /// Reverse composition only sees [`Regex::as_str`], so flags set through
    /// [`RegexBuilder`](regex::RegexBuilder) (case-insensitivity, ...) do not
    /// apply when validating composed values. Write such flags inline inside
    /// the group instead, as in `(?P<code>(?i)[a-z]+)`.
    ///
    /// # Errors
    ///
    /// Returns [`DestinationError::ImproperlyConfigured`] if an anchor is
    /// missing.
    pub fn new(regex: Regex, terminal: bool) -> DestinationResult<Self> {
        let source = regex.as_str();
        if !source.starts_with('^') {
            return Err(DestinationError::ImproperlyConfigured(format!(
                "Pattern '{source}' must start with '^'"
            )));
        }
        if terminal && !reverse::ends_with_end_anchor(source) {
            return Err(DestinationError::ImproperlyConfigured(format!(
                "Pattern '{source}' must end with '$'; only sub-dispatchers may match a prefix"
            )));
        }

        Ok(Self {
            id: RuleId::next(),
            regex,
            fragments: OnceCell::new(),
        })
    }

    /// Returns the handle assigned at construction.
    pub const fn id(&self) -> RuleId {
        self.id
    }

    /// Returns the compiled regex.
    pub const fn regex(&self) -> &Regex {
        &self.regex
    }

    /// Returns the pattern source.
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    /// Returns `true` if the pattern must consume the whole path.
    pub fn is_terminal(&self) -> bool {
        reverse::ends_with_end_anchor(self.regex.as_str())
    }

    /// Matches the pattern at the start of `path`.
    ///
    /// Returns the named captures that took part in the match together with
    /// the unmatched remainder of the path, or `None` if there is no match
    /// starting at offset 0. Unnamed groups are ignored.
    pub fn match_path<'p>(&self, path: &'p str) -> Option<(Kwargs, &'p str)> {
        let captures = self.regex.captures(path)?;
        let full_match = captures.get(0)?;
        // `^a|b` still finds "b" mid-path.
        if full_match.start() != 0 {
            return None;
        }

        let kwargs = self
            .regex
            .capture_names()
            .flatten()
            .filter_map(|name| {
                captures
                    .name(name)
                    .map(|m| (name.to_string(), m.as_str().to_string()))
            })
            .collect();

        Some((kwargs, &path[full_match.end()..]))
    }

    /// Returns the reverse decomposition, computing and caching it on first
    /// success.
    ///
    /// # Errors
    ///
    /// Returns [`DestinationError::NonReversible`] if the pattern cannot be
    /// inverted. Failures are not cached.
    pub fn reverse_fragments(&self) -> DestinationResult<&[ReverseFragment]> {
        self.fragments
            .get_or_try_init(|| reverse::decompose(self.regex.as_str()))
            .map(Vec::as_slice)
    }

    /// Composes this pattern's own contribution to a path.
    ///
    /// # Errors
    ///
    /// See [`reverse::compose_fragments`] and [`Self::reverse_fragments`].
    pub fn compose<K, V, S>(&self, kwargs: &HashMap<K, V, S>) -> DestinationResult<String>
    where
        K: Borrow<str> + Eq + Hash,
        V: AsRef<str>,
        S: BuildHasher,
    {
        reverse::compose_fragments(self.reverse_fragments()?, kwargs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compile_requires_start_anchor() {
        let err = RulePattern::compile("index.htm$", true).unwrap_err();
        assert!(matches!(err, DestinationError::ImproperlyConfigured(_)));
        assert!(err.to_string().contains("must start with '^'"));
    }

    #[test]
    fn test_compile_terminal_requires_end_anchor() {
        let err = RulePattern::compile("^api/", true).unwrap_err();
        assert!(err.to_string().contains("must end with '$'"));
        assert!(RulePattern::compile("^api/", false).is_ok());
    }

    #[test]
    fn test_compile_escaped_dollar_is_not_an_end_anchor() {
        assert!(RulePattern::compile(r"^price\$", true).is_err());
        assert!(RulePattern::compile(r"^price\$$", true).is_ok());
    }

    #[test]
    fn test_compile_invalid_regex() {
        let err = RulePattern::compile("^(unclosed$", true).unwrap_err();
        assert!(err.to_string().contains("Invalid regex pattern"));
    }

    #[test]
    fn test_ids_are_unique() {
        let a = RulePattern::compile("^a$", true).unwrap();
        let b = RulePattern::compile("^a$", true).unwrap();
        assert_ne!(a.id(), b.id());
        assert!(a.id().get() > 0);
        assert!(a.id().to_string().starts_with("rule#"));
    }

    #[test]
    fn test_is_terminal() {
        assert!(RulePattern::compile("^a$", true).unwrap().is_terminal());
        assert!(!RulePattern::compile("^a/", false).unwrap().is_terminal());
    }

    #[test]
    fn test_match_path_returns_remainder() {
        let p = RulePattern::compile("^api/(?P<version>v[0-9]+)/", false).unwrap();
        let (kwargs, remaining) = p.match_path("api/v2/users/").unwrap();
        assert_eq!(kwargs.get("version").unwrap(), "v2");
        assert_eq!(remaining, "users/");
    }

    #[test]
    fn test_match_path_ignores_unnamed_groups() {
        let p = RulePattern::compile(r"^(.*)\.(?P<ext>[a-z]+)$", true).unwrap();
        let (kwargs, remaining) = p.match_path("photo.jpg").unwrap();
        assert_eq!(kwargs.len(), 1);
        assert_eq!(kwargs.get("ext").unwrap(), "jpg");
        assert_eq!(remaining, "");
    }

    #[test]
    fn test_match_path_skips_non_participating_groups() {
        let p = RulePattern::compile(r"^(?P<a>x)?(?P<b>y)$", true).unwrap();
        let (kwargs, _) = p.match_path("y").unwrap();
        assert!(!kwargs.contains_key("a"));
        assert_eq!(kwargs.get("b").unwrap(), "y");
    }

    #[test]
    fn test_match_path_requires_offset_zero() {
        let p = RulePattern::compile("^a|b$", false).unwrap();
        assert!(p.match_path("xb").is_none());
        assert!(p.match_path("abc").is_some());
    }

    #[test]
    fn test_match_path_no_match() {
        let p = RulePattern::compile(r"^(?P<filename>[0-9]+)\.jpg$", true).unwrap();
        assert!(p.match_path("test.png").is_none());
    }

    #[test]
    fn test_reverse_fragments_are_cached() {
        let p = RulePattern::compile(r"^(?P<filename>[0-9]+)\.jpg$", true).unwrap();
        let first = p.reverse_fragments().unwrap().as_ptr();
        let second = p.reverse_fragments().unwrap().as_ptr();
        assert_eq!(first, second);
    }

    #[test]
    fn test_reverse_fragments_error_is_repeatable() {
        let p = RulePattern::compile(r"^(.*).htm$", true).unwrap();
        assert!(p.reverse_fragments().is_err());
        assert!(p.reverse_fragments().is_err());
    }

    #[test]
    fn test_compose() {
        let p = RulePattern::compile(r"^(?P<filename>[0-9]+)\.jpg$", true).unwrap();
        let mut kwargs = HashMap::new();
        kwargs.insert("filename", "1234567890");
        assert_eq!(p.compose(&kwargs).unwrap(), "1234567890.jpg");
    }
}
