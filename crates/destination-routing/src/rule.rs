//! Leaf rules and the [`Rule`] interface.
//!
//! A [`ReRule`] maps a fully anchored pattern to an opaque identifier. The
//! identifier is never interpreted here: callers decide what a resolved
//! identifier means (a handler name, an enum, a boxed closure, ...).

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::{BuildHasher, Hash};

use regex::Regex;

use destination_core::{DestinationError, DestinationResult};

use crate::pattern::{RuleId, RulePattern};

/// Keyword arguments captured from a path, keyed by capture-group name.
pub type Kwargs = HashMap<String, String>;

/// The result of resolving a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPath<T> {
    /// The identifier of the leaf rule that matched.
    pub identifier: T,
    /// Named captures from every level of the match; deeper levels win.
    pub kwargs: Kwargs,
}

/// Forward parsing and reverse composition, shared by every kind of rule.
pub trait Rule<T> {
    /// Returns the handle assigned to this rule at construction.
    fn id(&self) -> RuleId;

    /// Returns the anchored pattern.
    fn pattern(&self) -> &RulePattern;

    /// Matches `path` from offset 0.
    ///
    /// Fails with an error for which
    /// [`is_not_matched`](DestinationError::is_not_matched) is `true` when
    /// the path does not match.
    fn parse(&self, path: &str) -> DestinationResult<ResolvedPath<T>>;

    /// Composes this rule's part of a path.
    ///
    /// `sub_name` addresses a child rule and is only meaningful for
    /// sub-dispatchers.
    fn compose<K, V, S>(
        &self,
        sub_name: Option<&str>,
        kwargs: &HashMap<K, V, S>,
    ) -> DestinationResult<String>
    where
        K: Borrow<str> + Eq + Hash,
        V: AsRef<str>,
        S: BuildHasher;
}

/// A terminal rule: a pattern anchored at both ends and an identifier.
///
/// # Examples
///
/// ```
/// use std::collections::HashMap;
/// use destination_routing::{ReRule, Rule};
///
/// let rule = ReRule::with_identifier(r"^(?P<filename>[0-9]+)\.jpg$", "image").unwrap();
///
/// let resolved = rule.parse("42.jpg").unwrap();
/// assert_eq!(resolved.identifier, "image");
/// assert_eq!(resolved.kwargs["filename"], "42");
///
/// let mut kwargs = HashMap::new();
/// kwargs.insert("filename", "1234567890");
/// assert_eq!(rule.compose(None, &kwargs).unwrap(), "1234567890.jpg");
/// ```
#[derive(Debug)]
pub struct ReRule<T> {
    pattern: RulePattern,
    identifier: T,
}

impl ReRule<RuleId> {
    /// Creates a rule whose identifier is its own [`RuleId`].
    ///
    /// # Errors
    ///
    /// Returns [`DestinationError::ImproperlyConfigured`] if the regex is
    /// invalid or not anchored with `^` and `$`.
    pub fn new(pattern: &str) -> DestinationResult<Self> {
        let pattern = RulePattern::compile(pattern, true)?;
        Ok(Self {
            identifier: pattern.id(),
            pattern,
        })
    }
}

impl<T> ReRule<T> {
    /// Creates a rule that resolves to `identifier`.
    ///
    /// # Errors
    ///
    /// Returns [`DestinationError::ImproperlyConfigured`] if the regex is
    /// invalid or not anchored with `^` and `$`.
    pub fn with_identifier(pattern: &str, identifier: T) -> DestinationResult<Self> {
        Ok(Self {
            pattern: RulePattern::compile(pattern, true)?,
            identifier,
        })
    }

    /// Creates a rule from a precompiled regex.
    ///
    /// Reverse composition only sees [`Regex::as_str`], so flags set through
    /// [`RegexBuilder`](regex::RegexBuilder) (case-insensitivity, ...) do not
    /// apply when validating composed values. Write such flags inline inside
    /// the group instead, as in `(?P<code>(?i)[a-z]+)`.
    ///
    /// # Errors
    ///
    /// Returns [`DestinationError::ImproperlyConfigured`] if the regex is not
    /// anchored with `^` and `$`.
    pub fn from_regex(regex: Regex, identifier: T) -> DestinationResult<Self> {
        Ok(Self {
            pattern: RulePattern::new(regex, true)?,
            identifier,
        })
    }

    /// Returns the identifier this rule resolves to.
    pub const fn identifier(&self) -> &T {
        &self.identifier
    }

    /// Returns the anchored pattern.
    pub const fn rule_pattern(&self) -> &RulePattern {
        &self.pattern
    }
}

impl<T: Clone> Rule<T> for ReRule<T> {
    fn id(&self) -> RuleId {
        self.pattern.id()
    }

    fn pattern(&self) -> &RulePattern {
        &self.pattern
    }

    fn parse(&self, path: &str) -> DestinationResult<ResolvedPath<T>> {
        let (kwargs, _) = self.pattern.match_path(path).ok_or_else(|| {
            DestinationError::NotMatched(format!(
                "'{path}' does not match '{}'",
                self.pattern.as_str()
            ))
        })?;

        Ok(ResolvedPath {
            identifier: self.identifier.clone(),
            kwargs,
        })
    }

    fn compose<K, V, S>(
        &self,
        sub_name: Option<&str>,
        kwargs: &HashMap<K, V, S>,
    ) -> DestinationResult<String>
    where
        K: Borrow<str> + Eq + Hash,
        V: AsRef<str>,
        S: BuildHasher,
    {
        if let Some(sub_name) = sub_name {
            return Err(DestinationError::NotAddressable(format!(
                "Rule '{}' has no sub-rules; cannot address '{sub_name}'",
                self.pattern.as_str()
            )));
        }
        self.pattern.compose(kwargs)
    }
}
