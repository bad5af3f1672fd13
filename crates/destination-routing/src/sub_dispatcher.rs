//! Dispatchers that are also rules.
//!
//! A [`ReSubDispatcher`] owns a prefix pattern and a nested [`Dispatcher`].
//! As a rule it consumes the prefix and resolves the rest of the path in its
//! nested dispatcher; as a dispatcher it accepts registrations like any other.
//! Both faces are explicit delegation to the two parts it is composed of.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::{BuildHasher, Hash};

use regex::Regex;

use destination_core::{DestinationError, DestinationResult};

use crate::dispatcher::{Dispatcher, Entry};
use crate::pattern::{RuleId, RulePattern};
use crate::rule::{ResolvedPath, Rule};

/// A prefix rule delegating to a nested dispatcher.
///
/// The pattern must start with `^` but, unlike a leaf rule, need not end
/// with `$`.
///
/// # Examples
///
/// ```
/// use destination_routing::{Dispatcher, ReRule, ReSubDispatcher};
///
/// let mut users = ReSubDispatcher::new(r"^users/(?P<user_id>[0-9]+)/").unwrap();
/// users.add(ReRule::with_identifier(r"^posts/$", "posts").unwrap(), Some("posts")).unwrap();
///
/// let mut root = Dispatcher::new();
/// root.add(users, Some("users")).unwrap();
///
/// let resolved = root.resolve("/users/42/posts/").unwrap();
/// assert_eq!(resolved.identifier, "posts");
/// assert_eq!(resolved.kwargs["user_id"], "42");
/// ```
#[derive(Debug)]
pub struct ReSubDispatcher<T> {
    pattern: RulePattern,
    dispatcher: Dispatcher<T>,
}

impl<T> ReSubDispatcher<T> {
    /// Creates an empty sub-dispatcher for the given prefix pattern.
    ///
    /// # Errors
    ///
    /// Returns [`DestinationError::ImproperlyConfigured`] if the regex is
    /// invalid or does not start with `^`.
    pub fn new(pattern: &str) -> DestinationResult<Self> {
        Ok(Self {
            pattern: RulePattern::compile(pattern, false)?,
            dispatcher: Dispatcher::new(),
        })
    }

    /// Creates an empty sub-dispatcher from a precompiled regex.
    ///
    /// Reverse composition only sees [`Regex::as_str`], so flags set through
    /// [`RegexBuilder`](regex::RegexBuilder) (case-insensitivity, ...) do not
    /// apply when validating composed values. Write such flags inline inside
    /// the group instead, as in `(?P<code>(?i)[a-z]+)`.
    ///
    /// # Errors
    ///
    /// Returns [`DestinationError::ImproperlyConfigured`] if the regex does
    /// not start with `^`.
    pub fn from_regex(regex: Regex) -> DestinationResult<Self> {
        Ok(Self {
            pattern: RulePattern::new(regex, false)?,
            dispatcher: Dispatcher::new(),
        })
    }

    /// Returns the prefix pattern.
    pub const fn rule_pattern(&self) -> &RulePattern {
        &self.pattern
    }

    /// Returns the nested dispatcher.
    pub const fn dispatcher(&self) -> &Dispatcher<T> {
        &self.dispatcher
    }

    /// Returns the nested dispatcher mutably.
    pub fn dispatcher_mut(&mut self) -> &mut Dispatcher<T> {
        &mut self.dispatcher
    }

    /// See [`Dispatcher::add`].
    ///
    /// # Errors
    ///
    /// Same as [`Dispatcher::add`].
    pub fn add(
        &mut self,
        entry: impl Into<Entry<T>>,
        name: Option<&str>,
    ) -> DestinationResult<RuleId> {
        self.dispatcher.add(entry, name)
    }

    /// See [`Dispatcher::add_all`].
    ///
    /// # Errors
    ///
    /// Same as [`Dispatcher::add_all`].
    pub fn add_all<'a, E, I>(&mut self, entries: I) -> DestinationResult<Vec<RuleId>>
    where
        E: Into<Entry<T>>,
        I: IntoIterator<Item = (E, Option<&'a str>)>,
    {
        self.dispatcher.add_all(entries)
    }

    /// See [`Dispatcher::remove`].
    ///
    /// # Errors
    ///
    /// Same as [`Dispatcher::remove`].
    pub fn remove(&mut self, id: RuleId) -> DestinationResult<Entry<T>> {
        self.dispatcher.remove(id)
    }

    /// See [`Dispatcher::remove_named`].
    ///
    /// # Errors
    ///
    /// Same as [`Dispatcher::remove_named`].
    pub fn remove_named(&mut self, name: &str) -> DestinationResult<Entry<T>> {
        self.dispatcher.remove_named(name)
    }

    /// See [`Dispatcher::get`].
    pub fn get(&self, name: &str) -> Option<&Entry<T>> {
        self.dispatcher.get(name)
    }

    /// See [`Dispatcher::get_mut`].
    pub fn get_mut(&mut self, name: &str) -> Option<&mut Entry<T>> {
        self.dispatcher.get_mut(name)
    }

    /// Returns the number of nested entries.
    pub fn len(&self) -> usize {
        self.dispatcher.len()
    }

    /// Returns `true` if no nested entries are registered.
    pub fn is_empty(&self) -> bool {
        self.dispatcher.is_empty()
    }

    /// Reverses a dotted name inside the nested dispatcher.
    ///
    /// The result is relative to this sub-dispatcher's prefix and carries a
    /// leading `/`, like [`Dispatcher::reverse`].
    ///
    /// # Errors
    ///
    /// Same as [`Dispatcher::reverse`].
    pub fn reverse<K, V, S>(
        &self,
        name: &str,
        kwargs: &HashMap<K, V, S>,
    ) -> DestinationResult<String>
    where
        T: Clone,
        K: Borrow<str> + Eq + Hash,
        V: AsRef<str>,
        S: BuildHasher,
    {
        self.dispatcher.reverse(name, kwargs)
    }
}

impl<T: Clone> ReSubDispatcher<T> {
    /// Resolves a path relative to this sub-dispatcher's prefix.
    ///
    /// # Errors
    ///
    /// Same as [`Dispatcher::resolve`].
    pub fn resolve(&self, path: &str) -> DestinationResult<ResolvedPath<T>> {
        self.dispatcher.resolve(path)
    }
}

impl<T: Clone> Rule<T> for ReSubDispatcher<T> {
    fn id(&self) -> RuleId {
        self.pattern.id()
    }

    fn pattern(&self) -> &RulePattern {
        &self.pattern
    }

    fn parse(&self, path: &str) -> DestinationResult<ResolvedPath<T>> {
        let (mut kwargs, remaining) = self.pattern.match_path(path).ok_or_else(|| {
            DestinationError::NotMatched(format!(
                "'{path}' does not start with '{}'",
                self.pattern.as_str()
            ))
        })?;

        let mut resolved = self.dispatcher.resolve_relative(remaining)?;
        // Deeper captures override ours on name collision.
        kwargs.extend(resolved.kwargs);
        resolved.kwargs = kwargs;
        Ok(resolved)
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
        let sub_name = sub_name.ok_or_else(|| {
            DestinationError::Usage(format!(
                "Sub-dispatcher '{}' must be reversed through one of its named rules",
                self.pattern.as_str()
            ))
        })?;

        let mut path = self.pattern.compose(kwargs)?;
        path.push_str(&self.dispatcher.reverse_relative(sub_name, kwargs)?);
        Ok(path)
    }
}
