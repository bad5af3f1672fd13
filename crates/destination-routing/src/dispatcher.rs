//! Ordered, named rule collections.
//!
//! A [`Dispatcher`] tries its entries in registration order and returns the
//! first match: registration order is routing priority, not pattern
//! specificity. Entries registered under a name can also be reversed, and a
//! dotted name (`"api.login"`) walks into nested
//! [`ReSubDispatcher`]s one segment at a time.
//!
//! Dispatchers follow a build-then-serve discipline: `add` and `remove` take
//! `&mut self`, while `resolve` and `reverse` only read. A finished
//! dispatcher can be shared across threads behind an `Arc`.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::{BuildHasher, Hash};

use destination_core::logging::resolve_span;
use destination_core::{DestinationError, DestinationResult};

use crate::pattern::{RuleId, RulePattern};
use crate::rule::{ReRule, ResolvedPath, Rule};
use crate::sub_dispatcher::ReSubDispatcher;

/// An entry in a dispatcher: a leaf rule or a nested dispatcher.
///
/// The variant is fixed when the entry is built, so resolution never has to
/// inspect what an identifier is at runtime.
#[derive(Debug)]
pub enum Entry<T> {
    /// A terminal rule that resolves to an identifier.
    Rule(ReRule<T>),
    /// A prefix rule that delegates the rest of the path.
    Sub(ReSubDispatcher<T>),
}

impl<T> Entry<T> {
    /// Returns the entry's handle.
    pub const fn id(&self) -> RuleId {
        self.rule_pattern().id()
    }

    /// Returns the entry's own pattern.
    pub const fn rule_pattern(&self) -> &RulePattern {
        match self {
            Self::Rule(rule) => rule.rule_pattern(),
            Self::Sub(sub) => sub.rule_pattern(),
        }
    }

    /// Returns `true` if this entry is a nested dispatcher.
    pub const fn is_dispatcher(&self) -> bool {
        matches!(self, Self::Sub(_))
    }

    /// Returns the leaf rule, if this entry is one.
    pub const fn as_rule(&self) -> Option<&ReRule<T>> {
        match self {
            Self::Rule(rule) => Some(rule),
            Self::Sub(_) => None,
        }
    }

    /// Returns the nested dispatcher, if this entry is one.
    pub const fn as_sub(&self) -> Option<&ReSubDispatcher<T>> {
        match self {
            Self::Rule(_) => None,
            Self::Sub(sub) => Some(sub),
        }
    }

    /// Returns the nested dispatcher mutably, if this entry is one.
    pub fn as_sub_mut(&mut self) -> Option<&mut ReSubDispatcher<T>> {
        match self {
            Self::Rule(_) => None,
            Self::Sub(sub) => Some(sub),
        }
    }
}

impl<T: Clone> Rule<T> for Entry<T> {
    fn id(&self) -> RuleId {
        self.rule_pattern().id()
    }

    fn pattern(&self) -> &RulePattern {
        self.rule_pattern()
    }

    fn parse(&self, path: &str) -> DestinationResult<ResolvedPath<T>> {
        match self {
            Self::Rule(rule) => rule.parse(path),
            Self::Sub(sub) => sub.parse(path),
        }
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
        match self {
            Self::Rule(rule) => rule.compose(sub_name, kwargs),
            Self::Sub(sub) => sub.compose(sub_name, kwargs),
        }
    }
}

impl<T> From<ReRule<T>> for Entry<T> {
    fn from(rule: ReRule<T>) -> Self {
        Self::Rule(rule)
    }
}

impl<T> From<ReSubDispatcher<T>> for Entry<T> {
    fn from(sub: ReSubDispatcher<T>) -> Self {
        Self::Sub(sub)
    }
}

/// An ordered collection of rules with a name index.
///
/// # Examples
///
/// ```
/// use std::collections::HashMap;
/// use destination_routing::{Dispatcher, ReRule, ReSubDispatcher};
///
/// let mut api = ReSubDispatcher::new("^api/").unwrap();
/// api.add(
///     ReRule::with_identifier(r"^login/(?P<user_id>[0-9a-zA-Z]{2,30})$", "login").unwrap(),
///     Some("login"),
/// )
/// .unwrap();
///
/// let mut dispatcher = Dispatcher::new();
/// dispatcher.add(api, Some("api")).unwrap();
///
/// let resolved = dispatcher.resolve("/api/login/jctre9owy4q39p4").unwrap();
/// assert_eq!(resolved.identifier, "login");
/// assert_eq!(resolved.kwargs["user_id"], "jctre9owy4q39p4");
///
/// let mut kwargs = HashMap::new();
/// kwargs.insert("user_id", "jctre9owy4q39p4");
/// assert_eq!(
///     dispatcher.reverse("api.login", &kwargs).unwrap(),
///     "/api/login/jctre9owy4q39p4"
/// );
/// ```
#[derive(Debug)]
pub struct Dispatcher<T> {
    /// Entries in match-priority order
    rules: Vec<Entry<T>>,
    /// Registration names; every id here is present in `rules`
    named: HashMap<String, RuleId>,
}

impl<T> Default for Dispatcher<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Dispatcher<T> {
    /// Creates an empty dispatcher.
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            named: HashMap::new(),
        }
    }

    /// Appends an entry, optionally registering it under `name`.
    ///
    /// The name is validated before anything is stored, so a failed `add`
    /// leaves the dispatcher unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`DestinationError::InvalidName`] if `name` does not match
    /// `^[A-Za-z][A-Za-z0-9_]*$`, or [`DestinationError::DuplicateName`] if it
    /// is already registered.
    pub fn add(
        &mut self,
        entry: impl Into<Entry<T>>,
        name: Option<&str>,
    ) -> DestinationResult<RuleId> {
        let entry = entry.into();
        if let Some(name) = name {
            validate_name(name)?;
            if self.named.contains_key(name) {
                return Err(DestinationError::DuplicateName(format!(
                    "A rule named '{name}' is already registered"
                )));
            }
        }

        let id = entry.id();
        tracing::debug!(
            rule = %id,
            pattern = entry.rule_pattern().as_str(),
            name = name.unwrap_or_default(),
            "registered rule"
        );
        self.rules.push(entry);
        if let Some(name) = name {
            self.named.insert(name.to_string(), id);
        }
        Ok(id)
    }

    /// Appends several entries in order.
    ///
    /// Stops at the first failure; entries before it stay registered.
    ///
    /// # Errors
    ///
    /// Returns the first error [`add`](Self::add) reports.
    pub fn add_all<'a, E, I>(&mut self, entries: I) -> DestinationResult<Vec<RuleId>>
    where
        E: Into<Entry<T>>,
        I: IntoIterator<Item = (E, Option<&'a str>)>,
    {
        entries
            .into_iter()
            .map(|(entry, name)| self.add(entry, name))
            .collect()
    }

    /// Removes the entry with the given handle, along with its name.
    ///
    /// # Errors
    ///
    /// Returns [`DestinationError::NotFound`] if no entry has that handle.
    pub fn remove(&mut self, id: RuleId) -> DestinationResult<Entry<T>> {
        let position = self
            .rules
            .iter()
            .position(|entry| entry.id() == id)
            .ok_or_else(|| DestinationError::NotFound(format!("{id} is not registered")))?;

        let entry = self.rules.remove(position);
        self.named.retain(|_, named_id| *named_id != id);
        tracing::debug!(rule = %id, "removed rule");
        Ok(entry)
    }

    /// Removes the entry registered under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`DestinationError::NotFound`] if the name is not registered.
    pub fn remove_named(&mut self, name: &str) -> DestinationResult<Entry<T>> {
        let id = self
            .named
            .get(name)
            .copied()
            .ok_or_else(|| DestinationError::NotFound(format!("No rule named '{name}'")))?;
        self.remove(id)
    }

    /// Returns the entry registered under `name`.
    pub fn get(&self, name: &str) -> Option<&Entry<T>> {
        let id = *self.named.get(name)?;
        self.rules.iter().find(|entry| entry.id() == id)
    }

    /// Returns the entry registered under `name` mutably.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut Entry<T>> {
        let id = *self.named.get(name)?;
        self.rules.iter_mut().find(|entry| entry.id() == id)
    }

    /// Returns `true` if an entry with this handle is registered.
    pub fn contains(&self, id: RuleId) -> bool {
        self.rules.iter().any(|entry| entry.id() == id)
    }

    /// Returns the name an entry is registered under.
    pub fn name_of(&self, id: RuleId) -> Option<&str> {
        self.named
            .iter()
            .find(|(_, named_id)| **named_id == id)
            .map(|(name, _)| name.as_str())
    }

    /// Returns the registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.named.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Iterates over the entries in match-priority order.
    pub fn iter(&self) -> std::slice::Iter<'_, Entry<T>> {
        self.rules.iter()
    }

    /// Returns the number of entries, named or not.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns `true` if no entries are registered.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Composes the path for a dotted name, returning it with a leading `/`.
    ///
    /// # Errors
    ///
    /// Returns [`DestinationError::NotFound`] for an unknown name segment,
    /// [`DestinationError::NotAddressable`] when a dotted name continues past
    /// a leaf rule, [`DestinationError::Usage`] when it stops at a
    /// sub-dispatcher, and any error raised by composing the patterns.
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
        let path = self.reverse_relative(name, kwargs)?;
        tracing::debug!(name, path = path.as_str(), "reversed");
        Ok(format!("/{path}"))
    }

    /// Composes the path for a dotted name without the leading `/`.
    pub(crate) fn reverse_relative<K, V, S>(
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
        let (head, rest) = match name.split_once('.') {
            Some((head, rest)) => (head, Some(rest)),
            None => (name, None),
        };

        let entry = self
            .get(head)
            .ok_or_else(|| DestinationError::NotFound(format!("No rule named '{head}'")))?;
        entry.compose(rest, kwargs)
    }
}

impl<T: Clone> Dispatcher<T> {
    /// Resolves a path to the first matching rule's identifier and captures.
    ///
    /// One leading `/` is stripped before matching. Entries are tried in
    /// registration order; a sub-dispatcher that matches its prefix but none
    /// of its children counts as a mismatch and the next entry is tried.
    ///
    /// Events emitted while resolving are grouped under a
    /// [`resolve_span`], which records the matching top-level rule.
    ///
    /// # Errors
    ///
    /// Returns [`DestinationError::NoMatchesFound`] if nothing matches. Errors
    /// that are not mismatches are returned as soon as they occur.
    pub fn resolve(&self, path: &str) -> DestinationResult<ResolvedPath<T>> {
        let span = resolve_span(path);
        let _guard = span.enter();
        self.resolve_relative(path)
    }

    /// Resolves a path without opening a new span.
    pub(crate) fn resolve_relative(&self, path: &str) -> DestinationResult<ResolvedPath<T>> {
        let path = path.strip_prefix('/').unwrap_or(path);

        for entry in &self.rules {
            tracing::trace!(
                rule = %entry.id(),
                pattern = entry.rule_pattern().as_str(),
                "trying rule"
            );
            match entry.parse(path) {
                Ok(resolved) => {
                    tracing::Span::current().record("rule", tracing::field::display(entry.id()));
                    tracing::debug!(rule = %entry.id(), path, "resolved");
                    return Ok(resolved);
                }
                Err(e) if e.is_not_matched() => {}
                Err(e) => return Err(e),
            }
        }

        tracing::debug!(path, "no rule matches");
        Err(DestinationError::NoMatchesFound(format!("No rule matches '{path}'")))
    }
}

impl<'a, T> IntoIterator for &'a Dispatcher<T> {
    type Item = &'a Entry<T>;
    type IntoIter = std::slice::Iter<'a, Entry<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Checks a registration name against `^[A-Za-z][A-Za-z0-9_]*$`.
fn validate_name(name: &str) -> DestinationResult<()> {
    let mut chars = name.chars();
    let valid = chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');

    if valid {
        Ok(())
    } else {
        Err(DestinationError::InvalidName(format!(
            "'{name}' must match ^[A-Za-z][A-Za-z0-9_]*$"
        )))
    }
}
