//! Reverse composition: turning a matching regex back into a path.
//!
//! A rule stores only the regular expression it matches with, so composing a
//! path means inverting that expression. [`decompose`] splits a pattern into
//! alternating [`ReverseFragment::Literal`] text and named
//! [`CaptureGroup`]s without a full expression parser:
//!
//! - the `^` start anchor and an unescaped trailing `$` are dropped;
//! - text outside groups must be a plain literal once escapes are removed;
//! - every top-level group must be a named capture group.
//!
//! Anything else (quantifiers, classes, alternation, positional groups) has
//! no single literal form and is rejected with
//! [`DestinationError::NonReversible`].
//!
//! # Examples
//!
//! ```
//! use std::collections::HashMap;
//! use destination_routing::reverse::{compose_fragments, decompose};
//!
//! let fragments = decompose(r"^(?P<filename>[0-9]+)\.jpg$").unwrap();
//! let mut kwargs = HashMap::new();
//! kwargs.insert("filename", "1234567890");
//! assert_eq!(compose_fragments(&fragments, &kwargs).unwrap(), "1234567890.jpg");
//! ```

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::{BuildHasher, Hash};

use regex::Regex;

use destination_core::{DestinationError, DestinationResult};

/// A named capture group extracted from a pattern.
///
/// The `value_pattern` is the group's sub-pattern anchored at both ends; a
/// value supplied during composition must match it completely.
#[derive(Debug, Clone)]
pub struct CaptureGroup {
    name: String,
    value_pattern: Regex,
}

impl CaptureGroup {
    /// Builds a descriptor from the text between a group's parentheses
    /// (e.g. `?P<year>[0-9]{4}`).
    ///
    /// # Errors
    ///
    /// Returns [`DestinationError::NonReversible`] if the group is not a named
    /// capture group or its sub-pattern does not compile on its own.
    pub fn parse(group: &str) -> DestinationResult<Self> {
        let named = group
            .strip_prefix("?P<")
            .or_else(|| group.strip_prefix("?<"))
            .ok_or_else(|| {
                DestinationError::NonReversible(format!(
                    "group '({group})' is not a named capture group and cannot be filled by name"
                ))
            })?;

        let (name, sub_pattern) = named
            .split_once('>')
            .filter(|(name, _)| !name.is_empty())
            .ok_or_else(|| {
                DestinationError::NonReversible(format!("malformed group name in '({group})'"))
            })?;

        let value_pattern = Regex::new(&format!("^(?:{sub_pattern})$")).map_err(|e| {
            DestinationError::NonReversible(format!(
                "sub-pattern of group '{name}' cannot be compiled on its own: {e}"
            ))
        })?;

        Ok(Self {
            name: name.to_string(),
            value_pattern,
        })
    }

    /// Returns the group name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the anchored validator for supplied values.
    pub const fn value_pattern(&self) -> &Regex {
        &self.value_pattern
    }

    /// Returns `true` if `value` fully matches the group's sub-pattern.
    pub fn accepts(&self, value: &str) -> bool {
        self.value_pattern.is_match(value)
    }
}

/// One piece of a decomposed pattern.
#[derive(Debug, Clone)]
pub enum ReverseFragment {
    /// Text copied into the composed path verbatim.
    Literal(String),
    /// A slot filled from the keyword argument with the group's name.
    Group(CaptureGroup),
}

/// Splits a pattern into literal fragments and named capture groups.
///
/// Empty literals are not emitted, so `^(?P<a>x)(?P<b>y)$` yields two
/// groups and nothing else.
///
/// # Errors
///
/// Returns [`DestinationError::NonReversible`] if any part of the pattern
/// cannot be inverted.
pub fn decompose(pattern: &str) -> DestinationResult<Vec<ReverseFragment>> {
    let mut fragments = Vec::new();
    let mut rest = strip_anchors(pattern);

    loop {
        let Some(open) = find_group_start(rest) else {
            push_literal(&mut fragments, rest, pattern)?;
            break;
        };

        push_literal(&mut fragments, &rest[..open], pattern)?;

        let close = find_group_end(rest, open).ok_or_else(|| {
            DestinationError::NonReversible(format!("unbalanced group in '{pattern}'"))
        })?;
        fragments.push(ReverseFragment::Group(CaptureGroup::parse(
            &rest[open + 1..close],
        )?));

        rest = &rest[close + 1..];
    }

    Ok(fragments)
}

/// Concatenates fragments, filling each group from `kwargs`.
///
/// Keyword arguments that no group refers to are ignored.
///
/// # Errors
///
/// Returns [`DestinationError::MissingArgument`] if a group has no value, or
/// [`DestinationError::Reverse`] if a value does not satisfy its group.
pub fn compose_fragments<K, V, S>(
    fragments: &[ReverseFragment],
    kwargs: &HashMap<K, V, S>,
) -> DestinationResult<String>
where
    K: Borrow<str> + Eq + Hash,
    V: AsRef<str>,
    S: BuildHasher,
{
    let mut path = String::new();

    for fragment in fragments {
        match fragment {
            ReverseFragment::Literal(text) => path.push_str(text),
            ReverseFragment::Group(group) => {
                let value = kwargs
                    .get(group.name())
                    .ok_or_else(|| {
                        DestinationError::MissingArgument(format!(
                            "No value provided for '{}'",
                            group.name()
                        ))
                    })?
                    .as_ref();

                if !group.accepts(value) {
                    return Err(DestinationError::Reverse(format!(
                        "Value '{value}' for '{}' does not match '{}'",
                        group.name(),
                        group.value_pattern().as_str()
                    )));
                }
                path.push_str(value);
            }
        }
    }

    Ok(path)
}

/// Returns `true` if `pattern` ends with an unescaped `$`.
pub(crate) fn ends_with_end_anchor(pattern: &str) -> bool {
    let Some(head) = pattern.strip_suffix('$') else {
        return false;
    };
    let backslashes = head.bytes().rev().take_while(|b| *b == b'\\').count();
    backslashes % 2 == 0
}

fn strip_anchors(pattern: &str) -> &str {
    let body = pattern.strip_prefix('^').unwrap_or(pattern);
    if ends_with_end_anchor(body) {
        &body[..body.len() - 1]
    } else {
        body
    }
}

/// Byte offset of the first unescaped `(`.
fn find_group_start(text: &str) -> Option<usize> {
    let mut escaped = false;
    for (i, c) in text.char_indices() {
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == '(' {
            return Some(i);
        }
    }
    None
}

/// Byte offset of the `)` closing the group opened at `open`.
///
/// Escapes and (possibly nested) character classes are skipped, so `[)]` and
/// `\)` do not close the group.
fn find_group_end(text: &str, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut class_depth = 0usize;
    // Right after `[` or `[^` a `]` is a literal member of the class.
    let mut class_first = false;
    let mut escaped = false;

    for (offset, c) in text[open..].char_indices() {
        if escaped {
            escaped = false;
            class_first = false;
            continue;
        }
        if c == '\\' {
            escaped = true;
            continue;
        }

        if class_depth > 0 {
            match c {
                '[' => {
                    class_depth += 1;
                    class_first = true;
                    continue;
                }
                '^' if class_first => continue,
                ']' if !class_first => class_depth -= 1,
                _ => {}
            }
            class_first = false;
            continue;
        }

        match c {
            '[' => {
                class_depth = 1;
                class_first = true;
            }
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(open + offset);
                }
            }
            _ => {}
        }
    }

    None
}

fn push_literal(
    fragments: &mut Vec<ReverseFragment>,
    text: &str,
    pattern: &str,
) -> DestinationResult<()> {
    let literal = unescape_literal(text, pattern)?;
    if !literal.is_empty() {
        fragments.push(ReverseFragment::Literal(literal));
    }
    Ok(())
}

fn unescape_literal(text: &str, pattern: &str) -> DestinationResult<String> {
    let mut literal = String::with_capacity(text.len());
    let mut chars = text.chars();

    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some('n') => literal.push('\n'),
                Some('r') => literal.push('\r'),
                Some('t') => literal.push('\t'),
                // Classes, assertions, backreferences and code-point escapes.
                Some(escaped) if escaped.is_ascii_alphanumeric() => {
                    return Err(DestinationError::NonReversible(format!(
                        "escape '\\{escaped}' in '{pattern}' has no literal form"
                    )));
                }
                // Word-boundary assertions; they match no text.
                Some(escaped @ ('<' | '>')) => {
                    return Err(DestinationError::NonReversible(format!(
                        "assertion '\\{escaped}' in '{pattern}' has no literal form"
                    )));
                }
                Some(escaped) => literal.push(escaped),
                None => {
                    return Err(DestinationError::NonReversible(format!(
                        "dangling backslash in '{pattern}'"
                    )));
                }
            },
            '.' | '^' | '$' | '*' | '+' | '?' | '{' | '[' | '|' | ')' => {
                return Err(DestinationError::NonReversible(format!(
                    "unescaped metacharacter '{c}' in '{pattern}' cannot be inverted into a literal"
                )));
            }
            _ => literal.push(c),
        }
    }

    Ok(literal)
}
