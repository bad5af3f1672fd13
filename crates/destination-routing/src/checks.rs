//! Diagnostics for finished dispatchers.
//!
//! Reversal fails lazily, on the first `reverse` call that reaches a bad
//! pattern. [`check_dispatcher`] surfaces those problems up front by walking
//! every named entry under its dotted name.

use destination_core::checks::CheckMessage;

use crate::dispatcher::{Dispatcher, Entry};

/// Checks every named entry of `dispatcher`, recursing into named
/// sub-dispatchers.
///
/// - `routing.W001`: a named rule or sub-dispatcher whose pattern cannot be
///   reversed.
/// - `routing.W002`: a named sub-dispatcher with no named children, so no
///   dotted name can reach into it.
///
/// Messages come out in sorted name order, depth first.
pub fn check_dispatcher<T>(dispatcher: &Dispatcher<T>) -> Vec<CheckMessage> {
    let mut messages = Vec::new();
    check_level(dispatcher, None, &mut messages);
    tracing::debug!(count = messages.len(), "dispatcher checks complete");
    messages
}

fn check_level<T>(
    dispatcher: &Dispatcher<T>,
    prefix: Option<&str>,
    messages: &mut Vec<CheckMessage>,
) {
    for name in dispatcher.names() {
        let Some(entry) = dispatcher.get(name) else {
            continue;
        };
        let dotted =
            prefix.map_or_else(|| name.to_string(), |prefix| format!("{prefix}.{name}"));

        if let Err(e) = entry.rule_pattern().reverse_fragments() {
            messages.push(CheckMessage::warning(
                format!("Rule '{dotted}' cannot be reversed: {e}"),
                Some("Name every group and escape literal metacharacters such as '.'."),
                Some(dotted.as_str()),
                Some("routing.W001"),
            ));
        }

        if let Entry::Sub(sub) = entry {
            if sub.dispatcher().names().is_empty() {
                messages.push(CheckMessage::warning(
                    format!("Sub-dispatcher '{dotted}' has no named rules"),
                    Some("Name at least one child, or leave the sub-dispatcher unnamed."),
                    Some(dotted.as_str()),
                    Some("routing.W002"),
                ));
            }
            check_level(sub.dispatcher(), Some(dotted.as_str()), messages);
        }
    }
}
