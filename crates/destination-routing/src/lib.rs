//! # destination-routing
//!
//! Regex-based path routing with reverse composition.
//!
//! A [`Dispatcher`] holds an ordered list of entries. Each entry is either a
//! leaf [`ReRule`], which maps a fully anchored pattern to an identifier, or a
//! [`ReSubDispatcher`], which consumes a prefix and hands the rest of the
//! path to its own nested dispatcher. Resolution returns the first match in
//! registration order; reversal composes a path back from a dotted rule name
//! and keyword arguments.
//!
//! ## Modules
//!
//! - [`rule`] - The [`Rule`] trait and leaf rules
//! - [`dispatcher`] - Ordered, named rule collections
//! - [`sub_dispatcher`] - Nested prefix dispatchers
//! - [`pattern`] - Anchored patterns and rule handles
//! - [`reverse`] - Decomposing regexes for reverse composition
//! - [`route_table`] - Building dispatchers from TOML or JSON route tables
//! - [`checks`] - Diagnostics for finished dispatchers

pub mod checks;
pub mod dispatcher;
pub mod pattern;
pub mod reverse;
pub mod route_table;
pub mod rule;
pub mod sub_dispatcher;

pub use dispatcher::{Dispatcher, Entry};
pub use pattern::{RuleId, RulePattern};
pub use reverse::{CaptureGroup, ReverseFragment};
pub use route_table::{RouteSpec, RouteTable};
pub use rule::{Kwargs, ReRule, ResolvedPath, Rule};
pub use sub_dispatcher::ReSubDispatcher;
