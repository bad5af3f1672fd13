//! Integration tests for resolving and reversing through dispatcher trees.
//!
//! Tests cover: leading-slash normalization, not-found propagation, nested
//! dotted reverse, non-reversible patterns, removal, name uniqueness,
//! first-match priority, kwargs merging, checks and shared use across threads.

use std::collections::HashMap;
use std::sync::Arc;
use std::thread;

use destination_core::DestinationError;
use destination_routing::checks::check_dispatcher;
use destination_routing::{Dispatcher, ReRule, ReSubDispatcher, Rule, RuleId};

fn kwargs<'a>(pairs: &[(&'a str, &'a str)]) -> HashMap<&'a str, &'a str> {
    pairs.iter().copied().collect()
}

fn api_dispatcher() -> Dispatcher<&'static str> {
    let mut api = ReSubDispatcher::new("^api/").unwrap();
    api.add(
        ReRule::with_identifier(r"^login/(?P<user_id>[0-9a-zA-Z]{2,30})$", "login").unwrap(),
        Some("login"),
    )
    .unwrap();

    let mut dispatcher = Dispatcher::new();
    dispatcher.add(api, Some("api")).unwrap();
    dispatcher
}

// ═════════════════════════════════════════════════════════════════════
// 1. Leading slash: one leading "/" is optional
// ═════════════════════════════════════════════════════════════════════

#[test]
fn test_leading_slash_is_normalized() {
    let mut dispatcher = Dispatcher::new();
    dispatcher
        .add(ReRule::new(r"^(?P<pagename>.*)\.htm$").unwrap(), None)
        .unwrap();

    for path in ["/test.htm", "test.htm"] {
        let resolved = dispatcher.resolve(path).unwrap();
        assert_eq!(resolved.kwargs["pagename"], "test", "path {path}");
    }
}

// ═════════════════════════════════════════════════════════════════════
// 2. Not found: no rule matches
// ═════════════════════════════════════════════════════════════════════

#[test]
fn test_unmatched_path_is_not_found() {
    let mut dispatcher = Dispatcher::new();
    dispatcher
        .add(ReRule::new(r"^(?P<pagename>.*)\.htm$").unwrap(), None)
        .unwrap();
    dispatcher
        .add(ReRule::new(r"^(?P<filename>.*)\.jpg$").unwrap(), None)
        .unwrap();

    let err = dispatcher.resolve("test.mp3").unwrap_err();
    assert!(matches!(err, DestinationError::NoMatchesFound(_)));
    assert_eq!(err.status_code(), 404);
}

#[test]
fn test_sub_dispatcher_miss_falls_through_to_next_rule() {
    let mut dispatcher = api_dispatcher();
    dispatcher
        .add(ReRule::with_identifier(r"^(?P<rest>.*)$", "fallback").unwrap(), None)
        .unwrap();

    let resolved = dispatcher.resolve("/api/logout").unwrap();
    assert_eq!(resolved.identifier, "fallback");
    assert_eq!(resolved.kwargs["rest"], "api/logout");
}

// ═════════════════════════════════════════════════════════════════════
// 3. Nested dotted reverse
// ═════════════════════════════════════════════════════════════════════

#[test]
fn test_nested_resolve_and_reverse() {
    let dispatcher = api_dispatcher();
    let path = "/api/login/jctre9owy4q39p4";

    let resolved = dispatcher.resolve(path).unwrap();
    assert_eq!(resolved.identifier, "login");
    assert_eq!(resolved.kwargs["user_id"], "jctre9owy4q39p4");

    let args = kwargs(&[("user_id", "jctre9owy4q39p4")]);
    assert_eq!(dispatcher.reverse("api.login", &args).unwrap(), path);
}

#[test]
fn test_reverse_accepts_owned_kwargs() {
    let dispatcher = api_dispatcher();
    let resolved = dispatcher.resolve("/api/login/alice").unwrap();
    assert_eq!(
        dispatcher.reverse("api.login", &resolved.kwargs).unwrap(),
        "/api/login/alice"
    );
}

#[test]
fn test_three_levels_deep() {
    let mut posts = ReSubDispatcher::new(r"^(?P<user>[a-z]+)/").unwrap();
    posts
        .add(
            ReRule::with_identifier(r"^posts/(?P<post_id>[0-9]+)$", "post").unwrap(),
            Some("post"),
        )
        .unwrap();
    let mut users = ReSubDispatcher::new("^users/").unwrap();
    users.add(posts, Some("byuser")).unwrap();
    let mut dispatcher = Dispatcher::new();
    dispatcher.add(users, Some("users")).unwrap();

    let resolved = dispatcher.resolve("/users/ann/posts/7").unwrap();
    assert_eq!(resolved.identifier, "post");
    assert_eq!(resolved.kwargs["user"], "ann");
    assert_eq!(resolved.kwargs["post_id"], "7");

    let args = kwargs(&[("user", "ann"), ("post_id", "7")]);
    assert_eq!(
        dispatcher.reverse("users.byuser.post", &args).unwrap(),
        "/users/ann/posts/7"
    );
}

#[test]
fn test_reverse_errors() {
    let dispatcher = api_dispatcher();

    assert!(matches!(
        dispatcher.reverse("web.login", &kwargs(&[])),
        Err(DestinationError::NotFound(_))
    ));
    assert!(matches!(
        dispatcher.reverse("api", &kwargs(&[])),
        Err(DestinationError::Usage(_))
    ));
    assert!(matches!(
        dispatcher.reverse("api.login.more", &kwargs(&[("user_id", "ab")])),
        Err(DestinationError::NotAddressable(_))
    ));

    let err = dispatcher.reverse("api.login", &kwargs(&[])).unwrap_err();
    assert!(matches!(err, DestinationError::MissingArgument(_)));
    assert!(err.is_not_found());

    let err = dispatcher
        .reverse("api.login", &kwargs(&[("user_id", "x")]))
        .unwrap_err();
    assert!(matches!(err, DestinationError::Reverse(_)));
    assert!(err.is_reverse_error());
}

// ═════════════════════════════════════════════════════════════════════
// 4. Non-reversible patterns
// ═════════════════════════════════════════════════════════════════════

#[test]
fn test_non_reversible_patterns() {
    for pattern in [r"^(.*).htm$", r"^(?P<filename>.*).htm$"] {
        let mut dispatcher = Dispatcher::new();
        dispatcher.add(ReRule::new(pattern).unwrap(), Some("page")).unwrap();

        // Forward resolution still works.
        assert!(dispatcher.resolve("index.htm").is_ok());

        let err = dispatcher
            .reverse("page", &kwargs(&[("filename", "index")]))
            .unwrap_err();
        assert!(
            matches!(err, DestinationError::NonReversible(_)),
            "{pattern} should not reverse"
        );

        let messages = check_dispatcher(&dispatcher);
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].id.as_deref(), Some("routing.W001"));
    }
}

// ═════════════════════════════════════════════════════════════════════
// 5. Removal
// ═════════════════════════════════════════════════════════════════════

#[test]
fn test_removed_rule_no_longer_resolves_or_reverses() {
    let mut dispatcher = Dispatcher::new();
    let id = dispatcher
        .add(
            ReRule::new(r"^(?P<filename>[0-9]+)\.jpg$").unwrap(),
            Some("image"),
        )
        .unwrap();
    assert_eq!(dispatcher.resolve("/1.jpg").unwrap().identifier, id);

    dispatcher.remove(id).unwrap();

    assert!(dispatcher.resolve("/1.jpg").unwrap_err().is_not_matched());
    assert!(matches!(
        dispatcher.reverse("image", &kwargs(&[("filename", "1")])),
        Err(DestinationError::NotFound(_))
    ));
}

#[test]
fn test_remove_from_nested_dispatcher() {
    let mut dispatcher = api_dispatcher();
    let api = dispatcher.get_mut("api").and_then(|e| e.as_sub_mut()).unwrap();
    api.remove_named("login").unwrap();

    assert!(dispatcher.resolve("/api/login/alice").is_err());
    assert!(matches!(
        dispatcher.reverse("api.login", &kwargs(&[("user_id", "alice")])),
        Err(DestinationError::NotFound(_))
    ));
}

// ═════════════════════════════════════════════════════════════════════
// 6. Name uniqueness
// ═════════════════════════════════════════════════════════════════════

#[test]
fn test_duplicate_name_leaves_dispatcher_unchanged() {
    let mut dispatcher = Dispatcher::new();
    dispatcher
        .add(ReRule::with_identifier(r"^a$", "a").unwrap(), Some("page"))
        .unwrap();

    let err = dispatcher
        .add(ReRule::with_identifier(r"^b$", "b").unwrap(), Some("page"))
        .unwrap_err();
    assert!(matches!(err, DestinationError::DuplicateName(_)));

    assert_eq!(dispatcher.len(), 1);
    assert!(dispatcher.resolve("b").is_err());
    assert_eq!(dispatcher.reverse("page", &kwargs(&[])).unwrap(), "/a");
}

#[test]
fn test_same_name_allowed_at_different_levels() {
    let mut api = ReSubDispatcher::new("^api/").unwrap();
    api.add(ReRule::with_identifier(r"^index$", "api-index").unwrap(), Some("index"))
        .unwrap();
    let mut dispatcher = Dispatcher::new();
    dispatcher
        .add(ReRule::with_identifier(r"^index$", "index").unwrap(), Some("index"))
        .unwrap();
    dispatcher.add(api, Some("api")).unwrap();

    assert_eq!(dispatcher.reverse("index", &kwargs(&[])).unwrap(), "/index");
    assert_eq!(
        dispatcher.reverse("api.index", &kwargs(&[])).unwrap(),
        "/api/index"
    );
}

// ═════════════════════════════════════════════════════════════════════
// 7. First-match priority
// ═════════════════════════════════════════════════════════════════════

#[test]
fn test_registration_order_is_priority() {
    let mut generic_first = Dispatcher::new();
    generic_first
        .add(ReRule::with_identifier(r"^(?P<any>.*)$", "generic").unwrap(), None)
        .unwrap();
    generic_first
        .add(ReRule::with_identifier(r"^about\.htm$", "about").unwrap(), None)
        .unwrap();
    assert_eq!(generic_first.resolve("/about.htm").unwrap().identifier, "generic");

    let mut specific_first = Dispatcher::new();
    specific_first
        .add(ReRule::with_identifier(r"^about\.htm$", "about").unwrap(), None)
        .unwrap();
    specific_first
        .add(ReRule::with_identifier(r"^(?P<any>.*)$", "generic").unwrap(), None)
        .unwrap();
    assert_eq!(specific_first.resolve("/about.htm").unwrap().identifier, "about");
}

// ═════════════════════════════════════════════════════════════════════
// 8. Kwargs merging
// ═════════════════════════════════════════════════════════════════════

#[test]
fn test_deeper_capture_wins() {
    let mut sub = ReSubDispatcher::new(r"^(?P<id>[a-z]+)/").unwrap();
    sub.add(ReRule::with_identifier(r"^(?P<id>[0-9]+)$", "inner").unwrap(), None)
        .unwrap();
    let mut dispatcher = Dispatcher::new();
    dispatcher.add(sub, None).unwrap();

    let resolved = dispatcher.resolve("/outer/42").unwrap();
    assert_eq!(resolved.identifier, "inner");
    assert_eq!(resolved.kwargs.len(), 1);
    assert_eq!(resolved.kwargs["id"], "42");
}

// ═════════════════════════════════════════════════════════════════════
// 9. Rule ids and shared use
// ═════════════════════════════════════════════════════════════════════

#[test]
fn test_default_identifier_is_rule_id() {
    let rule = ReRule::new(r"^a$").unwrap();
    let id: RuleId = rule.id();
    let mut dispatcher = Dispatcher::new();
    assert_eq!(dispatcher.add(rule, None).unwrap(), id);
    assert_eq!(dispatcher.resolve("a").unwrap().identifier, id);
}

#[test]
fn test_finished_dispatcher_is_shared_across_threads() {
    let dispatcher = Arc::new(api_dispatcher());

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let dispatcher = Arc::clone(&dispatcher);
            thread::spawn(move || {
                let user = format!("user{i}");
                let path = dispatcher
                    .reverse("api.login", &kwargs(&[("user_id", user.as_str())]))
                    .unwrap();
                dispatcher.resolve(&path).unwrap().kwargs["user_id"].clone()
            })
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        assert_eq!(handle.join().unwrap(), format!("user{i}"));
    }
}
