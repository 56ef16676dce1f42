use shorty_domain::{RedirectDecision, Shortcuts};
use std::collections::BTreeMap;

#[test]
fn test_lookup_is_exact() {
    let shortcuts: Shortcuts = [("go", "https://go.dev"), ("gh", "https://github.com")]
        .into_iter()
        .collect();

    assert_eq!(shortcuts.get("go"), Some("https://go.dev"));
    assert_eq!(shortcuts.get("GO"), None);
    assert_eq!(shortcuts.get("g"), None);
    assert_eq!(shortcuts.get("go "), None);
    assert_eq!(shortcuts.len(), 2);
}

#[test]
fn test_from_btree_map() {
    let map = BTreeMap::from([("so".to_string(), "https://stackoverflow.com".to_string())]);
    let shortcuts = Shortcuts::from(map);

    assert_eq!(shortcuts.get("so"), Some("https://stackoverflow.com"));
    assert!(!shortcuts.is_empty());
}

#[test]
fn test_empty_table() {
    let shortcuts = Shortcuts::new();
    assert!(shortcuts.is_empty());
    assert_eq!(shortcuts.iter().count(), 0);
}

#[test]
fn test_redirect_decision_accessors() {
    let redirect = RedirectDecision::Redirect {
        host: "go.u".to_string(),
        target: "https://go.dev".to_string(),
    };
    let not_found = RedirectDecision::NotFound {
        host: "nope.u".to_string(),
    };

    assert!(redirect.is_redirect());
    assert_eq!(redirect.target(), Some("https://go.dev"));
    assert!(!not_found.is_redirect());
    assert_eq!(not_found.target(), None);
}
