#![forbid(unsafe_code)]

//! End-to-end host flows.
//!
//! These tests exercise the registry the way a host application uses it:
//! - a display element that renders a translated key and refreshes on
//!   locale changes;
//! - restoring the previous session's locale from an on-disk preference
//!   file across two registry instances.

use std::cell::RefCell;
use std::rc::Rc;

use lingo_registry::{FileStore, LocaleRegistry, MemoryStore, Subscription, TranslationMap};

/// Minimal stand-in for a UI display element: reads its key once on mount
/// and re-reads it on every locale-change announcement.
struct Label {
    text: Rc<RefCell<String>>,
    _refresh: Subscription,
}

impl Label {
    fn mount(registry: &LocaleRegistry, key: &str) -> Self {
        let text = Rc::new(RefCell::new(registry.value_for(key)));
        let text_clone = Rc::clone(&text);
        let handle = registry.clone();
        let key = key.to_string();
        let refresh = registry.on_locale_changed(move || {
            *text_clone.borrow_mut() = handle.value_for(&key);
        });
        Self {
            text,
            _refresh: refresh,
        }
    }

    fn text(&self) -> String {
        self.text.borrow().clone()
    }
}

fn sample_locales() -> Vec<(String, TranslationMap)> {
    vec![
        (
            "en".to_string(),
            [("greeting", "Hello"), ("farewell", "Goodbye")]
                .into_iter()
                .collect(),
        ),
        (
            "fr".to_string(),
            [("greeting", "Bonjour"), ("farewell", "Au revoir")]
                .into_iter()
                .collect(),
        ),
    ]
}

#[test]
fn label_renders_and_refreshes() {
    let registry = LocaleRegistry::new(Box::new(MemoryStore::new()));
    registry.add_locales(sample_locales());

    let label = Label::mount(&registry, "greeting");
    assert_eq!(label.text(), "Hello");

    assert!(registry.set_locale("fr"));
    assert_eq!(label.text(), "Bonjour");

    // Failed selection leaves the label untouched.
    assert!(!registry.set_locale("de"));
    assert_eq!(label.text(), "Bonjour");
}

#[test]
fn label_with_missing_key_shows_blank() {
    let registry = LocaleRegistry::new(Box::new(MemoryStore::new()));
    registry.add_locales(sample_locales());

    let label = Label::mount(&registry, "nonexistent");
    assert_eq!(label.text(), "");

    assert!(registry.set_locale("fr"));
    assert_eq!(label.text(), "");
}

#[test]
fn locale_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("prefs.json");

    // First session: pick French.
    {
        let store = FileStore::open(&path).unwrap();
        let registry = LocaleRegistry::new(Box::new(store));
        registry.add_locales(sample_locales());
        assert_eq!(registry.current_locale_id().as_deref(), Some("en"));
        assert!(registry.set_locale("fr"));
    }

    // Second session: French is restored and wins over the host default.
    let store = FileStore::open(&path).unwrap();
    let registry = LocaleRegistry::new(Box::new(store));
    registry.add_locales(sample_locales());

    assert!(registry.restored_from_previous_session());
    assert_eq!(registry.current_locale_id().as_deref(), Some("fr"));
    assert_eq!(registry.value_for("greeting"), "Bonjour");

    registry.set_default_locale("en");
    assert_eq!(registry.current_locale_id().as_deref(), Some("fr"));
}

#[test]
fn restart_with_restore_disabled_starts_fresh() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("prefs.json");

    {
        let store = FileStore::open(&path).unwrap();
        let registry = LocaleRegistry::new(Box::new(store));
        registry.add_locales(sample_locales());
        assert!(registry.set_locale("fr"));
    }

    let store = FileStore::open(&path).unwrap();
    let registry = LocaleRegistry::new(Box::new(store));
    registry.set_restore_enabled(false);
    registry.add_locales(sample_locales());

    assert!(!registry.restored_from_previous_session());
    // The preference was discarded on disk too.
    let reopened = FileStore::open(&path).unwrap();
    let fresh = LocaleRegistry::new(Box::new(reopened));
    fresh.add_locales(sample_locales());
    assert!(!fresh.restored_from_previous_session());
    assert_eq!(fresh.current_locale_id().as_deref(), Some("en"));
}

#[test]
fn observer_ordering_store_before_announce() {
    let registry = LocaleRegistry::new(Box::new(MemoryStore::new()));
    registry.add_locales(sample_locales());

    // A synchronous observer must already see the updated preference and
    // the updated lookup results.
    let seen = Rc::new(RefCell::new(Vec::new()));
    let seen_clone = Rc::clone(&seen);
    let handle = registry.clone();
    let _sub = registry.on_locale_changed(move || {
        seen_clone.borrow_mut().push((
            handle.current_locale_id(),
            handle.value_for("farewell"),
        ));
    });

    assert!(registry.set_locale("fr"));
    assert_eq!(
        *seen.borrow(),
        vec![(Some("fr".to_string()), "Au revoir".to_string())]
    );
}
