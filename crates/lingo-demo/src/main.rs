#![forbid(unsafe_code)]

//! Console host for the lingo locale registry.
//!
//! Registers a couple of locales, mounts a console "label" that follows
//! the display-element contract (read once on mount, re-read on every
//! locale change), and switches locales. Run it twice to see the second
//! session restore the previous locale from the preference file.

use std::cell::RefCell;
use std::rc::Rc;

use lingo_registry::{
    FileStore, LocaleRegistry, MemoryStore, PreferenceStore, Subscription, TranslationMap,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Console stand-in for a display element bound to one translation key.
struct ConsoleLabel {
    _refresh: Subscription,
}

impl ConsoleLabel {
    fn mount(registry: &LocaleRegistry, key: &str) -> Self {
        println!("[{key}] {}", registry.value_for(key));
        let handle = registry.clone();
        let key = key.to_string();
        let refresh = registry.on_locale_changed(move || {
            println!("[{key}] {}", handle.value_for(&key));
        });
        Self { _refresh: refresh }
    }
}

fn open_store() -> Box<dyn PreferenceStore> {
    let path = std::env::temp_dir().join("lingo-demo-prefs.json");
    match FileStore::open(&path) {
        Ok(store) => {
            info!(path = %path.display(), "using preference file");
            Box::new(store)
        }
        Err(e) => {
            warn!(error = %e, "falling back to in-memory preferences");
            Box::new(MemoryStore::new())
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let registry = LocaleRegistry::new(open_store());

    let en: TranslationMap = [
        ("greeting", "Hello"),
        ("farewell", "Goodbye"),
        ("prompt", "Pick a language"),
    ]
    .into_iter()
    .collect();
    let fr: TranslationMap = [
        ("greeting", "Bonjour"),
        ("farewell", "Au revoir"),
        ("prompt", "Choisissez une langue"),
    ]
    .into_iter()
    .collect();
    let de: TranslationMap = [
        ("greeting", "Hallo"),
        ("farewell", "Tschüss"),
        ("prompt", "Sprache wählen"),
    ]
    .into_iter()
    .collect();

    registry.add_locales([
        ("en".to_string(), en),
        ("fr".to_string(), fr),
        ("de".to_string(), de),
    ]);

    info!(
        current = ?registry.current_locale_id(),
        restored = registry.restored_from_previous_session(),
        "registry ready"
    );

    let _greeting = ConsoleLabel::mount(&registry, "greeting");
    let _prompt = ConsoleLabel::mount(&registry, "prompt");

    for locale in ["fr", "de", "en"] {
        println!("--- switching to {locale} ---");
        registry.set_locale(locale);
    }

    // Leave something persisted for the next run.
    registry.set_locale("fr");
    println!(
        "next run will restore: {}",
        registry.current_locale_id().unwrap_or_default()
    );
}
