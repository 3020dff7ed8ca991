//! Locale registration, selection, and lookup.
//!
//! # Invariants
//!
//! 1. **First registration wins**: re-registering an id never replaces or
//!    merges the original map.
//!
//! 2. **Registration order is selection order**: the first-locale fallback
//!    always picks the earliest-registered locale.
//!
//! 3. **Write-through selection**: the persisted preference is the single
//!    source of truth for the active locale; every successful selection
//!    writes the store before the change is announced, and the announcement
//!    happens before the call returns.
//!
//! 4. **Initialization runs once**: every entry point funnels through
//!    [`LocaleRegistry::ensure_initialized`]; after the first run, later
//!    selections mutate only the persisted preference.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | Invalid id | Empty identifier | Warn, operation is a no-op |
//! | Duplicate registration | Id already registered | Warn, original map kept |
//! | Unregistered selection | `set_locale` on unknown id | Error, returns `false` |
//! | Stale preference | Persisted id not registered | Error at lookup, `""` |
//! | Missing translation | Key absent or value empty | Error at lookup, `""` |
//!
//! No failure is fatal; the UI is expected to tolerate blank translations.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use tracing::{debug, error, trace, warn};

use crate::map::{LocaleId, TranslationMap};
use crate::notify::{ChangeNotifier, Subscription};
use crate::store::PreferenceStore;

/// Storage key under which the active locale identifier is persisted.
pub const PREFERENCE_KEY: &str = "lingo.locale";

/// Shared interior for [`LocaleRegistry`].
struct RegistryState {
    locales: HashMap<LocaleId, TranslationMap>,
    /// Registration order; `order[0]` is the first-locale fallback.
    order: Vec<LocaleId>,
    store: Box<dyn PreferenceStore>,
    restore_enabled: bool,
    initialized: bool,
    restored_from_previous_session: bool,
    no_locale_chosen_yet: bool,
}

/// Client-side locale registry.
///
/// Owns the registered translation maps, the persisted locale preference,
/// and the initialization state machine. Cloning a `LocaleRegistry` creates
/// a new handle to the **same** state, so a host can hand handles to
/// independent components without cross-contaminating separate registries.
///
/// The active locale is not held in memory: selection writes through to the
/// preference store, and [`current_locale_id`](Self::current_locale_id)
/// reads it back, so the choice survives process restarts whenever the
/// store is durable.
///
/// # Example
///
/// ```
/// use lingo_registry::{LocaleRegistry, MemoryStore, TranslationMap};
///
/// let registry = LocaleRegistry::new(Box::new(MemoryStore::new()));
/// let en: TranslationMap = [("greeting", "Hello")].into_iter().collect();
/// let fr: TranslationMap = [("greeting", "Bonjour")].into_iter().collect();
/// registry.add_locales([("en".to_string(), en), ("fr".to_string(), fr)]);
///
/// // No previous session: the first registered locale is selected.
/// assert_eq!(registry.current_locale_id().as_deref(), Some("en"));
/// assert_eq!(registry.value_for("greeting"), "Hello");
///
/// assert!(registry.set_locale("fr"));
/// assert_eq!(registry.value_for("greeting"), "Bonjour");
/// ```
#[derive(Clone)]
pub struct LocaleRegistry {
    state: Rc<RefCell<RegistryState>>,
    notifier: ChangeNotifier,
}

impl std::fmt::Debug for LocaleRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("LocaleRegistry")
            .field("locales", &state.order)
            .field("initialized", &state.initialized)
            .field("restore_enabled", &state.restore_enabled)
            .field(
                "restored_from_previous_session",
                &state.restored_from_previous_session,
            )
            .field("no_locale_chosen_yet", &state.no_locale_chosen_yet)
            .finish_non_exhaustive()
    }
}

impl LocaleRegistry {
    /// Create a registry over the given preference store, with its own
    /// change notifier and restore-on-startup enabled.
    #[must_use]
    pub fn new(store: Box<dyn PreferenceStore>) -> Self {
        Self::with_notifier(store, ChangeNotifier::new())
    }

    /// Create a registry that announces changes through an externally
    /// owned notifier.
    #[must_use]
    pub fn with_notifier(store: Box<dyn PreferenceStore>, notifier: ChangeNotifier) -> Self {
        Self {
            state: Rc::new(RefCell::new(RegistryState {
                locales: HashMap::new(),
                order: Vec::new(),
                store,
                restore_enabled: true,
                initialized: false,
                restored_from_previous_session: false,
                no_locale_chosen_yet: true,
            })),
            notifier,
        }
    }

    /// Enable or disable restoring the previous session's locale.
    ///
    /// When disabled, initialization discards any persisted preference
    /// instead of honoring it. Set before the first registration or
    /// selection; initialization runs once, so later changes have no
    /// effect.
    pub fn set_restore_enabled(&self, enabled: bool) {
        self.state.borrow_mut().restore_enabled = enabled;
    }

    /// Register a translation map under `id`.
    ///
    /// Fails (logged, non-fatal) and leaves the registry unchanged when the
    /// id is empty or already registered; the first registration for an id
    /// wins. On the first registration after initialization has run with no
    /// locale durably chosen, the first-locale fallback is applied
    /// immediately.
    pub fn add_locale(&self, id: &str, map: TranslationMap) {
        self.add_locale_impl(id, map, false);
    }

    /// Register several locales at once, in iterator order.
    ///
    /// Initialization is deferred while the entries are registered and runs
    /// exactly once at the end.
    pub fn add_locales<I>(&self, locales: I)
    where
        I: IntoIterator<Item = (LocaleId, TranslationMap)>,
    {
        trace!("add_locales");
        for (id, map) in locales {
            self.add_locale_impl(&id, map, true);
        }
        self.ensure_initialized();
    }

    fn add_locale_impl(&self, id: &str, map: TranslationMap, defer_init: bool) {
        trace!(locale = %id, "add_locale");
        if !Self::validate_id(id) {
            return;
        }

        let promote = {
            let mut state = self.state.borrow_mut();
            if state.locales.contains_key(id) {
                warn!(locale = %id, "locale is already registered; keeping the original map");
                return;
            }
            state.order.push(id.to_string());
            state.locales.insert(id.to_string(), map);
            state.no_locale_chosen_yet && state.initialized
        };

        if promote {
            self.set_first_locale();
            debug!(locale = %id, "locale selected after registration");
        }

        if !defer_init {
            self.ensure_initialized();
        }
    }

    /// Run the initialization sequence.
    ///
    /// Runs automatically the first time it is needed (first registration
    /// or selection); hosts normally never call it directly. Marks the
    /// registry initialized, then either discards the persisted preference
    /// (restore disabled), adopts it (restore), or falls back to the first
    /// registered locale.
    pub fn initialize(&self) {
        trace!("initialize");
        let (restore_enabled, already_chosen) = {
            let mut state = self.state.borrow_mut();
            state.initialized = true;
            if !state.restore_enabled {
                state.store.delete(PREFERENCE_KEY);
            }
            (state.restore_enabled, !state.no_locale_chosen_yet)
        };

        if !restore_enabled {
            debug!("restore disabled; persisted locale preference discarded");
            return;
        }

        if already_chosen {
            return;
        }

        let previous = self.state.borrow().store.get(PREFERENCE_KEY);
        match previous {
            Some(id) if !id.is_empty() => {
                // Selection may fail if the persisted id predates the current
                // registration set; the preference is still considered
                // restored and no fallback is applied.
                self.set_locale(&id);
                let mut state = self.state.borrow_mut();
                state.no_locale_chosen_yet = false;
                state.restored_from_previous_session = true;
                debug!(locale = %id, "locale restored from previous session");
            }
            _ => {
                self.set_first_locale();
                debug!("locale selected during initialization");
            }
        }
    }

    /// Run [`initialize`](Self::initialize) unless it has already run.
    fn ensure_initialized(&self) {
        let initialized = self.state.borrow().initialized;
        if !initialized {
            self.initialize();
        }
    }

    /// Select the active locale.
    ///
    /// Returns `false` (logged, no state change) when the id is empty or
    /// not registered. On success the id is persisted, the change is
    /// announced to subscribers, and `true` is returned; the persisted
    /// write happens before the announcement, which happens before this
    /// call returns.
    pub fn set_locale(&self, id: &str) -> bool {
        trace!(locale = %id, "set_locale");
        if !Self::validate_id(id) {
            return false;
        }

        {
            let mut state = self.state.borrow_mut();
            if !state.locales.contains_key(id) {
                error!(locale = %id, "locale is not registered and cannot be selected");
                return false;
            }
            state.store.set(PREFERENCE_KEY, id);
        }

        self.notifier.announce();
        debug!(locale = %id, "active locale set");
        self.ensure_initialized();
        true
    }

    /// Select `id` unless a previous session's preference was restored.
    ///
    /// The host-facing "use this locale unless the user already had one"
    /// entry point. On successful selection the locale counts as durably
    /// chosen.
    pub fn set_default_locale(&self, id: &str) {
        trace!(locale = %id, "set_default_locale");
        let restored = self.state.borrow().restored_from_previous_session;
        if restored {
            self.ensure_initialized();
            return;
        }

        if self.set_locale(id) {
            self.state.borrow_mut().no_locale_chosen_yet = false;
            debug!(locale = %id, "locale set as default");
        }
        self.ensure_initialized();
    }

    /// Select the earliest-registered locale.
    ///
    /// Does nothing (logged) when no locales are registered. On successful
    /// selection the locale counts as durably chosen.
    pub fn set_first_locale(&self) {
        trace!("set_first_locale");
        let Some(first) = self.first_locale_id() else {
            warn!("no locales registered; nothing to select");
            return;
        };

        if self.set_locale(&first) {
            self.state.borrow_mut().no_locale_chosen_yet = false;
            debug!(locale = %first, "first registered locale selected");
        }
        self.ensure_initialized();
    }

    /// Id of the earliest-registered locale, if any.
    #[must_use]
    pub fn first_locale_id(&self) -> Option<LocaleId> {
        self.state.borrow().order.first().cloned()
    }

    /// Id currently persisted as the active-locale preference.
    ///
    /// The store is the single source of truth; no in-memory copy exists.
    #[must_use]
    pub fn current_locale_id(&self) -> Option<LocaleId> {
        self.state.borrow().store.get(PREFERENCE_KEY)
    }

    /// Translated value for `key` in the active locale.
    ///
    /// Returns an empty string (logged) when no locale is active, the
    /// active locale is not registered, the key is missing, or the stored
    /// value is empty.
    #[must_use]
    pub fn value_for(&self, key: &str) -> String {
        trace!(key = %key, "value_for");
        let state = self.state.borrow();

        let Some(current) = state.store.get(PREFERENCE_KEY).filter(|id| !id.is_empty()) else {
            warn!(key = %key, "no active locale; returning empty translation");
            return String::new();
        };

        let Some(map) = state.locales.get(&current) else {
            error!(locale = %current, "active locale is not registered and cannot be used");
            return String::new();
        };

        match map.get(key) {
            Some(value) if !value.is_empty() => value.to_string(),
            _ => {
                error!(locale = %current, key = %key, "no translation for key");
                String::new()
            }
        }
    }

    /// Subscribe to "active locale changed" announcements.
    ///
    /// The callback runs synchronously during each successful selection,
    /// after the new preference has been persisted. Dropping the returned
    /// guard unsubscribes.
    pub fn on_locale_changed(&self, callback: impl Fn() + 'static) -> Subscription {
        self.notifier.subscribe(callback)
    }

    /// Handle to the notifier this registry announces through.
    #[must_use]
    pub fn notifier(&self) -> ChangeNotifier {
        self.notifier.clone()
    }

    /// Registered locale ids in registration order.
    #[must_use]
    pub fn locale_ids(&self) -> Vec<LocaleId> {
        self.state.borrow().order.clone()
    }

    /// Number of registered locales.
    #[must_use]
    pub fn locale_count(&self) -> usize {
        self.state.borrow().order.len()
    }

    /// Whether `id` names a registered locale.
    #[must_use]
    pub fn is_registered(&self, id: &str) -> bool {
        self.state.borrow().locales.contains_key(id)
    }

    /// Whether the initialization sequence has run.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.state.borrow().initialized
    }

    /// Whether the active locale was adopted from a previous session's
    /// persisted preference rather than a default or fallback.
    #[must_use]
    pub fn restored_from_previous_session(&self) -> bool {
        self.state.borrow().restored_from_previous_session
    }

    fn validate_id(id: &str) -> bool {
        if id.is_empty() {
            warn!("empty string is not a valid locale identifier");
            return false;
        }
        true
    }
}
