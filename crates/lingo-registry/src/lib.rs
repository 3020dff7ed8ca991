#![forbid(unsafe_code)]

//! Client-side locale registry for host applications.
//!
//! A host registers named translation maps, picks an active locale, and
//! looks up translated values by key. The chosen locale is written through
//! to a durable [`PreferenceStore`] so it survives restarts, and observers
//! are notified through a [`ChangeNotifier`] whenever the active locale
//! changes.
//!
//! The registry is single-threaded and synchronous: all operations are
//! expected on one logical thread, persistence and notification dispatch
//! are in-process calls, and within one selection the persisted write
//! happens before the change announcement, which happens before the call
//! returns.

pub mod map;
pub mod notify;
pub mod registry;
pub mod store;

pub use map::{LocaleId, TranslationMap};
pub use notify::{ChangeNotifier, Subscription};
pub use registry::{LocaleRegistry, PREFERENCE_KEY};
pub use store::{FileStore, MemoryStore, PreferenceStore, StoreError};
