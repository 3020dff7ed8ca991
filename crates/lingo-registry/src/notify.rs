#![forbid(unsafe_code)]

//! Locale-change notification channel.
//!
//! # Design
//!
//! [`ChangeNotifier`] is a single-event, synchronous publish/subscribe
//! channel. Subscribers register a callback and receive a [`Subscription`]
//! guard; dropping the guard unsubscribes. [`ChangeNotifier::announce`]
//! invokes every live callback before returning.
//!
//! Callbacks are invoked outside any internal borrow, so a subscriber may
//! synchronously read back the registry (or subscribe another observer)
//! from inside its callback.
//!
//! # Failure Modes
//!
//! - **Subscriber leak**: callbacks whose [`Subscription`] guard is never
//!   dropped stay registered for the notifier's lifetime. Dead weak
//!   references are cleaned lazily during `announce()`.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// A subscriber callback stored as a strong `Rc` inside the guard, handed
/// to the notifier as `Weak`.
type CallbackRc = Rc<dyn Fn()>;
type CallbackWeak = Weak<dyn Fn()>;

/// Synchronous "locale changed" broadcast channel.
///
/// Cloning a `ChangeNotifier` creates a new handle to the **same**
/// subscriber list, so a registry and its host can hold independent handles.
///
/// Delivery happens in registration order; observers must not rely on that
/// order.
#[derive(Clone, Default)]
pub struct ChangeNotifier {
    subscribers: Rc<RefCell<Vec<CallbackWeak>>>,
}

impl std::fmt::Debug for ChangeNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeNotifier")
            .field("subscriber_count", &self.subscribers.borrow().len())
            .finish()
    }
}

impl ChangeNotifier {
    /// Create a notifier with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to locale-change announcements.
    ///
    /// Returns a [`Subscription`] guard. Dropping the guard unsubscribes
    /// the callback (it will not be called after drop, though it may remain
    /// in the subscriber list until the next `announce()` prunes it).
    pub fn subscribe(&self, callback: impl Fn() + 'static) -> Subscription {
        let strong: CallbackRc = Rc::new(callback);
        let weak = Rc::downgrade(&strong);
        self.subscribers.borrow_mut().push(weak);
        Subscription { _guard: strong }
    }

    /// Announce a locale change to every live subscriber.
    ///
    /// Dead subscribers are pruned first; callbacks run after the internal
    /// borrow is released.
    pub fn announce(&self) {
        let callbacks: Vec<CallbackRc> = {
            let mut subscribers = self.subscribers.borrow_mut();
            subscribers.retain(|weak| weak.strong_count() > 0);
            subscribers.iter().filter_map(Weak::upgrade).collect()
        };
        for callback in &callbacks {
            callback();
        }
    }

    /// Number of currently registered subscribers (including dead ones not
    /// yet pruned).
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.borrow().len()
    }
}

/// RAII guard for a subscriber callback.
///
/// Dropping the `Subscription` drops the strong reference to the callback,
/// so the `Weak` held by the notifier fails to upgrade on the next
/// announcement.
pub struct Subscription {
    _guard: CallbackRc,
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").finish_non_exhaustive()
    }
}
