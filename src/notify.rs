//! Broadcast change notification with cancellable subscriptions.
//!
//! [`ChangeNotifier`] delivers `(path, value)` events to every subscriber in
//! subscription order. Delivery is synchronous on the calling thread.
//!
//! Cancellation is safe at any point, including from inside a callback
//! triggered by the event being torn down: `emit` snapshots the subscriber
//! list, then re-checks each subscription's liveness immediately before
//! invoking it. A cancelled subscription is never called again, even when the
//! cancel happened mid-dispatch.

use std::cell::RefCell;
use std::rc::Rc;

use crate::value::Value;

type ChangeCallback = Rc<dyn Fn(&str, &Value)>;

#[derive(Default)]
struct Subscribers {
    next_id: u64,
    entries: Vec<(u64, ChangeCallback)>,
}

/// A broadcast subscriber list for settings change events.
///
/// Cloning yields another handle to the same subscriber list.
#[derive(Clone, Default)]
pub struct ChangeNotifier {
    inner: Rc<RefCell<Subscribers>>,
}

impl ChangeNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback for every future change event.
    ///
    /// The returned [`Subscription`] is the only way to remove the callback;
    /// dropping it without calling [`Subscription::cancel`] leaves the
    /// callback registered for the notifier's lifetime.
    pub fn subscribe(&self, callback: impl Fn(&str, &Value) + 'static) -> Subscription {
        let id = {
            let mut inner = self.inner.borrow_mut();
            let id = inner.next_id;
            inner.next_id += 1;
            inner.entries.push((id, Rc::new(callback)));
            id
        };
        let weak = Rc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.borrow_mut().entries.retain(|(entry_id, _)| *entry_id != id);
            }
        })
    }

    /// Deliver a change event to all live subscribers, in subscription order.
    pub fn emit(&self, path: &str, value: &Value) {
        // Snapshot so callbacks may subscribe or cancel while we dispatch.
        let snapshot: Vec<(u64, ChangeCallback)> = self.inner.borrow().entries.clone();
        for (id, callback) in snapshot {
            let live = self
                .inner
                .borrow()
                .entries
                .iter()
                .any(|(entry_id, _)| *entry_id == id);
            if live {
                callback(path, value);
            }
        }
    }

    /// Number of currently registered subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.inner.borrow().entries.len()
    }
}

impl std::fmt::Debug for ChangeNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeNotifier")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

/// An opaque handle identifying one registered callback.
///
/// Removable exactly once: [`cancel`](Subscription::cancel) is idempotent.
/// Dropping a subscription does not cancel it; ownership of the teardown
/// decision stays with whoever holds the handle (typically a
/// [`Linker`](crate::linker::Linker) entry).
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    /// Wrap a cancellation thunk. Used by every change source in the crate;
    /// external [`Bindable`](crate::bind::Bindable) implementations build
    /// their property-change handles the same way.
    pub fn new(cancel: impl FnOnce() + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// Remove the underlying registration. Calling twice is a no-op.
    pub fn cancel(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }

    /// Whether the registration is still in place.
    pub fn is_active(&self) -> bool {
        self.cancel.is_some()
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.is_active())
            .finish()
    }
}
