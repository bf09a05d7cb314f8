//! Owner-scoped registry of subscriptions with guaranteed bulk teardown.
//!
//! A [`Linker`] groups [`Subscription`]s under an [`OwnerId`] so everything
//! a component wired up can be released as a unit. Owners are plain identity
//! tokens; the registry never extends anyone's lifetime. The host invokes
//! [`teardown`](Linker::teardown) from its "object being destroyed" hook, or
//! holds an [`OwnerScope`] and lets `Drop` do it.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::bind::Binding;
use crate::notify::Subscription;

static NEXT_OWNER: AtomicU64 = AtomicU64::new(0);

/// Opaque identity token for an owner of subscriptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OwnerId(u64);

impl OwnerId {
    /// Mint a fresh, process-unique owner token.
    pub fn new() -> Self {
        Self(NEXT_OWNER.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for OwnerId {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-owner subscription registry.
///
/// Cloning yields another handle to the same registry.
#[derive(Clone, Default)]
pub struct Linker {
    inner: Rc<RefCell<HashMap<OwnerId, Vec<Subscription>>>>,
}

impl Linker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a subscription to the owner's list.
    pub fn register(&self, owner: OwnerId, subscription: Subscription) {
        self.inner
            .borrow_mut()
            .entry(owner)
            .or_default()
            .push(subscription);
    }

    /// Register every subscription inside a [`Binding`] under one owner.
    pub fn register_binding(&self, owner: OwnerId, binding: Binding) {
        for subscription in binding.into_subscriptions() {
            self.register(owner, subscription);
        }
    }

    /// Cancel every subscription registered to `owner`, in registration
    /// order, and forget the owner. Subsequent calls are no-ops. Safe to
    /// call from within a notification callback.
    pub fn teardown(&self, owner: OwnerId) {
        // Remove first so the borrow is released before any cancel thunk
        // runs; a thunk may re-enter the registry.
        let subscriptions = self.inner.borrow_mut().remove(&owner);
        if let Some(subscriptions) = subscriptions {
            for mut subscription in subscriptions {
                subscription.cancel();
            }
        }
    }

    /// Tear down every owner. Used at full shutdown.
    pub fn teardown_all(&self) {
        let drained: Vec<(OwnerId, Vec<Subscription>)> =
            self.inner.borrow_mut().drain().collect();
        for (_, subscriptions) in drained {
            for mut subscription in subscriptions {
                subscription.cancel();
            }
        }
    }

    /// Whether the owner currently has registrations.
    pub fn is_registered(&self, owner: OwnerId) -> bool {
        self.inner.borrow().contains_key(&owner)
    }

    /// Number of subscriptions held for `owner`.
    pub fn subscription_count(&self, owner: OwnerId) -> usize {
        self.inner
            .borrow()
            .get(&owner)
            .map_or(0, |subscriptions| subscriptions.len())
    }

    /// RAII handle tying an owner's registrations to a scope: dropping the
    /// guard runs [`teardown`](Linker::teardown).
    pub fn scope(&self, owner: OwnerId) -> OwnerScope {
        OwnerScope {
            linker: self.clone(),
            owner,
        }
    }
}

impl std::fmt::Debug for Linker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Linker")
            .field("owners", &self.inner.borrow().len())
            .finish()
    }
}

/// Guard returned by [`Linker::scope`]; tears the owner down when dropped.
#[derive(Debug)]
pub struct OwnerScope {
    linker: Linker,
    owner: OwnerId,
}

impl OwnerScope {
    pub fn owner(&self) -> OwnerId {
        self.owner
    }

    /// Tear down now instead of at end of scope.
    pub fn teardown(self) {
        // Drop runs the actual teardown.
    }
}

impl Drop for OwnerScope {
    fn drop(&mut self) {
        self.linker.teardown(self.owner);
    }
}
