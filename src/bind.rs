//! Bidirectional synchronization between a settings path and a live
//! property on an external object.
//!
//! The engine stays toolkit-agnostic: a UI adapter implements [`Bindable`]
//! for its widget type and [`bind`] wires the two directions through
//! ordinary subscriptions. Feedback loops cannot run away because
//! [`SchemaStore::set`] is equality-gated; the echo write is a no-op.

use std::rc::Rc;

use tracing::warn;

use crate::notify::Subscription;
use crate::schema::store::SchemaStore;
use crate::value::Value;
use crate::{Error, Result};

/// Capability an object must expose to take part in a binding.
///
/// Implementations must deliver property-change notifications synchronously
/// on the engine's thread, and the [`Subscription`] returned from
/// [`connect_property_changed`](Bindable::connect_property_changed) must
/// stop all delivery once cancelled.
pub trait Bindable {
    /// Whether the object exposes a property under this name.
    fn has_property(&self, name: &str) -> bool;

    /// Current value of the property, `None` when unknown.
    fn property(&self, name: &str) -> Option<Value>;

    /// Overwrite the property.
    fn set_property(&self, name: &str, value: Value);

    /// Subscribe to external changes of the named property.
    fn connect_property_changed(
        &self,
        name: &str,
        callback: Box<dyn Fn(&Value)>,
    ) -> Subscription;
}

/// Value mapper applied in one direction of a binding.
pub type Transform = Rc<dyn Fn(&Value) -> Value>;

/// Knobs for [`bind`]. `Default` gives a bidirectional, immediately-synced
/// binding with identity transforms.
#[derive(Clone)]
pub struct BindOptions {
    /// Propagate target edits back into the store.
    pub bidirectional: bool,
    /// Push the store's current value into the target before `bind` returns.
    pub sync_on_bind: bool,
    /// Store-to-target value mapper.
    pub transform_to: Option<Transform>,
    /// Target-to-store value mapper.
    pub transform_from: Option<Transform>,
    /// Disable the store-to-target direction entirely. For controls where an
    /// outside write would reset live user input, e.g. a text entry's
    /// cursor.
    pub suppress_echo: bool,
}

impl Default for BindOptions {
    fn default() -> Self {
        Self {
            bidirectional: true,
            sync_on_bind: true,
            transform_to: None,
            transform_from: None,
            suppress_echo: false,
        }
    }
}

/// A live binding; at most one subscription per direction.
///
/// Owned by whoever called [`bind`] until [`unbind`](Binding::unbind) is
/// called or an owning [`Linker`](crate::linker::Linker) tears it down,
/// whichever happens first. The other becomes a no-op.
#[derive(Debug)]
pub struct Binding {
    subscriptions: Vec<Subscription>,
}

impl Binding {
    /// Cancel both directions. Calling twice is a no-op.
    pub fn unbind(&mut self) {
        for subscription in &mut self.subscriptions {
            subscription.cancel();
        }
    }

    /// Whether any direction is still connected.
    pub fn is_bound(&self) -> bool {
        self.subscriptions.iter().any(Subscription::is_active)
    }

    pub(crate) fn into_subscriptions(self) -> Vec<Subscription> {
        self.subscriptions
    }
}

/// Wire a settings path to a property on `target`.
///
/// Fails with [`Error::PathNotFound`] for a path absent from the rule tree
/// and [`Error::UnknownProperty`] when the target lacks the property, before
/// any side effect. With `sync_on_bind` the target property is set to the
/// transformed current value before this returns.
///
/// Store-side persistence failures inside the target-to-store direction are
/// logged rather than propagated; there is no caller on that path.
pub fn bind(
    store: &Rc<SchemaStore>,
    path: &str,
    target: &Rc<dyn Bindable>,
    property: &str,
    options: BindOptions,
) -> Result<Binding> {
    store.rules().leaf_at(path)?;
    if !target.has_property(property) {
        return Err(Error::UnknownProperty(property.to_string()));
    }

    if options.sync_on_bind {
        let mut value = store.get(path)?;
        if let Some(transform) = &options.transform_to {
            value = transform(&value);
        }
        target.set_property(property, value);
    }

    let mut subscriptions = Vec::new();

    if !options.suppress_echo {
        let target = Rc::clone(target);
        let property_name = property.to_string();
        let bound_path = path.to_string();
        let transform_to = options.transform_to.clone();
        subscriptions.push(store.subscribe(move |changed_path, value| {
            if changed_path != bound_path {
                return;
            }
            let pushed = match &transform_to {
                Some(transform) => transform(value),
                None => value.clone(),
            };
            target.set_property(&property_name, pushed);
        }));
    }

    if options.bidirectional {
        let store = Rc::clone(store);
        let bound_path = path.to_string();
        let transform_from = options.transform_from.clone();
        subscriptions.push(target.connect_property_changed(
            property,
            Box::new(move |value| {
                let stored = match &transform_from {
                    Some(transform) => transform(value),
                    None => value.clone(),
                };
                if let Err(error) = store.set(&bound_path, stored) {
                    warn!(path = %bound_path, %error, "failed to write property edit back to settings");
                }
            }),
        ));
    }

    Ok(Binding { subscriptions })
}
