//! The live settings store: validated state, mutation, and change events.

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use tracing::debug;

use crate::Result;
use crate::notify::{ChangeNotifier, Subscription};
use crate::schema::data::DataNode;
use crate::schema::rules::RuleTree;
use crate::schema::{persist, validate};
use crate::value::Value;

/// Owns the validated settings tree and the persistence path.
///
/// Every mutation goes through [`set`](SchemaStore::set): the value is
/// validated against the leaf's rule (invalid input silently resets to the
/// rule's default), compared to the stored value, and only on a real change
/// persisted and broadcast as a `(path, value)` event.
///
/// The store hands out `Rc<Self>`; bindings and callbacks hold clones.
pub struct SchemaStore {
    rules: RuleTree,
    data: RefCell<DataNode>,
    path: PathBuf,
    notifier: ChangeNotifier,
}

impl SchemaStore {
    /// Construct a store from a loaded rule tree and a settings file path.
    ///
    /// Loads the persisted user data (missing or malformed means empty),
    /// validates and repairs it, and persists immediately when the repaired
    /// tree differs from what was on disk. A failed initial write aborts
    /// construction: a host that cannot write its settings file should find
    /// out at startup, not on the first user edit.
    pub fn open(rules: RuleTree, settings_path: impl Into<PathBuf>) -> Result<Rc<Self>> {
        let path = settings_path.into();
        let raw = persist::load_data(&path);
        let (data, changed) = validate::validate_tree(&rules, &raw);
        if changed {
            debug!(path = %path.display(), "settings repaired during load");
            persist::save_data(&path, &data)?;
        }
        Ok(Rc::new(Self {
            rules,
            data: RefCell::new(data),
            path,
            notifier: ChangeNotifier::new(),
        }))
    }

    /// The rule tree this store validates against.
    pub fn rules(&self) -> &RuleTree {
        &self.rules
    }

    /// Where the settings tree is persisted.
    pub fn settings_path(&self) -> &Path {
        &self.path
    }

    /// Current value at a dotted path.
    pub fn get(&self, path: &str) -> Result<Value> {
        let data = self.data.borrow();
        let value = data.get_at(path)?;
        Ok(value.clone())
    }

    /// Validate and store a value at a dotted path.
    ///
    /// Unknown paths fail with [`Error::PathNotFound`](crate::Error); a value
    /// violating the leaf's constraints is coerced to the rule's default
    /// rather than rejected. Setting the already-stored value is a complete
    /// no-op: no write, no event.
    ///
    /// On a real change the new value is persisted and then broadcast. A
    /// persistence failure is returned to the caller, but the in-memory
    /// value is already updated and the event already delivered; callers
    /// that need durability must check the result.
    pub fn set(&self, path: &str, value: Value) -> Result<()> {
        let rule = self.rules.leaf_at(path)?;
        let (valid, coerced) = validate::validate_leaf(rule, &value);
        if coerced {
            debug!(path, rejected = %value, stored = %valid, "value outside rule, reset to default");
        }
        {
            let mut data = self.data.borrow_mut();
            if *data.get_at(path)? == valid {
                return Ok(());
            }
            data.set_at(path, valid.clone())?;
        }
        let persisted = persist::save_data(&self.path, &self.data.borrow());
        self.notifier.emit(path, &valid);
        persisted
    }

    /// Subscribe to all change events. Events carry the dotted path and the
    /// validated new value; delivery is synchronous and in subscription
    /// order.
    pub fn subscribe(&self, callback: impl Fn(&str, &Value) + 'static) -> Subscription {
        self.notifier.subscribe(callback)
    }
}

impl std::fmt::Debug for SchemaStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaStore")
            .field("path", &self.path)
            .field("notifier", &self.notifier)
            .finish()
    }
}
