//! Shared fixtures for integration tests: an isolated settings directory
//! and a fake bindable widget.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::PathBuf;
use std::rc::Rc;

use tempfile::TempDir;
use tiller::notify::ChangeNotifier;
use tiller::{Bindable, RuleTree, SchemaStore, Subscription, Value};

/// Rule resource used across the integration tests.
pub const RULES: &str = r#"
volume type="int" default=50 min=0 max=100
brightness type="float" default=1.0 min=0.0 max=2.0
window {
    width type="int" default=1280 min=320 max=7680
    theme {
        variant type="string" default="dark" {
            enum "dark" "light" "system"
        }
    }
}
"#;

/// Test environment with an isolated settings file.
pub struct TestEnv {
    dir: TempDir,
}

impl TestEnv {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("failed to create temp dir"),
        }
    }

    pub fn settings_path(&self) -> PathBuf {
        self.dir.path().join("settings.json")
    }

    pub fn rules(&self) -> RuleTree {
        RuleTree::from_kdl(RULES).expect("test rules must parse")
    }

    pub fn open_store(&self) -> Rc<SchemaStore> {
        SchemaStore::open(self.rules(), self.settings_path()).expect("failed to open store")
    }

    pub fn read_settings_file(&self) -> String {
        std::fs::read_to_string(self.settings_path()).expect("settings file missing")
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

/// A fake widget: a property bag that notifies on every `set_property`,
/// the way GObject-style toolkits fire `notify::prop` on assignment.
pub struct TestWidget {
    props: RefCell<HashMap<String, Value>>,
    notifier: ChangeNotifier,
    set_count: RefCell<usize>,
}

impl TestWidget {
    pub fn new(props: &[(&str, Value)]) -> Rc<Self> {
        Rc::new(Self {
            props: RefCell::new(
                props
                    .iter()
                    .map(|(name, value)| (name.to_string(), value.clone()))
                    .collect(),
            ),
            notifier: ChangeNotifier::new(),
            set_count: RefCell::new(0),
        })
    }

    /// Current property value, panicking on unknown names (test convenience).
    pub fn get(&self, name: &str) -> Value {
        self.props
            .borrow()
            .get(name)
            .cloned()
            .unwrap_or_else(|| panic!("no property '{name}'"))
    }

    /// Simulate a user edit: identical to `set_property`, named for intent.
    pub fn edit(&self, name: &str, value: Value) {
        self.set_property(name, value);
    }

    /// How many times `set_property` ran, echoes included.
    pub fn set_count(&self) -> usize {
        *self.set_count.borrow()
    }

    /// Upcast helper for `bind`'s `&Rc<dyn Bindable>` parameter.
    pub fn as_bindable(self: &Rc<Self>) -> Rc<dyn Bindable> {
        Rc::clone(self) as Rc<dyn Bindable>
    }
}

impl Bindable for TestWidget {
    fn has_property(&self, name: &str) -> bool {
        self.props.borrow().contains_key(name)
    }

    fn property(&self, name: &str) -> Option<Value> {
        self.props.borrow().get(name).cloned()
    }

    fn set_property(&self, name: &str, value: Value) {
        *self.set_count.borrow_mut() += 1;
        self.props.borrow_mut().insert(name.to_string(), value.clone());
        self.notifier.emit(name, &value);
    }

    fn connect_property_changed(
        &self,
        name: &str,
        callback: Box<dyn Fn(&Value)>,
    ) -> Subscription {
        let name = name.to_string();
        self.notifier.subscribe(move |changed, value| {
            if changed == name {
                callback(value);
            }
        })
    }
}
