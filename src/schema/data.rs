//! The validated settings tree held in memory and mirrored to disk.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::value::Value;
use crate::{Error, Result};

/// One node of the settings tree.
///
/// The tree always matches the rule tree's shape: every leaf rule has a
/// value here and no unknown keys survive validation. `BTreeMap` keeps the
/// persisted JSON in sorted, stable key order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DataNode {
    Group(BTreeMap<String, DataNode>),
    Leaf(Value),
}

impl DataNode {
    fn child(&self, name: &str) -> Option<&DataNode> {
        match self {
            DataNode::Group(children) => children.get(name),
            DataNode::Leaf(_) => None,
        }
    }

    /// Resolve a dotted path to the leaf value stored there.
    pub fn get_at(&self, path: &str) -> Result<&Value> {
        let mut node = self;
        for segment in path.split('.') {
            node = node
                .child(segment)
                .ok_or_else(|| Error::PathNotFound(path.to_string()))?;
        }
        match node {
            DataNode::Leaf(value) => Ok(value),
            DataNode::Group(_) => Err(Error::PathNotFound(path.to_string())),
        }
    }

    /// Replace the leaf value at a dotted path.
    ///
    /// Only overwrites existing leaves; validation has already guaranteed
    /// the slot exists, so a miss is a caller error surfaced as
    /// [`Error::PathNotFound`].
    pub(crate) fn set_at(&mut self, path: &str, value: Value) -> Result<()> {
        let mut node = self;
        for segment in path.split('.') {
            node = match node {
                DataNode::Group(children) => children.get_mut(segment),
                DataNode::Leaf(_) => None,
            }
            .ok_or_else(|| Error::PathNotFound(path.to_string()))?;
        }
        match node {
            DataNode::Leaf(slot) => {
                *slot = value;
                Ok(())
            }
            DataNode::Group(_) => Err(Error::PathNotFound(path.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DataNode {
        serde_json::from_str(
            r#"{
                "volume": 50,
                "window": {
                    "theme": { "variant": "dark" },
                    "width": 1280
                }
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_get_at() {
        let tree = sample();
        assert_eq!(tree.get_at("volume").unwrap(), &Value::Int(50));
        assert_eq!(
            tree.get_at("window.theme.variant").unwrap(),
            &Value::from("dark")
        );
    }

    #[test]
    fn test_get_at_misses() {
        let tree = sample();
        assert!(matches!(tree.get_at("ghost"), Err(Error::PathNotFound(_))));
        assert!(matches!(
            tree.get_at("volume.deeper"),
            Err(Error::PathNotFound(_))
        ));
        // A group is not a gettable value.
        assert!(matches!(
            tree.get_at("window.theme"),
            Err(Error::PathNotFound(_))
        ));
    }

    #[test]
    fn test_set_at_overwrites_leaf() {
        let mut tree = sample();
        tree.set_at("window.width", Value::Int(1920)).unwrap();
        assert_eq!(tree.get_at("window.width").unwrap(), &Value::Int(1920));
    }

    #[test]
    fn test_set_at_never_creates_slots() {
        let mut tree = sample();
        assert!(matches!(
            tree.set_at("window.height", Value::Int(1080)),
            Err(Error::PathNotFound(_))
        ));
        assert!(matches!(
            tree.set_at("window.theme", Value::Int(1)),
            Err(Error::PathNotFound(_))
        ));
    }

    #[test]
    fn test_json_output_is_sorted() {
        let tree = sample();
        let json = serde_json::to_string(&tree).unwrap();
        // BTreeMap ordering: "theme" before "width" inside "window".
        let theme = json.find("theme").unwrap();
        let width = json.find("width").unwrap();
        assert!(theme < width);
    }
}
