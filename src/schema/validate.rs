//! Validation and repair of settings values against the rule tree.
//!
//! The policy is reset-to-default on any violation, never clamp-to-bound.
//! That keeps the guarantee simple: whatever survives validation satisfies
//! the declared constraints exactly.

use std::collections::BTreeMap;

use tracing::debug;

use crate::schema::data::DataNode;
use crate::schema::rules::{LeafRule, RuleNode, RuleTree};
use crate::value::Value;

/// Validate one candidate value against a leaf rule.
///
/// Returns the value to store and whether the candidate was corrected.
/// A kind mismatch, an out-of-bounds numeric, or a value outside the rule's
/// choice set all reset to the rule's default.
pub fn validate_leaf(rule: &LeafRule, candidate: &Value) -> (Value, bool) {
    if candidate.kind() != rule.kind {
        return (rule.default.clone(), true);
    }
    // JSON cannot represent non-finite floats, and NaN never compares
    // equal, which would hold the store's equality gate open forever.
    if let Value::Float(f) = candidate {
        if !f.is_finite() {
            return (rule.default.clone(), true);
        }
    }
    if out_of_bounds(rule, candidate) {
        return (rule.default.clone(), true);
    }
    if let Some(choices) = &rule.choices {
        if !choices.contains(candidate) {
            return (rule.default.clone(), true);
        }
    }
    (candidate.clone(), false)
}

fn out_of_bounds(rule: &LeafRule, value: &Value) -> bool {
    // Bounds and value share the rule's kind at this point.
    fn less(a: &Value, b: &Value) -> bool {
        match (a, b) {
            (Value::Int(a), Value::Int(b)) => a < b,
            (Value::Float(a), Value::Float(b)) => a < b,
            _ => false,
        }
    }
    rule.min.as_ref().is_some_and(|min| less(value, min))
        || rule.max.as_ref().is_some_and(|max| less(max, value))
}

/// Walk a whole raw data document against the rule tree, repairing it into
/// a tree that exactly matches the rules' shape.
///
/// Every leaf gets a value (the default when the entry is absent or
/// invalid), a non-object where a group belongs is treated as empty, and
/// keys unknown to the rules are dropped. The returned flag is true iff the
/// corrected tree differs from the input, which is exactly the "needs a
/// persistence write" signal.
pub fn validate_tree(rules: &RuleTree, raw: &serde_json::Value) -> (DataNode, bool) {
    let children = match rules.root() {
        RuleNode::Group(children) => children.as_slice(),
        RuleNode::Leaf(_) => &[],
    };
    let (corrected, changed) = walk_group(children, raw, "");
    (DataNode::Group(corrected), changed)
}

fn walk_group(
    rule_children: &[(String, RuleNode)],
    raw: &serde_json::Value,
    prefix: &str,
) -> (BTreeMap<String, DataNode>, bool) {
    let empty = serde_json::Map::new();
    let mut changed = false;
    let map = match raw.as_object() {
        Some(map) => map,
        None => {
            changed = true;
            &empty
        }
    };

    let mut corrected = BTreeMap::new();
    for (name, rule) in rule_children {
        let label = if prefix.is_empty() {
            name.clone()
        } else {
            format!("{prefix}.{name}")
        };
        match rule {
            RuleNode::Leaf(leaf) => {
                let (value, entry_changed) = match map.get(name).and_then(json_scalar) {
                    Some(candidate) => validate_leaf(leaf, &candidate),
                    None => (leaf.default.clone(), true),
                };
                if entry_changed {
                    debug!(path = %label, %value, "settings entry reset during validation");
                }
                changed |= entry_changed;
                corrected.insert(name.clone(), DataNode::Leaf(value));
            }
            RuleNode::Group(sub_rules) => {
                let sub_raw = map.get(name).unwrap_or(&serde_json::Value::Null);
                let (sub_corrected, sub_changed) = walk_group(sub_rules, sub_raw, &label);
                changed |= sub_changed;
                corrected.insert(name.clone(), DataNode::Group(sub_corrected));
            }
        }
    }

    for key in map.keys() {
        if !rule_children.iter().any(|(name, _)| name == key) {
            debug!(path = %key, "dropping settings entry unknown to the rules");
            changed = true;
        }
    }

    (corrected, changed)
}

/// View a JSON scalar as a [`Value`]. Objects and arrays yield `None`, which
/// the caller treats the same as an absent entry.
fn json_scalar(raw: &serde_json::Value) -> Option<Value> {
    match raw {
        serde_json::Value::Bool(b) => Some(Value::Bool(*b)),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(Value::Int(i))
            } else {
                n.as_f64().map(Value::Float)
            }
        }
        serde_json::Value::String(s) => Some(Value::Str(s.clone())),
        _ => None,
    }
}
