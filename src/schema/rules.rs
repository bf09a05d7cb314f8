//! Rule tree definition and KDL parsing.
//!
//! A [`RuleTree`] is loaded once from a static KDL resource and never
//! mutated. Every failure here is fatal ([`Error::RuleResource`]): without a
//! valid rule tree there is nothing to validate against.

use std::fs;
use std::path::Path;

use kdl::{KdlDocument, KdlNode, KdlValue};

use crate::value::{Value, ValueKind};
use crate::{Error, Result};

/// Constraints for one terminal, directly-settable value.
#[derive(Debug, Clone, PartialEq)]
pub struct LeafRule {
    /// Declared value type; candidates of any other runtime type are
    /// rejected back to `default`.
    pub kind: ValueKind,
    /// The value every violation resets to. Guaranteed at load time to
    /// satisfy this rule's own constraints.
    pub default: Value,
    /// Inclusive lower bound, numeric kinds only.
    pub min: Option<Value>,
    /// Inclusive upper bound, numeric kinds only.
    pub max: Option<Value>,
    /// Closed set of allowed values (the rule resource's `enum` block).
    pub choices: Option<Vec<Value>>,
}

/// One node of the rule tree: either a leaf rule or a named group of
/// children in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub enum RuleNode {
    Leaf(LeafRule),
    Group(Vec<(String, RuleNode)>),
}

impl RuleNode {
    fn child(&self, name: &str) -> Option<&RuleNode> {
        match self {
            RuleNode::Group(children) => children
                .iter()
                .find(|(child_name, _)| child_name == name)
                .map(|(_, child)| child),
            RuleNode::Leaf(_) => None,
        }
    }
}

/// The immutable, hierarchical description of every valid settings path.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleTree {
    root: RuleNode,
}

impl RuleTree {
    /// Parse a rule tree from KDL text, typically embedded in the host
    /// binary with `include_str!`.
    pub fn from_kdl(text: &str) -> Result<Self> {
        let doc: KdlDocument = text
            .parse()
            .map_err(|e| Error::RuleResource(format!("failed to parse rule resource: {}", e)))?;
        Ok(Self {
            root: RuleNode::Group(parse_group(&doc, "")?),
        })
    }

    /// Load and parse a rule tree from a file on disk.
    pub fn from_kdl_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .map_err(|e| Error::RuleResource(format!("{}: {}", path.display(), e)))?;
        Self::from_kdl(&text)
    }

    /// The root group.
    pub fn root(&self) -> &RuleNode {
        &self.root
    }

    /// Resolve a dotted path to its leaf rule.
    ///
    /// Fails with [`Error::PathNotFound`] when any segment is missing, when a
    /// non-terminal segment is a leaf, or when the terminal segment is a
    /// group. Segments are split on `.` with no escaping.
    pub fn leaf_at(&self, path: &str) -> Result<&LeafRule> {
        let mut node = &self.root;
        for segment in path.split('.') {
            node = node
                .child(segment)
                .ok_or_else(|| Error::PathNotFound(path.to_string()))?;
        }
        match node {
            RuleNode::Leaf(rule) => Ok(rule),
            RuleNode::Group(_) => Err(Error::PathNotFound(path.to_string())),
        }
    }
}

fn parse_group(doc: &KdlDocument, prefix: &str) -> Result<Vec<(String, RuleNode)>> {
    let mut children: Vec<(String, RuleNode)> = Vec::new();
    for node in doc.nodes() {
        let name = node.name().value().to_string();
        let label = if prefix.is_empty() {
            name.clone()
        } else {
            format!("{prefix}.{name}")
        };
        if children.iter().any(|(existing, _)| *existing == name) {
            return Err(Error::RuleResource(format!("duplicate rule '{label}'")));
        }
        let rule = if node.get("type").is_some() {
            RuleNode::Leaf(parse_leaf(node, &label)?)
        } else {
            let members = match node.children() {
                Some(inner) => parse_group(inner, &label)?,
                None => Vec::new(),
            };
            RuleNode::Group(members)
        };
        children.push((name, rule));
    }
    Ok(children)
}

fn parse_leaf(node: &KdlNode, label: &str) -> Result<LeafRule> {
    let kind_name = node
        .get("type")
        .and_then(|v| v.as_string())
        .ok_or_else(|| Error::RuleResource(format!("{label}: 'type' must be a string")))?;
    let kind = ValueKind::parse(kind_name)
        .ok_or_else(|| Error::RuleResource(format!("{label}: unknown type '{kind_name}'")))?;

    let default = match node.get("default") {
        Some(raw) => coerce_kdl(raw, kind, label, "default")?,
        None => kind.zero(),
    };

    let min = node
        .get("min")
        .map(|raw| coerce_kdl(raw, kind, label, "min"))
        .transpose()?;
    let max = node
        .get("max")
        .map(|raw| coerce_kdl(raw, kind, label, "max"))
        .transpose()?;
    if (min.is_some() || max.is_some()) && !matches!(kind, ValueKind::Int | ValueKind::Float) {
        return Err(Error::RuleResource(format!(
            "{label}: min/max bounds require a numeric type, got '{kind}'"
        )));
    }

    let choices = match node.children().and_then(|c| c.get("enum")) {
        Some(enum_node) => {
            let values = enum_node
                .entries()
                .iter()
                .filter(|entry| entry.name().is_none())
                .map(|entry| coerce_kdl(entry.value(), kind, label, "enum"))
                .collect::<Result<Vec<Value>>>()?;
            if values.is_empty() {
                return Err(Error::RuleResource(format!("{label}: empty enum")));
            }
            Some(values)
        }
        None => None,
    };

    let rule = LeafRule {
        kind,
        default,
        min,
        max,
        choices,
    };

    // The default is the value every violation falls back to, so it must
    // itself pass validation.
    let (_, corrected) = crate::schema::validate::validate_leaf(&rule, &rule.default);
    if corrected {
        return Err(Error::RuleResource(format!(
            "{label}: default {} violates the rule's own constraints",
            rule.default
        )));
    }

    Ok(rule)
}

/// Convert a KDL scalar into a [`Value`] of the declared kind.
///
/// Integer literals are accepted for float leaves; everything else must
/// match the kind exactly.
fn coerce_kdl(raw: &KdlValue, kind: ValueKind, label: &str, field: &str) -> Result<Value> {
    let value = match kind {
        ValueKind::Int => raw
            .as_integer()
            .and_then(|i| i64::try_from(i).ok())
            .map(Value::Int),
        ValueKind::Float => raw
            .as_float()
            .map(Value::Float)
            .or_else(|| raw.as_integer().map(|i| Value::Float(i as f64))),
        ValueKind::Bool => raw.as_bool().map(Value::Bool),
        ValueKind::Str => raw.as_string().map(Value::from),
    };
    value.ok_or_else(|| {
        Error::RuleResource(format!("{label}: '{field}' does not match type '{kind}'"))
    })
}
