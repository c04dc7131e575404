//! Node filters evaluated by linear scan.

use crate::model::{Node, NodeType, PropertyMap};
use serde_json::Value;

/// Filter for `get_nodes`.
///
/// A node matches when every set criterion matches:
/// - `kind` equals the node type.
/// - For each `(key, value)` in `properties`, the node's property equals `value`,
///   or the property is a list containing `value`.
/// - When `tags_any` is non-empty, the node carries at least one of those tags.
///
/// Comparisons are exact and case-sensitive.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeQuery {
    pub kind: Option<NodeType>,
    pub properties: Vec<(String, Value)>,
    pub tags_any: Vec<String>,
}

impl NodeQuery {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn of_kind(kind: NodeType) -> Self {
        Self {
            kind: Some(kind),
            ..Self::default()
        }
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.push((key.into(), value.into()));
        self
    }

    pub fn with_any_tag<I, T>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.tags_any.extend(tags.into_iter().map(Into::into));
        self
    }

    pub fn matches(&self, node: &Node) -> bool {
        if self.kind.is_some_and(|kind| kind != node.kind()) {
            return false;
        }
        if !self.tags_any.is_empty() && !self.tags_any.iter().any(|tag| node.has_tag(tag)) {
            return false;
        }
        if self.properties.is_empty() {
            return true;
        }

        let properties = node.properties.to_map();
        self.properties
            .iter()
            .all(|(key, expected)| property_matches(&properties, key, expected))
    }
}

fn property_matches(properties: &PropertyMap, key: &str, expected: &Value) -> bool {
    match properties.get(key) {
        Some(actual) if actual == expected => true,
        Some(Value::Array(items)) => items.contains(expected),
        _ => false,
    }
}

/// Keyword search over node text fields.
///
/// `text` matches case-insensitively as a substring of any text field of the
/// node type (Task: description; Note: title, content; Person: name;
/// Project: name, description). `tags` is an any-of filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextSearch {
    pub text: Option<String>,
    pub kind: Option<NodeType>,
    pub tags: Vec<String>,
}

impl TextSearch {
    pub fn matches(&self, node: &Node) -> bool {
        if self.kind.is_some_and(|kind| kind != node.kind()) {
            return false;
        }
        if !self.tags.is_empty() && !self.tags.iter().any(|tag| node.has_tag(tag)) {
            return false;
        }

        let needle = match self.text.as_deref().map(str::trim) {
            Some(text) if !text.is_empty() => text.to_lowercase(),
            _ => return true,
        };
        node.properties
            .text_fields()
            .iter()
            .any(|(_, value)| value.to_lowercase().contains(&needle))
    }
}
