//! Reconstructed graph record

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::rows::Payload;
use crate::Result;

/// Immutable hierarchical node: keyed values plus ordered children
///
/// # Examples
///
/// ```rust
/// use graph_table::domain::{GraphRecord, Payload};
///
/// let tab = GraphRecord::new("tab", "0").with_value("title", Payload::from("shell"));
/// let root = GraphRecord::new("", "").with_child(tab);
///
/// assert_eq!(root.node_count(), 2);
/// assert_eq!(root.child("tab", "0").unwrap().value("title").unwrap().as_text(), Some("shell"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphRecord {
    pub key: String,
    pub identifier: String,
    #[serde(default)]
    pub values: BTreeMap<String, Payload>,
    #[serde(default)]
    pub children: Vec<GraphRecord>,
}

impl GraphRecord {
    pub fn new(key: impl Into<String>, identifier: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            identifier: identifier.into(),
            values: BTreeMap::new(),
            children: Vec::new(),
        }
    }

    /// Add a value (builder pattern)
    pub fn with_value(mut self, key: impl Into<String>, payload: impl Into<Payload>) -> Self {
        self.values.insert(key.into(), payload.into());
        self
    }

    /// Append a child (builder pattern)
    pub fn with_child(mut self, child: GraphRecord) -> Self {
        self.children.push(child);
        self
    }

    pub fn value(&self, key: &str) -> Option<&Payload> {
        self.values.get(key)
    }

    /// First child with the given key and identifier
    pub fn child(&self, key: &str, identifier: &str) -> Option<&GraphRecord> {
        self.children
            .iter()
            .find(|c| c.key == key && c.identifier == identifier)
    }

    /// All children sharing a key, in sequence order
    pub fn children_with_key<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a GraphRecord> {
        self.children.iter().filter(move |c| c.key == key)
    }

    /// Nodes in this subtree, including `self`
    pub fn node_count(&self) -> usize {
        self.iter().count()
    }

    /// Values in this subtree, including `self`'s
    pub fn value_count(&self) -> usize {
        self.iter().map(|r| r.values.len()).sum()
    }

    /// Pre-order traversal (parents before children, children in order)
    pub fn iter(&self) -> PreOrder<'_> {
        PreOrder { stack: vec![self] }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

// Unlinks children onto a heap stack so arbitrarily deep chains drop
// without recursing once per level.
impl Drop for GraphRecord {
    fn drop(&mut self) {
        let mut stack = std::mem::take(&mut self.children);
        while let Some(mut record) = stack.pop() {
            stack.append(&mut record.children);
        }
    }
}

/// Iterative pre-order walk over a record tree
pub struct PreOrder<'a> {
    stack: Vec<&'a GraphRecord>,
}

impl<'a> Iterator for PreOrder<'a> {
    type Item = &'a GraphRecord;

    fn next(&mut self) -> Option<Self::Item> {
        let record = self.stack.pop()?;
        self.stack.extend(record.children.iter().rev());
        Some(record)
    }
}
