//! Flattened row shapes
//!
//! A graph is persisted as two tables: one row per node (identity + parent
//! link) and one row per leaf value (owning node + key + payload). These are
//! plain records; integrity between them is checked by the transformer.

use serde::{Deserialize, Serialize};

use crate::Result;

/// Node handle (the node table's rowid)
pub type NodeId = i64;

/// One graph node, flattened
///
/// # Examples
///
/// ```rust
/// use graph_table::domain::NodeRow;
///
/// let root = NodeRow::root(1, "");
/// let child = NodeRow::child(2, 1, "tabs", "0");
/// assert!(root.is_root());
/// assert_eq!(child.parent_id, Some(1));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeRow {
    /// Unique node id
    pub id: NodeId,
    /// Parent node id (`None` only for the root)
    #[serde(default)]
    pub parent_id: Option<NodeId>,
    /// Name of this node within its parent
    pub key: String,
    /// Discriminates repeated keys under one parent (e.g. array index)
    #[serde(default)]
    pub identifier: String,
}

impl NodeRow {
    pub fn new(
        id: NodeId,
        parent_id: Option<NodeId>,
        key: impl Into<String>,
        identifier: impl Into<String>,
    ) -> Self {
        Self {
            id,
            parent_id,
            key: key.into(),
            identifier: identifier.into(),
        }
    }

    /// Node with no parent
    pub fn root(id: NodeId, key: impl Into<String>) -> Self {
        Self::new(id, None, key, "")
    }

    pub fn child(
        id: NodeId,
        parent_id: NodeId,
        key: impl Into<String>,
        identifier: impl Into<String>,
    ) -> Self {
        Self::new(id, Some(parent_id), key, identifier)
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// Storage class of a payload, persisted next to the value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayloadType {
    Null,
    Integer,
    Real,
    Text,
    Blob,
}

impl PayloadType {
    /// Numeric tag stored in the value table
    pub fn code(&self) -> i64 {
        match self {
            PayloadType::Null => 0,
            PayloadType::Integer => 1,
            PayloadType::Real => 2,
            PayloadType::Text => 3,
            PayloadType::Blob => 4,
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(PayloadType::Null),
            1 => Some(PayloadType::Integer),
            2 => Some(PayloadType::Real),
            3 => Some(PayloadType::Text),
            4 => Some(PayloadType::Blob),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PayloadType::Null => "null",
            PayloadType::Integer => "integer",
            PayloadType::Real => "real",
            PayloadType::Text => "text",
            PayloadType::Blob => "blob",
        }
    }
}

/// Opaque leaf value
///
/// The transformer never looks inside a payload; it only moves it from its
/// row onto the owning record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Payload {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl Payload {
    pub fn type_tag(&self) -> PayloadType {
        match self {
            Payload::Null => PayloadType::Null,
            Payload::Integer(_) => PayloadType::Integer,
            Payload::Real(_) => PayloadType::Real,
            Payload::Text(_) => PayloadType::Text,
            Payload::Blob(_) => PayloadType::Blob,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Payload::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Payload::Integer(i) => Some(*i),
            _ => None,
        }
    }
}

impl From<&str> for Payload {
    fn from(value: &str) -> Self {
        Payload::Text(value.to_string())
    }
}

impl From<String> for Payload {
    fn from(value: String) -> Self {
        Payload::Text(value)
    }
}

impl From<i64> for Payload {
    fn from(value: i64) -> Self {
        Payload::Integer(value)
    }
}

impl From<f64> for Payload {
    fn from(value: f64) -> Self {
        Payload::Real(value)
    }
}

impl From<Vec<u8>> for Payload {
    fn from(value: Vec<u8>) -> Self {
        Payload::Blob(value)
    }
}

/// One leaf value, flattened
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueRow {
    /// Owning node
    pub node_id: NodeId,
    /// Name of the value within its node
    pub key: String,
    pub payload: Payload,
}

impl ValueRow {
    pub fn new(node_id: NodeId, key: impl Into<String>, payload: impl Into<Payload>) -> Self {
        Self {
            node_id,
            key: key.into(),
            payload: payload.into(),
        }
    }
}

/// Both tables of one snapshot, as delivered by a row source
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RowSet {
    #[serde(default)]
    pub nodes: Vec<NodeRow>,
    #[serde(default)]
    pub values: Vec<ValueRow>,
}

impl RowSet {
    pub fn new(nodes: Vec<NodeRow>, values: Vec<ValueRow>) -> Self {
        Self { nodes, values }
    }

    /// Parse a `{"nodes": [...], "values": [...]}` document
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_row_constructors() {
        let root = NodeRow::root(1, "root");
        assert_eq!(root.id, 1);
        assert!(root.is_root());
        assert_eq!(root.identifier, "");

        let child = NodeRow::child(2, 1, "child", "0");
        assert!(!child.is_root());
        assert_eq!(child.key, "child");
        assert_eq!(child.identifier, "0");
    }

    #[test]
    fn test_payload_type_codes() {
        for ty in [
            PayloadType::Null,
            PayloadType::Integer,
            PayloadType::Real,
            PayloadType::Text,
            PayloadType::Blob,
        ] {
            assert_eq!(PayloadType::from_code(ty.code()), Some(ty));
        }
        assert_eq!(PayloadType::from_code(5), None);
        assert_eq!(PayloadType::from_code(-1), None);
    }

    #[test]
    fn test_payload_conversions() {
        assert_eq!(Payload::from("x"), Payload::Text("x".to_string()));
        assert_eq!(Payload::from(3i64).type_tag(), PayloadType::Integer);
        assert_eq!(Payload::from(vec![1u8, 2]).type_tag(), PayloadType::Blob);
        assert_eq!(Payload::from("x").as_text(), Some("x"));
        assert_eq!(Payload::Integer(9).as_integer(), Some(9));
        assert_eq!(Payload::Null.as_text(), None);
    }

    #[test]
    fn test_row_set_from_json() {
        let json = r#"{
            "nodes": [
                {"id": 1, "parent_id": null, "key": "root"},
                {"id": 2, "parent_id": 1, "key": "child", "identifier": "0"}
            ],
            "values": [
                {"node_id": 2, "key": "name", "payload": {"type": "text", "value": "x"}}
            ]
        }"#;

        let rows = RowSet::from_json(json).unwrap();
        assert_eq!(rows.nodes.len(), 2);
        assert_eq!(rows.nodes[0], NodeRow::root(1, "root"));
        assert_eq!(rows.nodes[1], NodeRow::child(2, 1, "child", "0"));
        assert_eq!(rows.values[0], ValueRow::new(2, "name", "x"));
    }

    #[test]
    fn test_row_set_rejects_malformed_json() {
        let err = RowSet::from_json(r#"{"nodes": [{"parent_id": 1}]}"#).unwrap_err();
        assert_eq!(err.kind, crate::ErrorKind::Serialization);
    }
}
