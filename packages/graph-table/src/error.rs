//! Error types for graph-table

use std::fmt;
use thiserror::Error;

use crate::domain::NodeId;

/// Error kinds
///
/// The first seven are integrity faults found while rebuilding a graph from
/// rows. The rest come from the row store and configuration layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// No node row has a null parent
    MissingRoot,
    /// More than one node row has a null parent
    MultipleRoots,
    /// Two node rows share an id
    DuplicateNodeId,
    /// A value row references a node id that does not exist
    OrphanValue,
    /// Two value rows collide on `(node_id, key)`
    DuplicateValueKey,
    /// A parent reference does not resolve
    DanglingParent,
    /// The parent chain of some node never reaches the root
    CycleDetected,
    /// A stored row is missing a required field or is malformed
    InvalidRow,
    /// Database errors (SQLite)
    Database,
    /// Serialization/deserialization errors
    Serialization,
    /// Configuration errors
    Config,
    /// I/O errors
    IO,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::MissingRoot => "missing_root",
            ErrorKind::MultipleRoots => "multiple_roots",
            ErrorKind::DuplicateNodeId => "duplicate_node_id",
            ErrorKind::OrphanValue => "orphan_value",
            ErrorKind::DuplicateValueKey => "duplicate_value_key",
            ErrorKind::DanglingParent => "dangling_parent",
            ErrorKind::CycleDetected => "cycle_detected",
            ErrorKind::InvalidRow => "invalid_row",
            ErrorKind::Database => "database",
            ErrorKind::Serialization => "serialization",
            ErrorKind::Config => "config",
            ErrorKind::IO => "io",
        }
    }

    /// True for faults in the row data itself (as opposed to storage/config)
    pub fn is_integrity(&self) -> bool {
        matches!(
            self,
            ErrorKind::MissingRoot
                | ErrorKind::MultipleRoots
                | ErrorKind::DuplicateNodeId
                | ErrorKind::OrphanValue
                | ErrorKind::DuplicateValueKey
                | ErrorKind::DanglingParent
                | ErrorKind::CycleDetected
        )
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Graph-table error type
#[derive(Debug, Error)]
#[error("[{kind}] {message}")]
pub struct GraphTableError {
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
    pub kind: ErrorKind,
    pub message: String,
    /// Node the fault was found on, when there is one
    pub node_id: Option<NodeId>,
}

impl GraphTableError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            node_id: None,
            source: None,
        }
    }

    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    pub fn with_node(mut self, node_id: NodeId) -> Self {
        self.node_id = Some(node_id);
        self
    }

    // Integrity constructors

    pub fn missing_root() -> Self {
        Self::new(ErrorKind::MissingRoot, "No node row has a null parent")
    }

    pub fn multiple_roots(first: NodeId, second: NodeId) -> Self {
        Self::new(
            ErrorKind::MultipleRoots,
            format!("Nodes {} and {} both have a null parent", first, second),
        )
        .with_node(second)
    }

    pub fn duplicate_node_id(node_id: NodeId) -> Self {
        Self::new(
            ErrorKind::DuplicateNodeId,
            format!("Node id {} appears in more than one row", node_id),
        )
        .with_node(node_id)
    }

    pub fn orphan_value(node_id: NodeId, key: &str) -> Self {
        Self::new(
            ErrorKind::OrphanValue,
            format!("Value '{}' references missing node {}", key, node_id),
        )
        .with_node(node_id)
    }

    pub fn duplicate_value_key(node_id: NodeId, key: &str) -> Self {
        Self::new(
            ErrorKind::DuplicateValueKey,
            format!("Node {} has more than one value named '{}'", node_id, key),
        )
        .with_node(node_id)
    }

    pub fn dangling_parent(node_id: NodeId, parent_id: NodeId) -> Self {
        Self::new(
            ErrorKind::DanglingParent,
            format!("Node {} references missing parent {}", node_id, parent_id),
        )
        .with_node(node_id)
    }

    pub fn cycle_detected(node_id: NodeId) -> Self {
        Self::new(
            ErrorKind::CycleDetected,
            format!("Node {} is on a parent cycle unreachable from the root", node_id),
        )
        .with_node(node_id)
    }

    // Storage/config constructors

    pub fn invalid_row(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidRow, message)
    }

    pub fn database(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Database, message)
    }

    pub fn serialization(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Serialization, message)
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Config, message)
    }
}

// SQLite error conversions
#[cfg(feature = "sqlite")]
impl From<rusqlite::Error> for GraphTableError {
    fn from(err: rusqlite::Error) -> Self {
        GraphTableError::database(format!("SQLite error: {}", err)).with_source(err)
    }
}

impl From<serde_json::Error> for GraphTableError {
    fn from(err: serde_json::Error) -> Self {
        GraphTableError::serialization(format!("JSON error: {}", err)).with_source(err)
    }
}

impl From<serde_yaml::Error> for GraphTableError {
    fn from(err: serde_yaml::Error) -> Self {
        GraphTableError::config(format!("YAML error: {}", err)).with_source(err)
    }
}

impl From<std::io::Error> for GraphTableError {
    fn from(err: std::io::Error) -> Self {
        GraphTableError::new(ErrorKind::IO, format!("I/O error: {}", err)).with_source(err)
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, GraphTableError>;
