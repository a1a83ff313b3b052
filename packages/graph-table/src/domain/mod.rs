//! Domain layer
//!
//! # Domain Models
//!
//! - `NodeRow` / `ValueRow`: the two flattened tables a graph is stored as
//! - `Payload`: opaque leaf value with a storage-class tag
//! - `GraphRecord`: the rebuilt tree handed to consumers
//!
//! # Port Trait
//!
//! - `RowSource`: anything that can hand over a snapshot of both tables

pub mod record;
pub mod rows;

pub use record::{GraphRecord, PreOrder};
pub use rows::{NodeId, NodeRow, Payload, PayloadType, RowSet, ValueRow};

use crate::config::TransformConfig;
use crate::transform::Transformer;
use crate::Result;

// ═══════════════════════════════════════════════════════════════════════════
// Port Trait: RowSource
// ═══════════════════════════════════════════════════════════════════════════

/// Source of node and value rows
///
/// Implementations fetch an already-consistent snapshot; rows must come back
/// in a stable order (child order in the rebuilt graph follows it).
///
/// # Implementations
///
/// - `SqliteRowStore`: SQLite adapter
/// - `RowSet`: in-memory rows (tests, JSON input)
pub trait RowSource {
    /// All node rows, in storage order
    fn load_node_rows(&self) -> Result<Vec<NodeRow>>;

    /// All value rows, in storage order
    fn load_value_rows(&self) -> Result<Vec<ValueRow>>;

    /// Fetch both tables and rebuild the graph
    ///
    /// # Errors
    ///
    /// Storage errors from either load, or the first integrity fault the
    /// transformer finds.
    fn load_graph(&self, config: &TransformConfig) -> Result<GraphRecord> {
        let nodes = self.load_node_rows()?;
        let values = self.load_value_rows()?;
        Transformer::with_config(nodes, values, config.clone()).into_result()
    }
}

impl RowSource for RowSet {
    fn load_node_rows(&self) -> Result<Vec<NodeRow>> {
        Ok(self.nodes.clone())
    }

    fn load_value_rows(&self) -> Result<Vec<ValueRow>> {
        Ok(self.values.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    #[test]
    fn test_row_set_as_source() {
        let rows = RowSet::new(
            vec![NodeRow::root(1, "root"), NodeRow::child(2, 1, "child", "0")],
            vec![ValueRow::new(2, "name", "x")],
        );

        let root = rows.load_graph(&TransformConfig::default()).unwrap();
        assert_eq!(root.node_count(), 2);
        assert_eq!(
            root.child("child", "0").unwrap().value("name"),
            Some(&Payload::from("x"))
        );
    }

    #[test]
    fn test_row_set_source_surfaces_integrity_error() {
        let rows = RowSet::new(vec![NodeRow::child(1, 5, "a", "")], Vec::new());
        let err = rows.load_graph(&TransformConfig::default()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::MissingRoot);
    }
}
