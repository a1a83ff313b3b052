//! GraphRecord → rows
//!
//! The inverse of `Transformer`: flattens a record tree into node and value
//! rows that a row store can persist. Ids are assigned from 1 in pre-order,
//! so re-encoding an unchanged tree yields identical rows.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{GraphRecord, NodeId, NodeRow, RowSet, ValueRow};

/// Rows produced by one encode
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EncodedRows {
    pub nodes: Vec<NodeRow>,
    pub values: Vec<ValueRow>,
}

impl From<EncodedRows> for RowSet {
    fn from(rows: EncodedRows) -> Self {
        RowSet::new(rows.nodes, rows.values)
    }
}

#[derive(Debug, Clone)]
pub struct GraphEncoder {
    first_id: NodeId,
}

impl Default for GraphEncoder {
    fn default() -> Self {
        Self { first_id: 1 }
    }
}

impl GraphEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start numbering at `first_id` instead of 1
    pub fn with_first_id(first_id: NodeId) -> Self {
        Self { first_id }
    }

    /// Flatten `root` and everything under it
    ///
    /// Parents come before children; siblings keep their sequence order, so
    /// decoding with row-order children rebuilds the same tree. Values are
    /// emitted in key order.
    pub fn encode(&self, root: &GraphRecord) -> EncodedRows {
        let mut rows = EncodedRows::default();
        let mut next_id = self.first_id;
        let mut stack: Vec<(&GraphRecord, Option<NodeId>)> = vec![(root, None)];

        while let Some((record, parent_id)) = stack.pop() {
            let id = next_id;
            next_id += 1;

            rows.nodes.push(NodeRow::new(
                id,
                parent_id,
                record.key.clone(),
                record.identifier.clone(),
            ));
            rows.values.extend(
                record
                    .values
                    .iter()
                    .map(|(key, payload)| ValueRow::new(id, key.clone(), payload.clone())),
            );
            stack.extend(record.children.iter().rev().map(|child| (child, Some(id))));
        }

        debug!(
            "encode: {} node rows, {} value rows",
            rows.nodes.len(),
            rows.values.len()
        );
        rows
    }
}
