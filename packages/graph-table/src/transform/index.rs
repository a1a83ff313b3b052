//! Node arena built by the indexing phase
//!
//! Build records live in one `Vec` in row order; ids map to slots through an
//! `FxHashMap`. Parent/child links are slot indices, never references.

use std::collections::BTreeMap;

use rustc_hash::FxHashMap;

use crate::domain::{GraphRecord, NodeId, NodeRow, Payload};

/// Mutable node shell, alive only while one transformation runs
#[derive(Debug, Clone, PartialEq)]
pub struct NodeBuildRecord {
    pub id: NodeId,
    pub parent_id: Option<NodeId>,
    pub key: String,
    pub identifier: String,
    pub values: BTreeMap<String, Payload>,
    /// Child slots in the owning `NodeIndex`, filled by the linker
    pub children: Vec<usize>,
}

impl NodeBuildRecord {
    pub fn from_row(row: &NodeRow) -> Self {
        Self {
            id: row.id,
            parent_id: row.parent_id,
            key: row.key.clone(),
            identifier: row.identifier.clone(),
            values: BTreeMap::new(),
            children: Vec::new(),
        }
    }

    /// Freeze into a public record; `children` must already be frozen
    pub(crate) fn freeze(self, children: Vec<GraphRecord>) -> GraphRecord {
        GraphRecord {
            key: self.key,
            identifier: self.identifier,
            values: self.values,
            children,
        }
    }
}

/// id → build record map plus the discovered root
#[derive(Debug, Clone)]
pub struct NodeIndex {
    pub(crate) records: Vec<NodeBuildRecord>,
    pub(crate) slots: FxHashMap<NodeId, usize>,
    pub(crate) root: usize,
}

impl NodeIndex {
    pub fn root_id(&self) -> NodeId {
        self.records[self.root].id
    }

    pub fn root(&self) -> &NodeBuildRecord {
        &self.records[self.root]
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.slots.contains_key(&id)
    }

    pub fn get(&self, id: NodeId) -> Option<&NodeBuildRecord> {
        self.slots.get(&id).map(|&slot| &self.records[slot])
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut NodeBuildRecord> {
        let slot = *self.slots.get(&id)?;
        self.records.get_mut(slot)
    }

    /// Build records in row order
    pub fn records(&self) -> &[NodeBuildRecord] {
        &self.records
    }

    /// Total values attached so far
    pub fn value_count(&self) -> usize {
        self.records.iter().map(|r| r.values.len()).sum()
    }
}
