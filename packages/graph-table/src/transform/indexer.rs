//! Phase 1: index node rows and find the root

use std::collections::hash_map::Entry;

use rustc_hash::FxHashMap;
use tracing::debug;

use super::index::{NodeBuildRecord, NodeIndex};
use crate::domain::{NodeId, NodeRow};
use crate::{GraphTableError, Result};

/// Build one record per row, keyed by id, and locate the single root
///
/// Parent links are only stored here; the linker resolves them.
///
/// # Errors
///
/// - `DuplicateNodeId` when an id repeats (the earlier row is never overwritten)
/// - `MultipleRoots` on the second row with a null parent
/// - `MissingRoot` when no row has a null parent (including no rows at all)
/// - `CycleDetected` instead, when there is no root but every parent link
///   resolves inside the set (a finite rootless set like that must loop)
pub fn index_nodes(rows: &[NodeRow]) -> Result<NodeIndex> {
    debug!("index_nodes: indexing {} node rows", rows.len());

    let mut records = Vec::with_capacity(rows.len());
    let mut slots: FxHashMap<_, usize> =
        FxHashMap::with_capacity_and_hasher(rows.len(), Default::default());
    let mut root: Option<usize> = None;

    for row in rows {
        let slot = records.len();
        match slots.entry(row.id) {
            Entry::Occupied(_) => return Err(GraphTableError::duplicate_node_id(row.id)),
            Entry::Vacant(entry) => {
                entry.insert(slot);
            }
        }

        if row.is_root() {
            if let Some(existing) = root {
                let existing: &NodeBuildRecord = &records[existing];
                return Err(GraphTableError::multiple_roots(existing.id, row.id));
            }
            root = Some(slot);
        }

        records.push(NodeBuildRecord::from_row(row));
    }

    let Some(root) = root else {
        return Err(rootless_error(&records, &slots));
    };
    debug!(
        "index_nodes: indexed {} nodes, root is {}",
        records.len(),
        records[root].id
    );

    Ok(NodeIndex {
        records,
        slots,
        root,
    })
}

fn rootless_error(records: &[NodeBuildRecord], slots: &FxHashMap<NodeId, usize>) -> GraphTableError {
    let parents: Option<Vec<usize>> = records
        .iter()
        .map(|record| {
            record
                .parent_id
                .and_then(|parent_id| slots.get(&parent_id).copied())
        })
        .collect();
    let Some(parents) = parents.filter(|p| !p.is_empty()) else {
        return GraphTableError::missing_root();
    };

    // After `len` hops from any node the walk is inside the loop.
    let mut cursor = 0;
    for _ in 0..parents.len() {
        cursor = parents[cursor];
    }
    GraphTableError::cycle_detected(records[cursor].id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    #[test]
    fn test_single_root() {
        let index = index_nodes(&[
            NodeRow::child(2, 1, "child", "0"),
            NodeRow::root(1, "root"),
        ])
        .unwrap();

        assert_eq!(index.len(), 2);
        assert_eq!(index.root_id(), 1);
        assert_eq!(index.root().key, "root");
        assert_eq!(index.get(2).unwrap().parent_id, Some(1));
        assert!(index.get(2).unwrap().children.is_empty());
    }

    #[test]
    fn test_records_keep_row_order() {
        let index = index_nodes(&[
            NodeRow::root(10, ""),
            NodeRow::child(30, 10, "b", ""),
            NodeRow::child(20, 10, "a", ""),
        ])
        .unwrap();

        let ids: Vec<_> = index.records().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![10, 30, 20]);
    }

    #[test]
    fn test_missing_root() {
        let err = index_nodes(&[NodeRow::child(1, 50, "a", ""), NodeRow::child(2, 1, "b", "")])
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::MissingRoot);
    }

    #[test]
    fn test_rootless_loop_is_cycle() {
        // 4 is a tail hanging off the 1 → 3 → 2 → 1 loop
        let err = index_nodes(&[
            NodeRow::child(4, 1, "tail", ""),
            NodeRow::child(1, 3, "a", ""),
            NodeRow::child(2, 1, "b", ""),
            NodeRow::child(3, 2, "c", ""),
        ])
        .unwrap_err();
        assert_eq!(err.kind, ErrorKind::CycleDetected);
        assert!([1, 2, 3].contains(&err.node_id.unwrap()));
    }

    #[test]
    fn test_empty_input_is_missing_root() {
        let err = index_nodes(&[]).unwrap_err();
        assert_eq!(err.kind, ErrorKind::MissingRoot);
    }

    #[test]
    fn test_multiple_roots() {
        let err = index_nodes(&[
            NodeRow::root(1, "a"),
            NodeRow::child(2, 1, "b", ""),
            NodeRow::root(3, "c"),
        ])
        .unwrap_err();
        assert_eq!(err.kind, ErrorKind::MultipleRoots);
        assert_eq!(err.node_id, Some(3));
    }

    #[test]
    fn test_duplicate_node_id() {
        let err = index_nodes(&[
            NodeRow::root(1, "root"),
            NodeRow::child(2, 1, "first", ""),
            NodeRow::child(2, 1, "second", ""),
        ])
        .unwrap_err();
        assert_eq!(err.kind, ErrorKind::DuplicateNodeId);
        assert_eq!(err.node_id, Some(2));
    }

    #[test]
    fn test_duplicate_root_id_reports_duplicate_not_multiple_roots() {
        let err = index_nodes(&[NodeRow::root(1, "a"), NodeRow::root(1, "b")]).unwrap_err();
        assert_eq!(err.kind, ErrorKind::DuplicateNodeId);
    }
}
