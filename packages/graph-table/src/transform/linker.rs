//! Phase 3: link children to parents and freeze the tree
//!
//! # Algorithm
//! 1. Resolve every non-root `parent_id` to a slot (O(N))
//! 2. Walk each node's ancestor chain, memoising nodes already known to reach
//!    the root; a walk that meets its own path is a cycle (O(N) amortised)
//! 3. Fill `children` in row order, optionally sorting by `(key, identifier)`
//! 4. Freeze leaves-first along a BFS order, so no recursion is needed
//!
//! Nothing is frozen until steps 1-2 pass for the whole set.

use tracing::debug;

use super::index::NodeIndex;
use crate::config::ChildOrder;
use crate::domain::GraphRecord;
use crate::{GraphTableError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Visit {
    Unvisited,
    InProgress,
    ReachesRoot,
}

/// Wire parent → children edges and produce the rooted record tree
///
/// # Errors
///
/// - `DanglingParent` when a parent id is not in the index
/// - `CycleDetected` when some node's ancestor chain never reaches the root
pub fn link_children(index: NodeIndex, order: ChildOrder) -> Result<GraphRecord> {
    let NodeIndex {
        mut records,
        slots,
        root,
    } = index;
    let len = records.len();
    debug!("link_children: linking {} nodes ({:?})", len, order);

    // Root points at itself so ancestor walks always have somewhere to go.
    // The indexer admits exactly one parentless row, and it is `root`.
    let mut parents = vec![root; len];
    for (slot, record) in records.iter().enumerate() {
        let Some(parent_id) = record.parent_id else {
            continue;
        };
        parents[slot] = *slots
            .get(&parent_id)
            .ok_or_else(|| GraphTableError::dangling_parent(record.id, parent_id))?;
    }

    let mut visits = vec![Visit::Unvisited; len];
    visits[root] = Visit::ReachesRoot;
    let mut path = Vec::new();
    for start in 0..len {
        let mut cursor = start;
        let mut hops = 0;
        while visits[cursor] == Visit::Unvisited {
            if hops >= len {
                return Err(GraphTableError::cycle_detected(records[start].id));
            }
            visits[cursor] = Visit::InProgress;
            path.push(cursor);
            cursor = parents[cursor];
            hops += 1;
        }
        if visits[cursor] == Visit::InProgress {
            return Err(GraphTableError::cycle_detected(records[cursor].id));
        }
        for slot in path.drain(..) {
            visits[slot] = Visit::ReachesRoot;
        }
    }

    let mut children: Vec<Vec<usize>> = vec![Vec::new(); len];
    for (slot, &parent) in parents.iter().enumerate() {
        if slot != root {
            children[parent].push(slot);
        }
    }
    if order == ChildOrder::Canonical {
        for siblings in &mut children {
            // sort_by is stable, so equal (key, identifier) pairs keep row order
            siblings.sort_by(|&a, &b| {
                (&records[a].key, &records[a].identifier)
                    .cmp(&(&records[b].key, &records[b].identifier))
            });
        }
    }
    for (record, siblings) in records.iter_mut().zip(children) {
        record.children = siblings;
    }

    let mut bfs = Vec::with_capacity(len);
    bfs.push(root);
    let mut next = 0;
    while next < bfs.len() {
        bfs.extend_from_slice(&records[bfs[next]].children);
        next += 1;
    }

    let mut shells: Vec<_> = records.into_iter().map(Some).collect();
    let mut frozen: Vec<Option<GraphRecord>> = vec![None; len];
    for &slot in bfs.iter().rev() {
        let Some(shell) = shells[slot].take() else {
            continue;
        };
        let kids = shell
            .children
            .iter()
            .filter_map(|&child| frozen[child].take())
            .collect();
        frozen[slot] = Some(shell.freeze(kids));
    }

    let tree = frozen[root].take().ok_or_else(GraphTableError::missing_root)?;
    debug!("link_children: froze {} nodes", bfs.len());
    Ok(tree)
}
