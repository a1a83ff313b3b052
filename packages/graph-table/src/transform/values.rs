//! Phase 2: attach value rows to their owning nodes

use std::collections::btree_map::Entry;

use tracing::{debug, warn};

use super::index::NodeIndex;
use crate::domain::ValueRow;
use crate::{GraphTableError, Result};

/// Store each value under its node's `values` map
///
/// Only mutates existing build records; never creates nodes.
///
/// # Errors
///
/// - `OrphanValue` when `node_id` is not in the index
/// - `DuplicateValueKey` when `(node_id, key)` repeats; the first payload
///   stays in place but the phase still fails
pub fn attach_values(rows: &[ValueRow], index: &mut NodeIndex) -> Result<()> {
    debug!("attach_values: attaching {} value rows", rows.len());

    for row in rows {
        let record = index
            .get_mut(row.node_id)
            .ok_or_else(|| GraphTableError::orphan_value(row.node_id, &row.key))?;

        match record.values.entry(row.key.clone()) {
            Entry::Occupied(_) => {
                warn!(
                    "attach_values: node {} already has value '{}', keeping the first",
                    row.node_id, row.key
                );
                return Err(GraphTableError::duplicate_value_key(row.node_id, &row.key));
            }
            Entry::Vacant(entry) => {
                entry.insert(row.payload.clone());
            }
        }
    }

    Ok(())
}
