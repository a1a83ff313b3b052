//! graph-table: rebuild a hierarchical graph record from flattened rows
//!
//! An arbitrarily nested record is persisted as two tables: a node table
//! (`id`, `parent_id`, `key`, `identifier`) and a value table (`node_id`,
//! `key`, `payload`). This crate inverts that flattening.
//!
//! ## Pipeline
//!
//! 1. **Index**: one build record per node row, keyed by id; find the single root
//! 2. **Attach values**: move each value row onto its owning node
//! 3. **Link**: wire parents to children, reject cycles, freeze the tree
//!
//! The first integrity fault stops the pipeline and is reported as a
//! `GraphTableError`; no partial tree is ever exposed.
//!
//! ## Usage
//!
//! ```rust
//! use graph_table::domain::{NodeRow, ValueRow};
//! use graph_table::{ErrorKind, Transformer};
//!
//! let ok = Transformer::new(
//!     vec![NodeRow::root(1, "root"), NodeRow::child(2, 1, "child", "0")],
//!     vec![ValueRow::new(2, "name", "x")],
//! );
//! assert_eq!(ok.root().unwrap().node_count(), 2);
//!
//! let broken = Transformer::new(
//!     vec![NodeRow::root(1, ""), NodeRow::child(2, 99, "x", "")],
//!     Vec::new(),
//! );
//! assert!(broken.root().is_none());
//! assert_eq!(broken.last_error().unwrap().kind, ErrorKind::DanglingParent);
//! ```

pub mod config;
pub mod domain;
pub mod encoder;
pub mod error;
pub mod transform;

#[cfg(feature = "sqlite")]
pub mod infrastructure;

pub use error::{ErrorKind, GraphTableError, Result};

pub use config::{ChildOrder, TransformConfig};
pub use domain::{GraphRecord, NodeId, NodeRow, Payload, PayloadType, RowSet, RowSource, ValueRow};
pub use encoder::{EncodedRows, GraphEncoder};
pub use transform::{NodeBuildRecord, NodeIndex, TransformState, Transformer};

#[cfg(feature = "sqlite")]
pub use infrastructure::SqliteRowStore;
