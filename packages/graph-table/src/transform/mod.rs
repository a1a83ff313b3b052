//! Row → graph transformation
//!
//! Three phases, run strictly in order, stopping at the first error:
//!
//! 1. `indexer`: node rows → `NodeIndex` (id map + root)
//! 2. `values`: value rows → each node's `values`
//! 3. `linker`: parent links → frozen `GraphRecord` tree
//!
//! `Transformer` runs all three at construction time and keeps either the
//! root or the first error, never both.

pub mod index;
pub mod indexer;
pub mod linker;
pub mod values;

pub use index::{NodeBuildRecord, NodeIndex};

use tracing::{info, warn};

use crate::config::TransformConfig;
use crate::domain::{GraphRecord, NodeRow, ValueRow};
use crate::{GraphTableError, Result};

/// Where a transformation is (or stopped)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformState {
    Indexing,
    AttachingValues,
    Linking,
    Done,
    Failed,
}

impl TransformState {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransformState::Indexing => "indexing",
            TransformState::AttachingValues => "attaching_values",
            TransformState::Linking => "linking",
            TransformState::Done => "done",
            TransformState::Failed => "failed",
        }
    }
}

/// One-shot rebuild of a graph record from a row snapshot
///
/// # Examples
///
/// ```rust
/// use graph_table::domain::{NodeRow, ValueRow};
/// use graph_table::Transformer;
///
/// let transformer = Transformer::new(
///     vec![NodeRow::root(1, "root"), NodeRow::child(2, 1, "child", "0")],
///     vec![ValueRow::new(2, "name", "x")],
/// );
///
/// assert!(transformer.last_error().is_none());
/// let root = transformer.root().unwrap();
/// assert_eq!(root.child("child", "0").unwrap().value("name").unwrap().as_text(), Some("x"));
/// ```
#[derive(Debug)]
pub struct Transformer {
    node_rows: Vec<NodeRow>,
    value_rows: Vec<ValueRow>,
    config: TransformConfig,
    state: TransformState,
    failed_phase: Option<TransformState>,
    outcome: Result<GraphRecord>,
}

impl Transformer {
    /// Transform with the default configuration (row-order children)
    pub fn new(node_rows: Vec<NodeRow>, value_rows: Vec<ValueRow>) -> Self {
        Self::with_config(node_rows, value_rows, TransformConfig::default())
    }

    pub fn with_config(
        node_rows: Vec<NodeRow>,
        value_rows: Vec<ValueRow>,
        config: TransformConfig,
    ) -> Self {
        let mut phase = TransformState::Indexing;
        let outcome = run_phases(&node_rows, &value_rows, &config, &mut phase);

        let (state, failed_phase) = match &outcome {
            Ok(root) => {
                info!(
                    "transform: rebuilt {} nodes and {} values",
                    root.node_count(),
                    root.value_count()
                );
                (TransformState::Done, None)
            }
            Err(err) => {
                warn!("transform: failed during {}: {}", phase.as_str(), err);
                (TransformState::Failed, Some(phase))
            }
        };

        Self {
            node_rows,
            value_rows,
            config,
            state,
            failed_phase,
            outcome,
        }
    }

    /// Rebuilt root; `None` whenever `last_error` is set
    pub fn root(&self) -> Option<&GraphRecord> {
        self.outcome.as_ref().ok()
    }

    /// First fault encountered; `None` whenever `root` is set
    pub fn last_error(&self) -> Option<&GraphTableError> {
        self.outcome.as_ref().err()
    }

    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }

    /// `Done` or `Failed` once constructed
    pub fn state(&self) -> TransformState {
        self.state
    }

    /// Phase that was running when the transformation failed
    pub fn failed_phase(&self) -> Option<TransformState> {
        self.failed_phase
    }

    pub fn node_rows(&self) -> &[NodeRow] {
        &self.node_rows
    }

    pub fn value_rows(&self) -> &[ValueRow] {
        &self.value_rows
    }

    pub fn config(&self) -> &TransformConfig {
        &self.config
    }

    pub fn into_result(self) -> Result<GraphRecord> {
        self.outcome
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Single-phase entry points (tests only, not a stable API)
    // ═══════════════════════════════════════════════════════════════════════

    #[doc(hidden)]
    pub fn index_nodes(&self) -> Result<NodeIndex> {
        indexer::index_nodes(&self.node_rows)
    }

    #[doc(hidden)]
    pub fn attach_values(&self, index: &mut NodeIndex) -> Result<()> {
        values::attach_values(&self.value_rows, index)
    }

    #[doc(hidden)]
    pub fn link_children(&self, index: NodeIndex) -> Result<GraphRecord> {
        linker::link_children(index, self.config.child_order)
    }
}

fn run_phases(
    node_rows: &[NodeRow],
    value_rows: &[ValueRow],
    config: &TransformConfig,
    phase: &mut TransformState,
) -> Result<GraphRecord> {
    *phase = TransformState::Indexing;
    config.validate()?;
    let mut index = indexer::index_nodes(node_rows)?;

    *phase = TransformState::AttachingValues;
    values::attach_values(value_rows, &mut index)?;

    *phase = TransformState::Linking;
    linker::link_children(index, config.child_order)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Payload;
    use crate::ErrorKind;

    fn scenario_nodes() -> Vec<NodeRow> {
        vec![NodeRow::root(1, "root"), NodeRow::child(2, 1, "child", "0")]
    }

    #[test]
    fn test_success_state() {
        let t = Transformer::new(scenario_nodes(), vec![ValueRow::new(2, "name", "x")]);

        assert_eq!(t.state(), TransformState::Done);
        assert!(t.is_success());
        assert!(t.last_error().is_none());
        assert!(t.failed_phase().is_none());

        let root = t.root().unwrap();
        assert_eq!(root.children.len(), 1);
        assert_eq!(
            root.child("child", "0").unwrap().value("name"),
            Some(&Payload::from("x"))
        );
    }

    #[test]
    fn test_failure_in_indexing() {
        let t = Transformer::new(Vec::new(), Vec::new());
        assert_eq!(t.state(), TransformState::Failed);
        assert_eq!(t.failed_phase(), Some(TransformState::Indexing));
        assert!(t.root().is_none());
        assert_eq!(t.last_error().unwrap().kind, ErrorKind::MissingRoot);
    }

    #[test]
    fn test_failure_in_value_attachment() {
        let t = Transformer::new(scenario_nodes(), vec![ValueRow::new(3, "name", "x")]);
        assert_eq!(t.failed_phase(), Some(TransformState::AttachingValues));
        assert!(t.root().is_none());
        assert_eq!(t.last_error().unwrap().kind, ErrorKind::OrphanValue);
    }

    #[test]
    fn test_failure_in_linking() {
        let t = Transformer::new(
            vec![NodeRow::root(1, ""), NodeRow::child(2, 99, "x", "")],
            Vec::new(),
        );
        assert_eq!(t.failed_phase(), Some(TransformState::Linking));
        assert!(t.root().is_none());
        assert_eq!(t.last_error().unwrap().kind, ErrorKind::DanglingParent);
    }

    #[test]
    fn test_earlier_phase_error_wins() {
        // Orphan value and dangling parent: value attachment runs first.
        let t = Transformer::new(
            vec![NodeRow::root(1, ""), NodeRow::child(2, 99, "x", "")],
            vec![ValueRow::new(50, "k", 1i64)],
        );
        assert_eq!(t.last_error().unwrap().kind, ErrorKind::OrphanValue);
    }

    #[test]
    fn test_invalid_config_fails_before_indexing() {
        let config = TransformConfig {
            version: 9,
            ..TransformConfig::default()
        };
        let t = Transformer::with_config(scenario_nodes(), Vec::new(), config);
        assert_eq!(t.failed_phase(), Some(TransformState::Indexing));
        assert_eq!(t.last_error().unwrap().kind, ErrorKind::Config);
    }

    #[test]
    fn test_phases_run_in_isolation() {
        let t = Transformer::new(scenario_nodes(), vec![ValueRow::new(2, "name", "x")]);

        let mut index = t.index_nodes().unwrap();
        assert_eq!(index.root_id(), 1);
        assert_eq!(index.value_count(), 0);

        t.attach_values(&mut index).unwrap();
        assert_eq!(index.value_count(), 1);

        let root = t.link_children(index).unwrap();
        assert_eq!(Some(&root), t.root());
    }

    #[test]
    fn test_rows_are_kept() {
        let t = Transformer::new(scenario_nodes(), Vec::new());
        assert_eq!(t.node_rows(), scenario_nodes().as_slice());
        assert!(t.value_rows().is_empty());
        assert_eq!(t.config(), &TransformConfig::default());
    }

    #[test]
    fn test_deep_chain_builds_and_drops() {
        let depth: i64 = 300_000;
        let mut nodes = vec![NodeRow::root(1, "")];
        nodes.extend((2..=depth).map(|id| NodeRow::child(id, id - 1, "next", "")));

        let t = Transformer::new(nodes, Vec::new());
        assert!(t.is_success());
        assert_eq!(t.root().unwrap().node_count(), depth as usize);
        drop(t);
    }

    #[test]
    fn test_into_result() {
        let root = Transformer::new(scenario_nodes(), Vec::new())
            .into_result()
            .unwrap();
        assert_eq!(root.node_count(), 2);

        let err = Transformer::new(vec![NodeRow::root(1, ""), NodeRow::root(2, "")], Vec::new())
            .into_result()
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::MultipleRoots);
    }
}
