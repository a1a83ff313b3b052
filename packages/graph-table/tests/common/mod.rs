//! Shared fixtures for graph-table integration tests

#![allow(dead_code)]

use graph_table::{ErrorKind, GraphRecord, NodeRow, Payload, Transformer, ValueRow};
use tracing_subscriber::EnvFilter;

/// Route `tracing` output to the test harness (`RUST_LOG=debug` to see it)
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Root with one child "child"/"0" carrying `name -> "x"`
pub fn scenario_rows() -> (Vec<NodeRow>, Vec<ValueRow>) {
    (
        vec![NodeRow::root(1, "root"), NodeRow::child(2, 1, "child", "0")],
        vec![ValueRow::new(2, "name", "x")],
    )
}

/// A small session-like tree: windows holding tabs
pub fn session_tree() -> GraphRecord {
    GraphRecord::new("", "")
        .with_value("version", 7i64)
        .with_child(
            GraphRecord::new("window", "0")
                .with_value("frame", "0 0 800 600")
                .with_child(
                    GraphRecord::new("tab", "0")
                        .with_value("title", "build")
                        .with_value("scrollback", vec![27u8, 91, 48, 109]),
                )
                .with_child(GraphRecord::new("tab", "1").with_value("title", "logs")),
        )
        .with_child(
            GraphRecord::new("window", "1")
                .with_value("zoom", 1.25f64)
                .with_value("hidden", Payload::Null),
        )
}

pub fn assert_fails_with(transformer: &Transformer, kind: ErrorKind) {
    assert!(
        transformer.root().is_none(),
        "root must be absent when an error is reported"
    );
    let err = transformer
        .last_error()
        .unwrap_or_else(|| panic!("expected {} error, transformation succeeded", kind));
    assert_eq!(err.kind, kind, "unexpected error: {}", err);
}
