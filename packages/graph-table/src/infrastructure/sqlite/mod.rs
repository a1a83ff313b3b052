//! SQLite row store
//!
//! Two tables, no foreign keys and no uniqueness on values: referential
//! integrity is the transformer's job, so faulty snapshots load as-is and
//! fail there with a precise error kind. The one exception is node ids:
//! `nodes.id` is UNIQUE, so a duplicate id is rejected at insert with a
//! `Database` error and `DuplicateNodeId` never comes out of this store.
//!
//! Nodes load in insertion order (`seq`), not id order, so row-order
//! children survive ids that are not ascending.
//!
//! Required fields are checked once, as each row is read (`InvalidRow`).
//! Non-finite reals are rejected on write (`InvalidRow`), since SQLite
//! stores NaN as NULL.

use std::path::Path;

use rusqlite::types::Value;
use rusqlite::{params, Connection};
use tracing::{debug, info};

use crate::domain::{GraphRecord, NodeId, NodeRow, Payload, PayloadType, RowSet, RowSource, ValueRow};
use crate::encoder::{EncodedRows, GraphEncoder};
use crate::{GraphTableError, Result};

/// SQLite-backed node/value tables
pub struct SqliteRowStore {
    conn: Connection,
}

impl SqliteRowStore {
    /// Open (or create) a store at the given path
    pub fn open(db_path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(db_path)?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    /// Create an in-memory store (for testing)
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> Result<()> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS nodes (
                seq INTEGER PRIMARY KEY,
                id INTEGER NOT NULL UNIQUE,
                parent_id INTEGER,
                key TEXT NOT NULL,
                identifier TEXT NOT NULL
            )",
            [],
        )?;

        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS node_values (
                node_id INTEGER NOT NULL,
                key TEXT NOT NULL,
                type_tag INTEGER NOT NULL,
                value
            )",
            [],
        )?;

        self.conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_node_values_node
             ON node_values(node_id)",
            [],
        )?;

        Ok(())
    }

    /// Append rows in one transaction
    pub fn insert_rows(&mut self, rows: &EncodedRows) -> Result<()> {
        let tx = self.conn.transaction()?;
        write_rows(&tx, rows)?;
        tx.commit()?;
        Ok(())
    }

    /// Replace the stored graph with `root`
    pub fn save_graph(&mut self, root: &GraphRecord) -> Result<EncodedRows> {
        let rows = GraphEncoder::new().encode(root);

        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM node_values", [])?;
        tx.execute("DELETE FROM nodes", [])?;
        write_rows(&tx, &rows)?;
        tx.commit()?;

        info!(
            "save_graph: stored {} nodes and {} values",
            rows.nodes.len(),
            rows.values.len()
        );
        Ok(rows)
    }

    /// Remove every row from both tables
    pub fn clear(&mut self) -> Result<()> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM node_values", [])?;
        tx.execute("DELETE FROM nodes", [])?;
        tx.commit()?;
        Ok(())
    }

    pub fn node_count(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM nodes", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    pub fn value_count(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM node_values", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Both tables as one snapshot
    pub fn load_rows(&self) -> Result<RowSet> {
        Ok(RowSet::new(self.load_node_rows()?, self.load_value_rows()?))
    }
}

impl RowSource for SqliteRowStore {
    fn load_node_rows(&self) -> Result<Vec<NodeRow>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, parent_id, key, identifier FROM nodes ORDER BY seq")?;
        let raw = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, NodeId>(0)?,
                    row.get::<_, Option<NodeId>>(1)?,
                    row.get::<_, Option<String>>(2)?,
                    row.get::<_, Option<String>>(3)?,
                ))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let rows = raw
            .into_iter()
            .map(|(id, parent_id, key, identifier)| {
                let key = key.ok_or_else(|| {
                    GraphTableError::invalid_row(format!("Node {} has a NULL key", id))
                        .with_node(id)
                })?;
                let identifier = identifier.ok_or_else(|| {
                    GraphTableError::invalid_row(format!("Node {} has a NULL identifier", id))
                        .with_node(id)
                })?;
                Ok(NodeRow::new(id, parent_id, key, identifier))
            })
            .collect::<Result<Vec<_>>>()?;

        debug!("load_node_rows: {} rows", rows.len());
        Ok(rows)
    }

    fn load_value_rows(&self) -> Result<Vec<ValueRow>> {
        let mut stmt = self
            .conn
            .prepare("SELECT node_id, key, type_tag, value FROM node_values ORDER BY rowid")?;
        let raw = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, NodeId>(0)?,
                    row.get::<_, Option<String>>(1)?,
                    row.get::<_, i64>(2)?,
                    row.get::<_, Value>(3)?,
                ))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let rows = raw
            .into_iter()
            .map(|(node_id, key, type_tag, value)| {
                let key = key.ok_or_else(|| {
                    GraphTableError::invalid_row(format!("Value on node {} has a NULL key", node_id))
                        .with_node(node_id)
                })?;
                let payload = payload_from_sql(type_tag, value).map_err(|err| {
                    GraphTableError::invalid_row(format!(
                        "Value '{}' on node {}: {}",
                        key, node_id, err
                    ))
                    .with_node(node_id)
                })?;
                Ok(ValueRow::new(node_id, key, payload))
            })
            .collect::<Result<Vec<_>>>()?;

        debug!("load_value_rows: {} rows", rows.len());
        Ok(rows)
    }
}

fn write_rows(conn: &Connection, rows: &EncodedRows) -> Result<()> {
    let mut insert_node = conn.prepare_cached(
        "INSERT INTO nodes (id, parent_id, key, identifier) VALUES (?1, ?2, ?3, ?4)",
    )?;
    for node in &rows.nodes {
        insert_node.execute(params![node.id, node.parent_id, node.key, node.identifier])?;
    }

    let mut insert_value = conn.prepare_cached(
        "INSERT INTO node_values (node_id, key, type_tag, value) VALUES (?1, ?2, ?3, ?4)",
    )?;
    for value in &rows.values {
        if let Payload::Real(f) = &value.payload {
            if !f.is_finite() {
                return Err(GraphTableError::invalid_row(format!(
                    "Value '{}' on node {} is a non-finite real ({})",
                    value.key, value.node_id, f
                ))
                .with_node(value.node_id));
            }
        }
        insert_value.execute(params![
            value.node_id,
            value.key,
            value.payload.type_tag().code(),
            payload_to_sql(&value.payload)
        ])?;
    }

    Ok(())
}

fn payload_to_sql(payload: &Payload) -> Value {
    match payload {
        Payload::Null => Value::Null,
        Payload::Integer(i) => Value::Integer(*i),
        Payload::Real(f) => Value::Real(*f),
        Payload::Text(s) => Value::Text(s.clone()),
        Payload::Blob(b) => Value::Blob(b.clone()),
    }
}

fn payload_from_sql(type_tag: i64, value: Value) -> std::result::Result<Payload, String> {
    let ty = PayloadType::from_code(type_tag).ok_or_else(|| format!("unknown type tag {}", type_tag))?;
    match (ty, value) {
        (PayloadType::Null, Value::Null) => Ok(Payload::Null),
        (PayloadType::Integer, Value::Integer(i)) => Ok(Payload::Integer(i)),
        (PayloadType::Real, Value::Real(f)) => Ok(Payload::Real(f)),
        (PayloadType::Text, Value::Text(s)) => Ok(Payload::Text(s)),
        (PayloadType::Blob, Value::Blob(b)) => Ok(Payload::Blob(b)),
        (ty, value) => Err(format!(
            "type tag {} does not match stored {:?}",
            ty.as_str(),
            value.data_type()
        )),
    }
}
