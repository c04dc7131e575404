//! Embedded SQLite backend.
//!
//! # Responsibility
//! - Keep each collection as one table with an explicit `seq` order column.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - `save_*` deletes and re-inserts a collection inside one transaction.
//! - Rows are loaded in `seq` order, which mirrors the slice order of the last save.
//! - Rows that do not decode into valid nodes/edges fail the load.

use super::{Collection, GraphStore, StoreError, StoreResult};
use crate::db::{open_db, open_db_in_memory};
use crate::model::node::NodeRecord;
use crate::model::time::format_timestamp;
use crate::model::{Edge, Node, NodeType, PropertyMap};
use chrono::{DateTime, Utc};
use log::{debug, error};
use rusqlite::{params, Connection, Row};
use std::path::{Path, PathBuf};
use uuid::Uuid;

const NODE_SELECT_SQL: &str = "SELECT
    id,
    type,
    properties,
    created_at,
    modified_at
FROM nodes
ORDER BY seq ASC";

const EDGE_SELECT_SQL: &str = "SELECT
    id,
    source_id,
    label,
    target_id
FROM edges
ORDER BY seq ASC";

/// SQLite-backed graph store owning one migrated connection.
pub struct SqliteStore {
    conn: Connection,
    path: Option<PathBuf>,
}

impl SqliteStore {
    /// Opens a database file, creating parent directories and applying migrations.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| StoreError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        Ok(Self {
            conn: open_db(path)?,
            path: Some(path.to_path_buf()),
        })
    }

    /// Opens a private in-memory database. Contents vanish on drop.
    pub fn open_in_memory() -> StoreResult<Self> {
        Ok(Self {
            conn: open_db_in_memory()?,
            path: None,
        })
    }

    /// Underlying connection, for diagnostics and tests.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl GraphStore for SqliteStore {
    fn describe(&self) -> String {
        match &self.path {
            Some(path) => format!("sqlite:{}", path.display()),
            None => "sqlite::memory:".to_string(),
        }
    }

    fn load_nodes(&self) -> StoreResult<Vec<Node>> {
        let mut stmt = self.conn.prepare(NODE_SELECT_SQL)?;
        let mut rows = stmt.query([])?;
        let mut nodes = Vec::new();
        while let Some(row) = rows.next()? {
            nodes.push(parse_node_row(row).inspect_err(|err| {
                error!(
                    "event=store_load module=store status=error backend=sqlite collection=nodes error={err}"
                );
            })?);
        }
        debug!(
            "event=store_load module=store status=ok backend=sqlite collection=nodes count={}",
            nodes.len()
        );
        Ok(nodes)
    }

    fn save_nodes(&self, nodes: &[Node]) -> StoreResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute("DELETE FROM nodes;", [])?;
        {
            let mut insert = tx.prepare(
                "INSERT INTO nodes (
                    id,
                    seq,
                    type,
                    properties,
                    created_at,
                    modified_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            )?;
            for (seq, node) in nodes.iter().enumerate() {
                let properties =
                    serde_json::to_string(&node.properties).map_err(|source| StoreError::Json {
                        collection: Collection::Nodes,
                        source,
                    })?;
                insert.execute(params![
                    node.id.to_string(),
                    seq_to_db(seq),
                    node.kind().as_str(),
                    properties,
                    format_timestamp(&node.created_at),
                    format_timestamp(&node.modified_at),
                ])?;
            }
        }
        tx.commit()?;

        debug!(
            "event=store_save module=store status=ok backend=sqlite collection=nodes count={}",
            nodes.len()
        );
        Ok(())
    }

    fn load_edges(&self) -> StoreResult<Vec<Edge>> {
        let mut stmt = self.conn.prepare(EDGE_SELECT_SQL)?;
        let mut rows = stmt.query([])?;
        let mut edges = Vec::new();
        while let Some(row) = rows.next()? {
            edges.push(parse_edge_row(row)?);
        }
        debug!(
            "event=store_load module=store status=ok backend=sqlite collection=edges count={}",
            edges.len()
        );
        Ok(edges)
    }

    fn save_edges(&self, edges: &[Edge]) -> StoreResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute("DELETE FROM edges;", [])?;
        {
            let mut insert = tx.prepare(
                "INSERT INTO edges (
                    id,
                    seq,
                    source_id,
                    label,
                    target_id
                ) VALUES (?1, ?2, ?3, ?4, ?5);",
            )?;
            for (seq, edge) in edges.iter().enumerate() {
                insert.execute(params![
                    edge.id.to_string(),
                    seq_to_db(seq),
                    edge.source_id.to_string(),
                    edge.label.as_str(),
                    edge.target_id.to_string(),
                ])?;
            }
        }
        tx.commit()?;

        debug!(
            "event=store_save module=store status=ok backend=sqlite collection=edges count={}",
            edges.len()
        );
        Ok(())
    }
}

fn parse_node_row(row: &Row<'_>) -> StoreResult<Node> {
    let id = parse_uuid(row.get::<_, String>("id")?, "nodes.id")?;

    let type_text: String = row.get("type")?;
    let kind = NodeType::parse(&type_text).ok_or_else(|| {
        StoreError::InvalidData(format!("invalid node type `{type_text}` in nodes.type"))
    })?;

    let properties_text: String = row.get("properties")?;
    let properties: PropertyMap = serde_json::from_str(&properties_text).map_err(|err| {
        StoreError::InvalidData(format!("invalid properties for node {id}: {err}"))
    })?;

    let record = NodeRecord {
        id,
        kind,
        properties,
        created_at: parse_time(row.get::<_, String>("created_at")?, "nodes.created_at")?,
        modified_at: Some(parse_time(
            row.get::<_, String>("modified_at")?,
            "nodes.modified_at",
        )?),
    };
    Node::try_from(record)
        .map_err(|err| StoreError::InvalidData(format!("node {id} failed validation: {err}")))
}

fn parse_edge_row(row: &Row<'_>) -> StoreResult<Edge> {
    Ok(Edge {
        id: parse_uuid(row.get::<_, String>("id")?, "edges.id")?,
        source_id: parse_uuid(row.get::<_, String>("source_id")?, "edges.source_id")?,
        label: row.get("label")?,
        target_id: parse_uuid(row.get::<_, String>("target_id")?, "edges.target_id")?,
    })
}

fn parse_uuid(value: String, column: &str) -> StoreResult<Uuid> {
    Uuid::parse_str(&value)
        .map_err(|_| StoreError::InvalidData(format!("invalid uuid value `{value}` in {column}")))
}

fn parse_time(value: String, column: &str) -> StoreResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(&value)
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|_| StoreError::InvalidData(format!("invalid timestamp `{value}` in {column}")))
}

fn seq_to_db(seq: usize) -> i64 {
    i64::try_from(seq).unwrap_or(i64::MAX)
}
