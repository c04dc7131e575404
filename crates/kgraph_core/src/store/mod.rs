//! Persistence store contracts and backends.
//!
//! # Responsibility
//! - Load and save the two graph collections (`nodes`, `edges`) as whole units.
//! - Isolate file and SQLite details from the query engine.
//!
//! # Invariants
//! - `save_*` replaces the entire collection; readers never observe a partial write.
//! - A missing collection loads as empty and is created on first open.
//! - Load paths reject records that fail validation instead of skipping them.
//! - Load order equals the order of the last save.

use crate::db::DbError;
use crate::model::{Edge, Node};
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub mod json;
pub mod sqlite;

pub use json::JsonFileStore;
pub use sqlite::SqliteStore;

pub type StoreResult<T> = Result<T, StoreError>;

/// The two logical record collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Nodes,
    Edges,
}

impl Collection {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Nodes => "nodes",
            Self::Edges => "edges",
        }
    }
}

impl Display for Collection {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Backing medium is unreadable, unwritable or holds corrupt data.
#[derive(Debug)]
pub enum StoreError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Json {
        collection: Collection,
        source: serde_json::Error,
    },
    Db(DbError),
    InvalidData(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "i/o error on `{}`: {source}", path.display()),
            Self::Json { collection, source } => {
                write!(f, "malformed {collection} collection: {source}")
            }
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted graph data: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Json { source, .. } => Some(source),
            Self::Db(err) => Some(err),
            Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Whole-collection persistence contract.
///
/// Implementations assume a single writer. Two processes running
/// read-modify-write cycles against the same backing medium can lose updates.
pub trait GraphStore {
    /// Short backend description for logs, e.g. `json:/data`.
    fn describe(&self) -> String;
    fn load_nodes(&self) -> StoreResult<Vec<Node>>;
    fn save_nodes(&self, nodes: &[Node]) -> StoreResult<()>;
    fn load_edges(&self) -> StoreResult<Vec<Edge>>;
    fn save_edges(&self, edges: &[Edge]) -> StoreResult<()>;
}

impl<S: GraphStore + ?Sized> GraphStore for Box<S> {
    fn describe(&self) -> String {
        (**self).describe()
    }

    fn load_nodes(&self) -> StoreResult<Vec<Node>> {
        (**self).load_nodes()
    }

    fn save_nodes(&self, nodes: &[Node]) -> StoreResult<()> {
        (**self).save_nodes(nodes)
    }

    fn load_edges(&self) -> StoreResult<Vec<Edge>> {
        (**self).load_edges()
    }

    fn save_edges(&self, edges: &[Edge]) -> StoreResult<()> {
        (**self).save_edges(edges)
    }
}

/// Counts of records copied by [`migrate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MigrationReport {
    pub nodes: usize,
    pub edges: usize,
}

/// Copies both collections from `from` into `to`, replacing whatever `to` held.
pub fn migrate(from: &dyn GraphStore, to: &dyn GraphStore) -> StoreResult<MigrationReport> {
    info!(
        "event=store_migrate module=store status=start from={} to={}",
        from.describe(),
        to.describe()
    );
    let nodes = from.load_nodes()?;
    let edges = from.load_edges()?;
    to.save_nodes(&nodes)?;
    to.save_edges(&edges)?;

    let report = MigrationReport {
        nodes: nodes.len(),
        edges: edges.len(),
    };
    info!(
        "event=store_migrate module=store status=ok nodes={} edges={}",
        report.nodes, report.edges
    );
    Ok(report)
}
