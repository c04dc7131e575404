//! Flat JSON file backend.
//!
//! # Responsibility
//! - Keep each collection as one pretty-printed JSON array on disk.
//!
//! # Invariants
//! - Files live at `<dir>/nodes.json` and `<dir>/edges.json`.
//! - Writes go through a temp file in the same directory and an atomic rename.
//! - Saving an unmodified collection reproduces the file byte for byte.

use super::{Collection, GraphStore, StoreError, StoreResult};
use crate::model::{Edge, Node};
use log::{debug, error};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// JSON-file graph store rooted at one data directory.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    /// Opens (and if needed creates) the data directory and both collection files.
    pub fn open(dir: impl Into<PathBuf>) -> StoreResult<Self> {
        let store = Self { dir: dir.into() };
        fs::create_dir_all(&store.dir).map_err(|source| StoreError::Io {
            path: store.dir.clone(),
            source,
        })?;

        for collection in [Collection::Nodes, Collection::Edges] {
            let path = store.path_for(collection);
            if !path.exists() {
                store.write_collection::<Node>(collection, &[])?;
            }
        }
        Ok(store)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, collection: Collection) -> PathBuf {
        self.dir.join(format!("{}.json", collection.as_str()))
    }

    fn read_collection<T: DeserializeOwned>(&self, collection: Collection) -> StoreResult<Vec<T>> {
        let path = self.path_for(collection);
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => return Err(StoreError::Io { path, source }),
        };
        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }

        let records: Vec<T> = serde_json::from_str(&raw).map_err(|source| {
            error!(
                "event=store_load module=store status=error backend=json collection={collection} error={source}"
            );
            StoreError::Json { collection, source }
        })?;
        debug!(
            "event=store_load module=store status=ok backend=json collection={collection} count={}",
            records.len()
        );
        Ok(records)
    }

    fn write_collection<T: Serialize>(
        &self,
        collection: Collection,
        records: &[T],
    ) -> StoreResult<()> {
        let path = self.path_for(collection);
        let mut encoded = serde_json::to_vec_pretty(records)
            .map_err(|source| StoreError::Json { collection, source })?;
        encoded.push(b'\n');

        let io_err = |source| StoreError::Io {
            path: path.clone(),
            source,
        };
        let mut staged = NamedTempFile::new_in(&self.dir).map_err(io_err)?;
        staged.write_all(&encoded).map_err(io_err)?;
        staged.as_file().sync_all().map_err(io_err)?;
        staged.persist(&path).map_err(|err| StoreError::Io {
            path: path.clone(),
            source: err.error,
        })?;

        debug!(
            "event=store_save module=store status=ok backend=json collection={collection} count={}",
            records.len()
        );
        Ok(())
    }
}

impl GraphStore for JsonFileStore {
    fn describe(&self) -> String {
        format!("json:{}", self.dir.display())
    }

    fn load_nodes(&self) -> StoreResult<Vec<Node>> {
        self.read_collection(Collection::Nodes)
    }

    fn save_nodes(&self, nodes: &[Node]) -> StoreResult<()> {
        self.write_collection(Collection::Nodes, nodes)
    }

    fn load_edges(&self) -> StoreResult<Vec<Edge>> {
        self.read_collection(Collection::Edges)
    }

    fn save_edges(&self, edges: &[Edge]) -> StoreResult<()> {
        self.write_collection(Collection::Edges, edges)
    }
}
