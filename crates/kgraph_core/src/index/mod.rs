//! Similarity index seam for semantic node search.
//!
//! # Responsibility
//! - Define the contract the query engine uses to keep an embedding index in sync.
//! - Derive the text a node is embedded from.
//!
//! # Invariants
//! - The index stores node ids and types only; the graph store stays authoritative.
//! - Index failures never roll back graph mutations.

pub mod embed;
pub mod memory;

use crate::model::{Node, NodeId, NodeType};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub use embed::{Embedder, HashingEmbedder};
pub use memory::InMemoryVectorIndex;

pub type IndexResult<T> = Result<T, IndexError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexError {
    /// Embedding produced a vector of unexpected size.
    DimensionMismatch { expected: usize, actual: usize },
    /// Internal lock was poisoned by a panicking writer.
    Poisoned,
    /// Failure inside an index implementation living outside this crate.
    Backend(String),
}

impl Display for IndexError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DimensionMismatch { expected, actual } => write!(
                f,
                "embedding dimension mismatch: expected {expected}, got {actual}"
            ),
            Self::Poisoned => write!(f, "similarity index lock poisoned"),
            Self::Backend(message) => write!(f, "similarity index failure: {message}"),
        }
    }
}

impl Error for IndexError {}

/// One similarity hit, higher score means closer.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexHit {
    pub node_id: NodeId,
    pub score: f32,
}

/// Embedding-backed nearest-neighbour lookup over nodes.
pub trait SimilarityIndex {
    /// Inserts or replaces the entry for `node`.
    fn upsert(&self, node: &Node) -> IndexResult<()>;
    /// Removes the entry for `node_id`; absent ids are not an error.
    fn remove(&self, node_id: NodeId) -> IndexResult<()>;
    /// Drops every entry.
    fn clear(&self) -> IndexResult<()>;
    /// Returns up to `limit` hits ordered by descending score.
    fn query(&self, text: &str, kind: Option<NodeType>, limit: usize)
        -> IndexResult<Vec<IndexHit>>;
}

/// Builds the text a node is embedded from.
///
/// Shape: `Type: Note. Title: .... Content: ...`, listing only the fields the
/// node type has.
pub fn embedding_text(node: &Node) -> String {
    let mut parts = vec![format!("Type: {}", node.kind())];
    for (label, value) in node.properties.text_fields() {
        parts.push(format!("{label}: {value}"));
    }
    parts.join(". ")
}
