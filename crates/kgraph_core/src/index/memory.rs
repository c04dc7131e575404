//! Brute-force in-memory vector index.
//!
//! # Invariants
//! - Entries keep first-insertion order; upsert of an existing id keeps its slot.
//! - Scores are cosine similarities; non-positive scores are not returned.
//! - Equal scores keep insertion order.

use super::embed::Embedder;
use super::{embedding_text, IndexError, IndexHit, IndexResult, SimilarityIndex};
use crate::model::{Node, NodeId, NodeType};
use std::sync::RwLock;

struct Entry {
    node_id: NodeId,
    kind: NodeType,
    vector: Vec<f32>,
}

/// Linear-scan similarity index over an [`Embedder`].
pub struct InMemoryVectorIndex<E: Embedder> {
    embedder: E,
    entries: RwLock<Vec<Entry>>,
}

impl<E: Embedder> InMemoryVectorIndex<E> {
    pub fn new(embedder: E) -> Self {
        Self {
            embedder,
            entries: RwLock::new(Vec::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn embed_checked(&self, text: &str) -> IndexResult<Vec<f32>> {
        let vector = self.embedder.embed(text);
        let expected = self.embedder.dimensions();
        if vector.len() != expected {
            return Err(IndexError::DimensionMismatch {
                expected,
                actual: vector.len(),
            });
        }
        Ok(vector)
    }
}

impl<E: Embedder> SimilarityIndex for InMemoryVectorIndex<E> {
    fn upsert(&self, node: &Node) -> IndexResult<()> {
        let vector = self.embed_checked(&embedding_text(node))?;
        let mut entries = self.entries.write().map_err(|_| IndexError::Poisoned)?;
        let entry = Entry {
            node_id: node.id,
            kind: node.kind(),
            vector,
        };
        match entries.iter_mut().find(|current| current.node_id == node.id) {
            Some(current) => *current = entry,
            None => entries.push(entry),
        }
        Ok(())
    }

    fn remove(&self, node_id: NodeId) -> IndexResult<()> {
        let mut entries = self.entries.write().map_err(|_| IndexError::Poisoned)?;
        entries.retain(|entry| entry.node_id != node_id);
        Ok(())
    }

    fn clear(&self) -> IndexResult<()> {
        self.entries
            .write()
            .map_err(|_| IndexError::Poisoned)?
            .clear();
        Ok(())
    }

    fn query(
        &self,
        text: &str,
        kind: Option<NodeType>,
        limit: usize,
    ) -> IndexResult<Vec<IndexHit>> {
        let query_vector = self.embed_checked(text)?;
        let entries = self.entries.read().map_err(|_| IndexError::Poisoned)?;

        let mut hits: Vec<IndexHit> = entries
            .iter()
            .filter(|entry| kind.map_or(true, |wanted| entry.kind == wanted))
            .map(|entry| IndexHit {
                node_id: entry.node_id,
                score: cosine_similarity(&query_vector, &entry.vector),
            })
            .filter(|hit| hit.score > 0.0)
            .collect();
        // Stable sort keeps insertion order among equal scores.
        hits.sort_by(|a, b| b.score.total_cmp(&a.score));
        hits.truncate(limit);
        Ok(hits)
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}
