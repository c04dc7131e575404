//! Directed, labeled relationship between two nodes.

use super::node::NodeId;
use super::ValidationError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type EdgeId = Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub id: EdgeId,
    pub source_id: NodeId,
    /// Relationship name, e.g. `part_of` or `mentions`.
    pub label: String,
    pub target_id: NodeId,
}

impl Edge {
    /// Creates an edge with a fresh id.
    ///
    /// The label is trimmed; a blank label is rejected. Endpoint existence is
    /// checked by the query engine, not here.
    pub fn new(
        source_id: NodeId,
        label: impl AsRef<str>,
        target_id: NodeId,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            id: Uuid::new_v4(),
            source_id,
            label: normalize_label(label.as_ref())?,
            target_id,
        })
    }

    pub fn touches(&self, node_id: NodeId) -> bool {
        self.source_id == node_id || self.target_id == node_id
    }

    /// Returns the node on the far side of `node_id` when followed in `direction`.
    pub fn neighbor(&self, node_id: NodeId, direction: Direction) -> Option<NodeId> {
        let outgoing = self.source_id == node_id;
        let incoming = self.target_id == node_id;
        match direction {
            Direction::Outgoing if outgoing => Some(self.target_id),
            Direction::Incoming if incoming => Some(self.source_id),
            Direction::Both if outgoing => Some(self.target_id),
            Direction::Both if incoming => Some(self.source_id),
            _ => None,
        }
    }
}

/// Which edges of a node to follow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Edges where the node is the source.
    Outgoing,
    /// Edges where the node is the target.
    Incoming,
    Both,
}

impl Direction {
    pub fn matches(self, edge: &Edge, node_id: NodeId) -> bool {
        edge.neighbor(node_id, self).is_some()
    }
}

pub fn normalize_label(label: &str) -> Result<String, ValidationError> {
    let trimmed = label.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::BlankLabel);
    }
    Ok(trimmed.to_string())
}
