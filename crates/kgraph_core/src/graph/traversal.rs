//! Breadth-first relationship traversal.

use crate::model::{Direction, Edge, NodeId};
use std::collections::HashSet;

/// Parameters for `get_related_nodes`.
///
/// `RelatedQuery::new(id)` follows outgoing edges one hop, which is the
/// default traversal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelatedQuery {
    pub node_id: NodeId,
    /// When set, only edges with this label are followed. Surrounding
    /// whitespace is ignored, as it is when edges are created.
    pub label: Option<String>,
    pub direction: Direction,
    /// Number of hops; values below 1 are treated as 1.
    pub depth: u32,
}

impl RelatedQuery {
    pub fn new(node_id: NodeId) -> Self {
        Self {
            node_id,
            label: None,
            direction: Direction::Outgoing,
            depth: 1,
        }
    }

    pub fn label(mut self, label: impl AsRef<str>) -> Self {
        self.label = Some(label.as_ref().trim().to_string());
        self
    }

    pub fn direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    pub fn depth(mut self, depth: u32) -> Self {
        self.depth = depth;
        self
    }
}

/// Returns reachable node ids in discovery order.
///
/// Within one hop, discovery order is edge-insertion order. Each node is
/// reported once and the start node is never reported.
pub fn related_node_ids(edges: &[Edge], query: &RelatedQuery) -> Vec<NodeId> {
    let mut visited = HashSet::from([query.node_id]);
    let mut frontier = vec![query.node_id];
    let mut discovered = Vec::new();

    for _ in 0..query.depth.max(1) {
        let mut next = Vec::new();
        for current in &frontier {
            for edge in edges {
                if query
                    .label
                    .as_deref()
                    .is_some_and(|label| edge.label != label.trim())
                {
                    continue;
                }
                if let Some(neighbor) = edge.neighbor(*current, query.direction) {
                    if visited.insert(neighbor) {
                        discovered.push(neighbor);
                        next.push(neighbor);
                    }
                }
            }
        }
        if next.is_empty() {
            break;
        }
        frontier = next;
    }

    discovered
}
