//! Query engine over an explicit store handle.
//!
//! # Responsibility
//! - Validate, apply and persist node/edge mutations.
//! - Answer filter, keyword, traversal and similarity queries.
//! - Keep the optional similarity index in step with node mutations.
//!
//! # Invariants
//! - Node ids are unique across the node collection.
//! - Edges are only created between existing nodes.
//! - Deleting a node deletes every edge touching it.
//! - Similarity index failures are logged, never returned.

use super::query::{NodeQuery, TextSearch};
use super::traversal::{related_node_ids, RelatedQuery};
use crate::index::SimilarityIndex;
use crate::model::edge::normalize_label;
use crate::model::properties::normalize_tags;
use crate::model::{
    Direction, Edge, Node, NodeId, NodeProperties, NodeType, PropertyMap, ValidationError,
};
use crate::store::{GraphStore, StoreError};
use log::{debug, info, warn};
use std::collections::{BTreeSet, HashMap};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type GraphResult<T> = Result<T, GraphError>;

/// Engine-level failure, surfaced to callers unchanged.
#[derive(Debug)]
pub enum GraphError {
    Validation(ValidationError),
    /// No node has this id. Holds the id as the caller gave it.
    NodeNotFound(String),
    EdgeNotFound {
        source_id: String,
        target_id: String,
        label: String,
    },
    Storage(StoreError),
}

impl GraphError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NodeNotFound(_) | Self::EdgeNotFound { .. })
    }
}

impl Display for GraphError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NodeNotFound(id) => write!(f, "node not found: {id}"),
            Self::EdgeNotFound {
                source_id,
                target_id,
                label,
            } => write!(f, "edge not found: {source_id} -[{label}]-> {target_id}"),
            Self::Storage(err) => write!(f, "{err}"),
        }
    }
}

impl Error for GraphError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Storage(err) => Some(err),
            Self::NodeNotFound(_) | Self::EdgeNotFound { .. } => None,
        }
    }
}

impl From<ValidationError> for GraphError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<StoreError> for GraphError {
    fn from(value: StoreError) -> Self {
        Self::Storage(value)
    }
}

/// Knowledge-graph query engine.
pub struct GraphEngine<S: GraphStore> {
    store: S,
    index: Option<Box<dyn SimilarityIndex>>,
}

impl<S: GraphStore> GraphEngine<S> {
    /// Creates an engine without semantic search.
    pub fn new(store: S) -> Self {
        Self { store, index: None }
    }

    /// Creates an engine that mirrors node mutations into `index`.
    pub fn with_index(store: S, index: Box<dyn SimilarityIndex>) -> Self {
        Self {
            store,
            index: Some(index),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn has_index(&self) -> bool {
        self.index.is_some()
    }

    /// Validates `properties` for `kind`, assigns a fresh id and persists the node.
    pub fn create_node(&self, kind: NodeType, properties: PropertyMap) -> GraphResult<Node> {
        let properties = NodeProperties::from_map(kind, properties).inspect_err(|err| {
            warn!("event=node_create module=graph status=error type={kind} error_code=validation error={err}");
        })?;

        let mut nodes = self.store.load_nodes()?;
        let mut node = Node::new(properties);
        while nodes.iter().any(|existing| existing.id == node.id) {
            node.id = Uuid::new_v4();
        }
        nodes.push(node.clone());
        self.store.save_nodes(&nodes)?;

        info!(
            "event=node_create module=graph status=ok type={kind} id={}",
            node.id
        );
        self.index_upsert(&node);
        Ok(node)
    }

    /// Returns one node by id.
    pub fn get_node(&self, id: NodeId) -> GraphResult<Node> {
        self.store
            .load_nodes()?
            .into_iter()
            .find(|node| node.id == id)
            .ok_or_else(|| GraphError::NodeNotFound(id.to_string()))
    }

    /// Returns all nodes matching `query`, in store order.
    pub fn get_nodes(&self, query: &NodeQuery) -> GraphResult<Vec<Node>> {
        let nodes = self.store.load_nodes()?;
        Ok(nodes.into_iter().filter(|node| query.matches(node)).collect())
    }

    /// Returns the nodes whose id is listed, in store order. Unknown ids are skipped.
    pub fn get_nodes_by_ids(&self, ids: &[NodeId]) -> GraphResult<Vec<Node>> {
        let nodes = self.store.load_nodes()?;
        Ok(nodes
            .into_iter()
            .filter(|node| ids.contains(&node.id))
            .collect())
    }

    /// Merges `patch` into the node's properties and re-validates the result.
    ///
    /// Keys absent from `patch` are left untouched.
    pub fn update_node(&self, id: NodeId, patch: PropertyMap) -> GraphResult<Node> {
        self.apply_update(id, None, patch)
    }

    /// Like [`update_node`](Self::update_node), but fails when the node is not of `kind`.
    pub fn update_node_as(
        &self,
        kind: NodeType,
        id: NodeId,
        patch: PropertyMap,
    ) -> GraphResult<Node> {
        self.apply_update(id, Some(kind), patch)
    }

    fn apply_update(
        &self,
        id: NodeId,
        expected: Option<NodeType>,
        patch: PropertyMap,
    ) -> GraphResult<Node> {
        let mut nodes = self.store.load_nodes()?;
        let node = nodes
            .iter_mut()
            .find(|node| node.id == id)
            .ok_or_else(|| GraphError::NodeNotFound(id.to_string()))?;

        if let Some(expected) = expected {
            if node.kind() != expected {
                return Err(ValidationError::TypeMismatch {
                    id,
                    expected,
                    actual: node.kind(),
                }
                .into());
            }
        }

        let keys = patch.keys().cloned().collect::<Vec<_>>().join(",");
        let merged = node.properties.merged(patch).inspect_err(|err| {
            warn!("event=node_update module=graph status=error id={id} error_code=validation error={err}");
        })?;
        node.replace_properties(merged);
        let updated = node.clone();
        self.store.save_nodes(&nodes)?;

        info!("event=node_update module=graph status=ok id={id} keys={keys}");
        self.index_upsert(&updated);
        Ok(updated)
    }

    /// Removes a node and every edge touching it.
    ///
    /// Returns `false` when no node has that id.
    pub fn delete_node(&self, id: NodeId) -> GraphResult<bool> {
        let mut nodes = self.store.load_nodes()?;
        let before = nodes.len();
        nodes.retain(|node| node.id != id);
        if nodes.len() == before {
            return Ok(false);
        }

        // Edges first, so a failed node save never leaves edges dangling.
        let mut edges = self.store.load_edges()?;
        let edge_count = edges.len();
        edges.retain(|edge| !edge.touches(id));
        let removed_edges = edge_count - edges.len();
        if removed_edges > 0 {
            self.store.save_edges(&edges)?;
        }
        self.store.save_nodes(&nodes)?;

        info!("event=node_delete module=graph status=ok id={id} removed_edges={removed_edges}");
        if let Some(index) = &self.index {
            if let Err(err) = index.remove(id) {
                warn!("event=index_remove module=graph status=error id={id} error={err}");
            }
        }
        Ok(true)
    }

    /// Creates a directed edge between two existing nodes.
    ///
    /// Identical (source, label, target) triples are not deduplicated.
    pub fn create_edge(&self, source_id: NodeId, label: &str, target_id: NodeId) -> GraphResult<Edge> {
        let edge = Edge::new(source_id, label, target_id)?;

        let nodes = self.store.load_nodes()?;
        for endpoint in [source_id, target_id] {
            if !nodes.iter().any(|node| node.id == endpoint) {
                warn!("event=edge_create module=graph status=error error_code=not_found id={endpoint}");
                return Err(GraphError::NodeNotFound(endpoint.to_string()));
            }
        }

        let mut edges = self.store.load_edges()?;
        edges.push(edge.clone());
        self.store.save_edges(&edges)?;

        info!(
            "event=edge_create module=graph status=ok id={} label={}",
            edge.id, edge.label
        );
        Ok(edge)
    }

    /// Relabels the first edge matching `(source_id, old_label, target_id)`.
    ///
    /// `old_label` is trimmed before matching, like labels at creation.
    pub fn edit_edge(
        &self,
        source_id: NodeId,
        target_id: NodeId,
        old_label: &str,
        new_label: &str,
    ) -> GraphResult<Edge> {
        let new_label = normalize_label(new_label)?;
        let old_label = old_label.trim();
        let mut edges = self.store.load_edges()?;
        let edge = edges
            .iter_mut()
            .find(|edge| {
                edge.source_id == source_id && edge.target_id == target_id && edge.label == old_label
            })
            .ok_or_else(|| GraphError::EdgeNotFound {
                source_id: source_id.to_string(),
                target_id: target_id.to_string(),
                label: old_label.to_string(),
            })?;

        edge.label = new_label;
        let updated = edge.clone();
        self.store.save_edges(&edges)?;

        info!(
            "event=edge_update module=graph status=ok id={} label={}",
            updated.id, updated.label
        );
        Ok(updated)
    }

    /// Removes every edge matching `(source_id, label, target_id)`.
    ///
    /// `label` is trimmed before matching. Returns `false` when nothing matched.
    pub fn delete_edge(&self, source_id: NodeId, target_id: NodeId, label: &str) -> GraphResult<bool> {
        let label = label.trim();
        let mut edges = self.store.load_edges()?;
        let before = edges.len();
        edges.retain(|edge| {
            !(edge.source_id == source_id && edge.target_id == target_id && edge.label == label)
        });
        let removed = before - edges.len();
        if removed == 0 {
            return Ok(false);
        }
        self.store.save_edges(&edges)?;

        info!("event=edge_delete module=graph status=ok label={label} removed={removed}");
        Ok(true)
    }

    /// Returns edges touching `node_id` in the given direction, in store order.
    pub fn get_node_edges(&self, node_id: NodeId, direction: Direction) -> GraphResult<Vec<Edge>> {
        let edges = self.store.load_edges()?;
        Ok(edges
            .into_iter()
            .filter(|edge| direction.matches(edge, node_id))
            .collect())
    }

    /// Resolves the nodes reachable from `query.node_id`.
    ///
    /// The default query follows outgoing edges one hop and returns targets in
    /// edge-insertion order. A start node without matching edges yields an empty
    /// list; an unknown start node is `NodeNotFound`. Edges whose far end no
    /// longer resolves are skipped.
    pub fn get_related_nodes(&self, query: &RelatedQuery) -> GraphResult<Vec<Node>> {
        let nodes = self.store.load_nodes()?;
        if !nodes.iter().any(|node| node.id == query.node_id) {
            return Err(GraphError::NodeNotFound(query.node_id.to_string()));
        }
        let edges = self.store.load_edges()?;

        let ids = related_node_ids(&edges, query);
        let mut by_id: HashMap<NodeId, Node> =
            nodes.into_iter().map(|node| (node.id, node)).collect();
        let related: Vec<Node> = ids.iter().filter_map(|id| by_id.remove(id)).collect();

        debug!(
            "event=related_nodes module=graph status=ok id={} depth={} found={}",
            query.node_id,
            query.depth,
            related.len()
        );
        Ok(related)
    }

    /// Keyword search over node text fields with type and tag filters.
    pub fn search_nodes(&self, search: &TextSearch) -> GraphResult<Vec<Node>> {
        let nodes = self.store.load_nodes()?;
        Ok(nodes.into_iter().filter(|node| search.matches(node)).collect())
    }

    /// Returns every distinct tag, sorted.
    pub fn get_all_tags(&self) -> GraphResult<Vec<String>> {
        let nodes = self.store.load_nodes()?;
        let tags: BTreeSet<String> = nodes
            .iter()
            .flat_map(|node| node.tags().iter().cloned())
            .collect();
        Ok(tags.into_iter().collect())
    }

    /// Renames `old_tag` to `new_tag` on every node carrying it.
    ///
    /// A node that already has `new_tag` keeps a single copy. Returns the changed nodes.
    pub fn rename_tag(&self, old_tag: &str, new_tag: &str) -> GraphResult<Vec<Node>> {
        let new_tag = normalize_tags(&[new_tag.to_string()])?
            .into_iter()
            .next()
            .ok_or(ValidationError::BlankTag)?;

        let mut nodes = self.store.load_nodes()?;
        let mut changed = Vec::new();
        for node in nodes.iter_mut().filter(|node| node.has_tag(old_tag)) {
            let mut properties = node.properties.clone();
            let renamed: Vec<String> = properties
                .tags()
                .iter()
                .map(|tag| if tag == old_tag { new_tag.clone() } else { tag.clone() })
                .collect();
            *properties.tags_mut() = normalize_tags(&renamed)?;
            node.replace_properties(properties);
            changed.push(node.clone());
        }

        if changed.is_empty() {
            return Ok(changed);
        }
        self.store.save_nodes(&nodes)?;

        info!(
            "event=tag_rename module=graph status=ok old={old_tag} new={new_tag} nodes={}",
            changed.len()
        );
        for node in &changed {
            self.index_upsert(node);
        }
        Ok(changed)
    }

    /// Returns nodes most similar to `text`, best first.
    ///
    /// Without an index, or when the index fails, the result is empty.
    pub fn semantic_search(
        &self,
        text: &str,
        kind: Option<NodeType>,
        limit: usize,
    ) -> GraphResult<Vec<Node>> {
        let Some(index) = &self.index else {
            warn!("event=semantic_search module=graph status=skipped reason=no_index");
            return Ok(Vec::new());
        };
        let hits = match index.query(text, kind, limit) {
            Ok(hits) => hits,
            Err(err) => {
                warn!("event=semantic_search module=graph status=error error={err}");
                return Ok(Vec::new());
            }
        };

        let mut by_id: HashMap<NodeId, Node> = self
            .store
            .load_nodes()?
            .into_iter()
            .map(|node| (node.id, node))
            .collect();
        let ordered: Vec<Node> = hits
            .iter()
            .filter_map(|hit| by_id.remove(&hit.node_id))
            .collect();

        debug!(
            "event=semantic_search module=graph status=ok hits={} resolved={}",
            hits.len(),
            ordered.len()
        );
        Ok(ordered)
    }

    /// Rebuilds the similarity index from every stored node.
    ///
    /// Returns the number of nodes indexed.
    pub fn reindex(&self) -> GraphResult<usize> {
        let Some(index) = &self.index else {
            return Ok(0);
        };
        let nodes = self.store.load_nodes()?;
        if let Err(err) = index.clear() {
            warn!("event=index_rebuild module=graph status=error error={err}");
            return Ok(0);
        }

        let mut indexed = 0;
        for node in &nodes {
            match index.upsert(node) {
                Ok(()) => indexed += 1,
                Err(err) => {
                    warn!("event=index_upsert module=graph status=error id={} error={err}", node.id)
                }
            }
        }
        info!(
            "event=index_rebuild module=graph status=ok nodes={} indexed={indexed}",
            nodes.len()
        );
        Ok(indexed)
    }

    fn index_upsert(&self, node: &Node) {
        if let Some(index) = &self.index {
            if let Err(err) = index.upsert(node) {
                warn!(
                    "event=index_upsert module=graph status=error id={} error={err}",
                    node.id
                );
            }
        }
    }
}
