//! Relationship, search and maintenance tools.
//!
//! Ids that are not UUIDs match nothing: lookups return empty or `false`,
//! and tools that need the node report it as not found.

use super::args::{
    CreateEdge, DeleteEdge, DeleteNode, EditEdge, GetAllTags, GetNodeEdges, GetRelatedNodes,
    RenameTag, SearchNodes, SemanticSearch,
};
use super::{existing_node_id, parse_node_id, KnowledgeGraphTools, ToolResult};
use crate::graph::{GraphError, RelatedQuery, TextSearch};
use crate::model::edge::normalize_label;
use crate::model::{Direction, Edge, Node};
use crate::store::GraphStore;

impl<S: GraphStore> KnowledgeGraphTools<S> {
    pub fn create_edge(&self, args: CreateEdge) -> ToolResult<Edge> {
        normalize_label(&args.label).map_err(GraphError::from)?;
        let source_id = existing_node_id(&args.source_id)?;
        let target_id = existing_node_id(&args.target_id)?;
        Ok(self.engine.create_edge(source_id, &args.label, target_id)?)
    }

    pub fn edit_edge(&self, args: EditEdge) -> ToolResult<Edge> {
        normalize_label(&args.new_label).map_err(GraphError::from)?;
        let (Some(source_id), Some(target_id)) =
            (parse_node_id(&args.source_id), parse_node_id(&args.target_id))
        else {
            return Err(GraphError::EdgeNotFound {
                source_id: args.source_id,
                target_id: args.target_id,
                label: args.old_label.trim().to_string(),
            }
            .into());
        };
        Ok(self
            .engine
            .edit_edge(source_id, target_id, &args.old_label, &args.new_label)?)
    }

    pub fn delete_edge(&self, args: DeleteEdge) -> ToolResult<bool> {
        let (Some(source_id), Some(target_id)) =
            (parse_node_id(&args.source_id), parse_node_id(&args.target_id))
        else {
            return Ok(false);
        };
        Ok(self.engine.delete_edge(source_id, target_id, &args.label)?)
    }

    pub fn get_node_edges(&self, args: GetNodeEdges) -> ToolResult<Vec<Edge>> {
        let Some(node_id) = parse_node_id(&args.node_id) else {
            return Ok(Vec::new());
        };
        let direction = args.direction.unwrap_or(Direction::Both);
        Ok(self.engine.get_node_edges(node_id, direction)?)
    }

    pub fn get_related_nodes(&self, args: GetRelatedNodes) -> ToolResult<Vec<Node>> {
        let mut query = RelatedQuery::new(existing_node_id(&args.node_id)?);
        if let Some(label) = args.label {
            query = query.label(label);
        }
        if let Some(direction) = args.direction {
            query = query.direction(direction);
        }
        if let Some(depth) = args.depth {
            query = query.depth(depth);
        }
        Ok(self.engine.get_related_nodes(&query)?)
    }

    pub fn delete_node(&self, args: DeleteNode) -> ToolResult<bool> {
        let Some(node_id) = parse_node_id(&args.node_id) else {
            return Ok(false);
        };
        Ok(self.engine.delete_node(node_id)?)
    }

    pub fn search_nodes(&self, args: SearchNodes) -> ToolResult<Vec<Node>> {
        let search = TextSearch {
            text: args.query,
            kind: args.node_type,
            tags: args.tags.unwrap_or_default(),
        };
        Ok(self.engine.search_nodes(&search)?)
    }

    pub fn get_all_tags(&self, _args: GetAllTags) -> ToolResult<Vec<String>> {
        Ok(self.engine.get_all_tags()?)
    }

    pub fn rename_tag(&self, args: RenameTag) -> ToolResult<Vec<Node>> {
        Ok(self.engine.rename_tag(&args.old_tag, &args.new_tag)?)
    }

    pub fn semantic_search(&self, args: SemanticSearch) -> ToolResult<Vec<Node>> {
        let limit = args.limit.unwrap_or(self.search_limit);
        Ok(self
            .engine
            .semantic_search(&args.query, args.node_type, limit)?)
    }
}
