//! Agent-facing tool façade.
//!
//! # Responsibility
//! - Expose each graph operation as a named tool with typed arguments.
//! - Pin the node type for per-type tools and forward to the query engine.
//! - Dispatch dynamic `(name, json args)` calls for host transports.
//!
//! # Invariants
//! - Tools hold no state besides the engine; every call is independent.
//! - Engine failures pass through unchanged as `ToolError::Graph`.
//! - No tool asks for confirmation before mutating the graph.

pub mod args;
pub mod catalog;
mod nodes;
mod relations;

use crate::graph::{GraphEngine, GraphError};
use crate::model::{NodeId, PropertyMap};
use crate::store::GraphStore;
use log::{debug, info, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub use catalog::ToolSpec;

/// Result limit for `semantic_search` when the caller gives none.
pub const DEFAULT_SEARCH_LIMIT: usize = 10;

pub type ToolResult<T> = Result<T, ToolError>;

#[derive(Debug)]
pub enum ToolError {
    UnknownTool(String),
    InvalidArguments { tool: String, message: String },
    /// An update call named no field to change.
    EmptyUpdate { tool: &'static str },
    Graph(GraphError),
    Encode(serde_json::Error),
}

impl ToolError {
    /// Stable machine-readable code for transports and logs.
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnknownTool(_) => "unknown_tool",
            Self::InvalidArguments { .. } => "invalid_arguments",
            Self::EmptyUpdate { .. } => "empty_update",
            Self::Graph(GraphError::Validation(_)) => "validation",
            Self::Graph(err) if err.is_not_found() => "not_found",
            Self::Graph(_) => "storage",
            Self::Encode(_) => "encode",
        }
    }
}

impl Display for ToolError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownTool(name) => write!(f, "unknown tool `{name}`"),
            Self::InvalidArguments { tool, message } => {
                write!(f, "invalid arguments for `{tool}`: {message}")
            }
            Self::EmptyUpdate { tool } => write!(f, "`{tool}` needs at least one field to change"),
            Self::Graph(err) => write!(f, "{err}"),
            Self::Encode(err) => write!(f, "failed to encode tool result: {err}"),
        }
    }
}

impl Error for ToolError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Graph(err) => Some(err),
            Self::Encode(err) => Some(err),
            Self::UnknownTool(_) | Self::InvalidArguments { .. } | Self::EmptyUpdate { .. } => None,
        }
    }
}

impl From<GraphError> for ToolError {
    fn from(value: GraphError) -> Self {
        Self::Graph(value)
    }
}

/// Tool surface over one graph engine.
pub struct KnowledgeGraphTools<S: GraphStore> {
    engine: GraphEngine<S>,
    search_limit: usize,
}

impl<S: GraphStore> KnowledgeGraphTools<S> {
    pub fn new(engine: GraphEngine<S>) -> Self {
        Self {
            engine,
            search_limit: DEFAULT_SEARCH_LIMIT,
        }
    }

    /// Overrides the default `semantic_search` limit. Zero is raised to one.
    pub fn with_search_limit(mut self, limit: usize) -> Self {
        self.search_limit = limit.max(1);
        self
    }

    pub fn engine(&self) -> &GraphEngine<S> {
        &self.engine
    }

    pub fn catalog(&self) -> &'static [ToolSpec] {
        catalog::TOOLS
    }

    /// Invokes tool `name` with a JSON argument object and returns its JSON result.
    ///
    /// `null` arguments are treated as `{}`.
    pub fn call(&self, name: &str, args: Value) -> ToolResult<Value> {
        let args = match args {
            Value::Null => Value::Object(PropertyMap::new()),
            other => other,
        };

        debug!("event=tool_call module=tools status=start tool={name}");
        let result = self.dispatch(name, args);
        match &result {
            Ok(_) => info!("event=tool_call module=tools status=ok tool={name}"),
            Err(err) => warn!(
                "event=tool_call module=tools status=error tool={name} error_code={} error={err}",
                err.code()
            ),
        }
        result
    }

    fn dispatch(&self, name: &str, args: Value) -> ToolResult<Value> {
        match name {
            "create_task" => encode(self.create_task(decode(name, args)?)?),
            "get_tasks" => encode(self.get_tasks(decode(name, args)?)?),
            "update_task" => encode(self.update_task(decode(name, args)?)?),
            "create_note" => encode(self.create_note(decode(name, args)?)?),
            "get_notes" => encode(self.get_notes(decode(name, args)?)?),
            "update_note" => encode(self.update_note(decode(name, args)?)?),
            "create_person" => encode(self.create_person(decode(name, args)?)?),
            "get_persons" => encode(self.get_persons(decode(name, args)?)?),
            "update_person" => encode(self.update_person(decode(name, args)?)?),
            "create_project" => encode(self.create_project(decode(name, args)?)?),
            "get_projects" => encode(self.get_projects(decode(name, args)?)?),
            "update_project" => encode(self.update_project(decode(name, args)?)?),
            "create_edge" => encode(self.create_edge(decode(name, args)?)?),
            "edit_edge" => encode(self.edit_edge(decode(name, args)?)?),
            "delete_edge" => Ok(json!({ "deleted": self.delete_edge(decode(name, args)?)? })),
            "get_node_edges" => encode(self.get_node_edges(decode(name, args)?)?),
            "get_related_nodes" => encode(self.get_related_nodes(decode(name, args)?)?),
            "delete_node" => Ok(json!({ "deleted": self.delete_node(decode(name, args)?)? })),
            "search_nodes" => encode(self.search_nodes(decode(name, args)?)?),
            "get_all_tags" => encode(self.get_all_tags(decode(name, args)?)?),
            "rename_tag" => encode(self.rename_tag(decode(name, args)?)?),
            "semantic_search" => encode(self.semantic_search(decode(name, args)?)?),
            _ => Err(ToolError::UnknownTool(name.to_string())),
        }
    }
}

fn decode<T: DeserializeOwned>(tool: &str, args: Value) -> ToolResult<T> {
    serde_json::from_value(args).map_err(|err| ToolError::InvalidArguments {
        tool: tool.to_string(),
        message: err.to_string(),
    })
}

fn encode<T: Serialize>(value: T) -> ToolResult<Value> {
    serde_json::to_value(value).map_err(ToolError::Encode)
}

/// Reads a caller-supplied node id. Text that is not a UUID names no stored node.
fn parse_node_id(raw: &str) -> Option<NodeId> {
    Uuid::parse_str(raw).ok()
}

/// Like [`parse_node_id`], for tools where an unknown node is an error.
fn existing_node_id(raw: &str) -> ToolResult<NodeId> {
    parse_node_id(raw).ok_or_else(|| GraphError::NodeNotFound(raw.to_string()).into())
}

/// Encodes an argument record as the property patch it carries.
fn patch_of<T: Serialize>(tool: &'static str, args: &T) -> ToolResult<PropertyMap> {
    match serde_json::to_value(args).map_err(ToolError::Encode)? {
        Value::Object(map) => Ok(map),
        _ => Err(ToolError::InvalidArguments {
            tool: tool.to_string(),
            message: "arguments must be a JSON object".to_string(),
        }),
    }
}
