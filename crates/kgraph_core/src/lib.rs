//! Core of the personal knowledge graph.
//! Typed nodes, labeled edges, pluggable persistence and the agent tool surface.

pub mod config;
pub mod db;
pub mod graph;
pub mod index;
pub mod logging;
pub mod model;
pub mod store;
pub mod tools;

pub use config::{Backend, ConfigError, Settings};
pub use graph::{GraphEngine, GraphError, GraphResult, NodeQuery, RelatedQuery, TextSearch};
pub use index::{HashingEmbedder, InMemoryVectorIndex, SimilarityIndex};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::{
    Direction, Edge, EdgeId, Node, NodeId, NodeProperties, NodeType, PropertyMap,
    ValidationError,
};
pub use store::{migrate, GraphStore, JsonFileStore, SqliteStore, StoreError, StoreResult};
pub use tools::{KnowledgeGraphTools, ToolError, ToolResult, ToolSpec};

/// Minimal health-check API for host integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
