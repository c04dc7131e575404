//! Graph query engine.
//!
//! # Responsibility
//! - Apply create/update/delete mutations to a fresh snapshot of the store.
//! - Filter nodes by type, property values and tags; traverse labeled edges.
//!
//! # Invariants
//! - Every call loads the collections it needs from the store; nothing is cached
//!   across calls.
//! - A mutation persists the whole affected collection before returning.
//! - Query results keep store order unless a relevance order is documented.

pub mod engine;
pub mod query;
pub mod traversal;

pub use engine::{GraphEngine, GraphError, GraphResult};
pub use query::{NodeQuery, TextSearch};
pub use traversal::RelatedQuery;
