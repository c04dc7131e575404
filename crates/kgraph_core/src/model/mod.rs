//! Knowledge-graph domain model.
//!
//! # Responsibility
//! - Define the canonical node/edge records shared by storage, query and tools.
//! - Own per-type property validation so every write path admits the same shapes.
//!
//! # Invariants
//! - Every node and edge is identified by a stable, never reused UUID.
//! - A node's type is carried by its property variant and cannot change.

pub mod edge;
pub mod node;
pub mod properties;
pub mod time;

use std::error::Error;
use std::fmt::{Display, Formatter};

pub use edge::{Direction, Edge, EdgeId};
pub use node::{Node, NodeId, NodeType};
pub use properties::{
    NodeProperties, NoteProperties, PersonProperties, ProjectProperties, ProjectStatus,
    PropertyMap, TaskProperties, TaskStatus,
};

/// Rejection reasons for node and edge shapes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Property mapping does not decode into the type's record
    /// (missing required key, unknown key, wrong value shape).
    InvalidShape { kind: NodeType, message: String },
    /// Required text property is empty after trim.
    BlankField {
        kind: NodeType,
        field: &'static str,
    },
    /// Tag list contains an empty value.
    BlankTag,
    /// Edge label is empty after trim.
    BlankLabel,
    /// Node exists but belongs to another type than the caller pinned.
    TypeMismatch {
        id: NodeId,
        expected: NodeType,
        actual: NodeType,
    },
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidShape { kind, message } => {
                write!(f, "invalid {kind} properties: {message}")
            }
            Self::BlankField { kind, field } => {
                write!(f, "{kind} property `{field}` must not be blank")
            }
            Self::BlankTag => write!(f, "tags must not be blank"),
            Self::BlankLabel => write!(f, "edge label must not be blank"),
            Self::TypeMismatch {
                id,
                expected,
                actual,
            } => write!(f, "node {id} is a {actual}, not a {expected}"),
        }
    }
}

impl Error for ValidationError {}
