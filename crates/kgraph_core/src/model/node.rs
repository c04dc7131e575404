//! Node envelope record.
//!
//! # Responsibility
//! - Pair validated properties with identity and lifecycle timestamps.
//! - Define the `{id, type, properties, created_at, modified_at}` wire shape.
//!
//! # Invariants
//! - `id` is globally unique across all node types.
//! - `type` is derived from the property variant and never changes.
//! - Decoding re-validates properties, so invalid persisted state is rejected.

use super::properties::{NodeProperties, PropertyMap};
use super::time::now;
use super::ValidationError;
use chrono::{DateTime, Utc};
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable node identifier.
pub type NodeId = Uuid;

/// Closed set of node kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeType {
    Task,
    Note,
    Person,
    Project,
}

impl NodeType {
    pub const ALL: [NodeType; 4] = [Self::Task, Self::Note, Self::Person, Self::Project];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Task => "Task",
            Self::Note => "Note",
            Self::Person => "Person",
            Self::Project => "Project",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Task" => Some(Self::Task),
            "Note" => Some(Self::Note),
            "Person" => Some(Self::Person),
            "Project" => Some(Self::Project),
            _ => None,
        }
    }
}

impl Display for NodeType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One typed entity in the knowledge graph.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "NodeRecord")]
pub struct Node {
    pub id: NodeId,
    pub properties: NodeProperties,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

impl Node {
    /// Creates a node with a fresh id and both timestamps set to now.
    pub fn new(properties: NodeProperties) -> Self {
        Self::with_id(Uuid::new_v4(), properties)
    }

    /// Creates a node with a caller-provided id.
    ///
    /// Used by import/migration paths where identity already exists.
    pub fn with_id(id: NodeId, properties: NodeProperties) -> Self {
        let created_at = now();
        Self {
            id,
            properties,
            created_at,
            modified_at: created_at,
        }
    }

    pub fn kind(&self) -> NodeType {
        self.properties.kind()
    }

    pub fn tags(&self) -> &[String] {
        self.properties.tags()
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags().iter().any(|value| value == tag)
    }

    /// Replaces properties and bumps `modified_at`.
    ///
    /// Callers must pass properties of the same type; see `NodeProperties::merged`.
    pub fn replace_properties(&mut self, properties: NodeProperties) {
        self.properties = properties;
        self.modified_at = now();
    }
}

impl Serialize for Node {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_struct("Node", 5)?;
        state.serialize_field("id", &self.id)?;
        state.serialize_field("type", &self.kind())?;
        state.serialize_field("properties", &self.properties)?;
        state.serialize_field("created_at", &self.created_at)?;
        state.serialize_field("modified_at", &self.modified_at)?;
        state.end()
    }
}

/// Raw wire shape of a node before property validation.
#[derive(Debug, Clone, Deserialize)]
pub struct NodeRecord {
    pub id: NodeId,
    #[serde(rename = "type")]
    pub kind: NodeType,
    pub properties: PropertyMap,
    pub created_at: DateTime<Utc>,
    /// Older snapshots only carry `created_at`.
    #[serde(default)]
    pub modified_at: Option<DateTime<Utc>>,
}

impl TryFrom<NodeRecord> for Node {
    type Error = ValidationError;

    fn try_from(record: NodeRecord) -> Result<Self, Self::Error> {
        let properties = NodeProperties::from_map(record.kind, record.properties)?;
        Ok(Self {
            id: record.id,
            properties,
            created_at: record.created_at,
            modified_at: record.modified_at.unwrap_or(record.created_at),
        })
    }
}
