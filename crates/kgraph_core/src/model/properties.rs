//! Per-type property records and the type registry.
//!
//! # Responsibility
//! - Define the closed property shape of each node type.
//! - Decode loosely typed property mappings into those shapes and validate them.
//!
//! # Invariants
//! - Unknown property keys are rejected, never silently dropped.
//! - Required text fields are non-blank after trim.
//! - Tags are trimmed, non-blank and unique (first occurrence wins); case is kept.

use super::node::NodeType;
use super::time::optional_timestamp;
use super::ValidationError;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;

/// Loosely typed property mapping as received from callers and storage.
pub type PropertyMap = Map<String, Value>;

/// Task lifecycle state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Todo,
    InProgress,
    InReview,
    Cancelled,
    Done,
}

impl TaskStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Todo => "todo",
            Self::InProgress => "in_progress",
            Self::InReview => "in_review",
            Self::Cancelled => "cancelled",
            Self::Done => "done",
        }
    }
}

/// Project lifecycle state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    #[default]
    Active,
    Archived,
}

impl ProjectStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Archived => "archived",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TaskProperties {
    pub description: String,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, with = "optional_timestamp")]
    pub due_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NoteProperties {
    pub title: String,
    /// Markdown body. May be empty, but must be present.
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PersonProperties {
    pub name: String,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Open-ended data such as contact info or role.
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectProperties {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub status: ProjectStatus,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Validated properties of one node, one variant per node type.
///
/// Serialized untagged: the node envelope carries the `type` key.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum NodeProperties {
    Task(TaskProperties),
    Note(NoteProperties),
    Person(PersonProperties),
    Project(ProjectProperties),
}

impl NodeProperties {
    /// Decodes and validates `properties` against the schema registered for `kind`.
    pub fn from_map(kind: NodeType, properties: PropertyMap) -> Result<Self, ValidationError> {
        let decoded = match kind {
            NodeType::Task => Self::Task(decode(kind, properties)?),
            NodeType::Note => Self::Note(decode(kind, properties)?),
            NodeType::Person => Self::Person(decode(kind, properties)?),
            NodeType::Project => Self::Project(decode(kind, properties)?),
        };
        decoded.normalized()
    }

    /// Node type implied by the variant.
    pub fn kind(&self) -> NodeType {
        match self {
            Self::Task(_) => NodeType::Task,
            Self::Note(_) => NodeType::Note,
            Self::Person(_) => NodeType::Person,
            Self::Project(_) => NodeType::Project,
        }
    }

    /// Returns the properties as a generic mapping, as seen by filters and merges.
    pub fn to_map(&self) -> PropertyMap {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => PropertyMap::new(),
        }
    }

    /// Returns a copy with `patch` keys overlaid, re-validated for the same type.
    ///
    /// Keys absent from `patch` keep their current value.
    pub fn merged(&self, patch: PropertyMap) -> Result<Self, ValidationError> {
        let mut merged = self.to_map();
        for (key, value) in patch {
            merged.insert(key, value);
        }
        Self::from_map(self.kind(), merged)
    }

    pub fn tags(&self) -> &[String] {
        match self {
            Self::Task(props) => &props.tags,
            Self::Note(props) => &props.tags,
            Self::Person(props) => &props.tags,
            Self::Project(props) => &props.tags,
        }
    }

    pub fn tags_mut(&mut self) -> &mut Vec<String> {
        match self {
            Self::Task(props) => &mut props.tags,
            Self::Note(props) => &mut props.tags,
            Self::Person(props) => &mut props.tags,
            Self::Project(props) => &mut props.tags,
        }
    }

    /// Labeled free-text fields, in display order.
    ///
    /// Used by keyword search and by the similarity index embedding text.
    pub fn text_fields(&self) -> Vec<(&'static str, &str)> {
        match self {
            Self::Task(props) => vec![("Description", props.description.as_str())],
            Self::Note(props) => vec![
                ("Title", props.title.as_str()),
                ("Content", props.content.as_str()),
            ],
            Self::Person(props) => vec![("Name", props.name.as_str())],
            Self::Project(props) => vec![
                ("Name", props.name.as_str()),
                ("Description", props.description.as_str()),
            ],
        }
    }

    fn normalized(mut self) -> Result<Self, ValidationError> {
        let kind = self.kind();
        match &self {
            Self::Task(props) => require_text(kind, "description", &props.description)?,
            Self::Note(props) => require_text(kind, "title", &props.title)?,
            Self::Person(props) => require_text(kind, "name", &props.name)?,
            Self::Project(props) => require_text(kind, "name", &props.name)?,
        }

        let tags = normalize_tags(self.tags())?;
        *self.tags_mut() = tags;
        Ok(self)
    }
}

/// Trims and deduplicates tags, keeping first-seen order.
///
/// Fails on blank values instead of dropping them.
pub fn normalize_tags(tags: &[String]) -> Result<Vec<String>, ValidationError> {
    let mut seen = HashSet::new();
    let mut normalized = Vec::with_capacity(tags.len());
    for tag in tags {
        let trimmed = tag.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::BlankTag);
        }
        if seen.insert(trimmed.to_string()) {
            normalized.push(trimmed.to_string());
        }
    }
    Ok(normalized)
}

fn decode<T: DeserializeOwned>(kind: NodeType, properties: PropertyMap) -> Result<T, ValidationError> {
    serde_json::from_value(Value::Object(properties)).map_err(|err| {
        ValidationError::InvalidShape {
            kind,
            message: err.to_string(),
        }
    })
}

fn require_text(kind: NodeType, field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::BlankField { kind, field });
    }
    Ok(())
}
