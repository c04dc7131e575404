//! Static description of every tool the façade dispatches.

use serde::Serialize;

/// Name, purpose and argument keys of one tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ToolSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub required: &'static [&'static str],
    pub optional: &'static [&'static str],
}

const fn tool(
    name: &'static str,
    description: &'static str,
    required: &'static [&'static str],
    optional: &'static [&'static str],
) -> ToolSpec {
    ToolSpec {
        name,
        description,
        required,
        optional,
    }
}

pub(crate) const TOOLS: &[ToolSpec] = &[
    tool(
        "create_task",
        "Create a task node.",
        &["description"],
        &["status", "tags", "due_date"],
    ),
    tool(
        "get_tasks",
        "List tasks, optionally filtered by status and any-of tags.",
        &[],
        &["status", "tags"],
    ),
    tool(
        "update_task",
        "Update fields of an existing task.",
        &["task_id"],
        &["description", "status", "tags", "due_date"],
    ),
    tool(
        "create_note",
        "Create a markdown note node.",
        &["title", "content"],
        &["tags"],
    ),
    tool(
        "get_notes",
        "List notes, optionally filtered by any-of tags.",
        &[],
        &["tags"],
    ),
    tool(
        "update_note",
        "Update fields of an existing note.",
        &["note_id"],
        &["title", "content", "tags"],
    ),
    tool(
        "create_person",
        "Create a person node with optional open metadata.",
        &["name"],
        &["tags", "metadata"],
    ),
    tool(
        "get_persons",
        "List persons, optionally filtered by exact name and any-of tags.",
        &[],
        &["name", "tags"],
    ),
    tool(
        "update_person",
        "Update fields of an existing person.",
        &["person_id"],
        &["name", "tags", "metadata"],
    ),
    tool(
        "create_project",
        "Create a project node.",
        &["name", "description"],
        &["status", "tags"],
    ),
    tool(
        "get_projects",
        "List projects, optionally filtered by exact name, status and any-of tags.",
        &[],
        &["name", "status", "tags"],
    ),
    tool(
        "update_project",
        "Update fields of an existing project.",
        &["project_id"],
        &["name", "description", "status", "tags"],
    ),
    tool(
        "create_edge",
        "Create a directed, labeled relationship between two existing nodes.",
        &["source_id", "label", "target_id"],
        &[],
    ),
    tool(
        "edit_edge",
        "Change the label of an existing relationship.",
        &["source_id", "target_id", "old_label", "new_label"],
        &[],
    ),
    tool(
        "delete_edge",
        "Delete relationships matching source, target and label.",
        &["source_id", "target_id", "label"],
        &[],
    ),
    tool(
        "get_node_edges",
        "List relationships touching a node (outgoing, incoming or both).",
        &["node_id"],
        &["direction"],
    ),
    tool(
        "get_related_nodes",
        "Resolve nodes connected to a node, following outgoing edges one hop by default.",
        &["node_id"],
        &["label", "direction", "depth"],
    ),
    tool(
        "delete_node",
        "Delete a node and every relationship touching it.",
        &["node_id"],
        &[],
    ),
    tool(
        "search_nodes",
        "Case-insensitive keyword search over node text, with type and tag filters.",
        &[],
        &["query", "node_type", "tags"],
    ),
    tool(
        "get_all_tags",
        "List every distinct tag in the graph, sorted.",
        &[],
        &[],
    ),
    tool(
        "rename_tag",
        "Rename a tag on every node carrying it.",
        &["old_tag", "new_tag"],
        &[],
    ),
    tool(
        "semantic_search",
        "Rank nodes by similarity to free text.",
        &["query"],
        &["node_type", "limit"],
    ),
];
