//! Per-type create/get/update tools.

use super::args::{
    CreateNote, CreatePerson, CreateProject, CreateTask, GetNotes, GetPersons, GetProjects,
    GetTasks, UpdateNote, UpdatePerson, UpdateProject, UpdateTask,
};
use super::{existing_node_id, patch_of, KnowledgeGraphTools, ToolError, ToolResult};
use crate::graph::NodeQuery;
use crate::model::{Node, NodeType};
use crate::store::GraphStore;
use serde::Serialize;

impl<S: GraphStore> KnowledgeGraphTools<S> {
    pub fn create_task(&self, args: CreateTask) -> ToolResult<Node> {
        self.create(NodeType::Task, "create_task", &args)
    }

    pub fn get_tasks(&self, args: GetTasks) -> ToolResult<Vec<Node>> {
        let mut query = NodeQuery::of_kind(NodeType::Task);
        if let Some(status) = args.status {
            query = query.with_property("status", status.as_str());
        }
        self.list(query, args.tags)
    }

    pub fn update_task(&self, args: UpdateTask) -> ToolResult<Node> {
        self.update(NodeType::Task, "update_task", &args.task_id, &args)
    }

    pub fn create_note(&self, args: CreateNote) -> ToolResult<Node> {
        self.create(NodeType::Note, "create_note", &args)
    }

    pub fn get_notes(&self, args: GetNotes) -> ToolResult<Vec<Node>> {
        self.list(NodeQuery::of_kind(NodeType::Note), args.tags)
    }

    pub fn update_note(&self, args: UpdateNote) -> ToolResult<Node> {
        self.update(NodeType::Note, "update_note", &args.note_id, &args)
    }

    pub fn create_person(&self, args: CreatePerson) -> ToolResult<Node> {
        self.create(NodeType::Person, "create_person", &args)
    }

    pub fn get_persons(&self, args: GetPersons) -> ToolResult<Vec<Node>> {
        let mut query = NodeQuery::of_kind(NodeType::Person);
        if let Some(name) = args.name {
            query = query.with_property("name", name);
        }
        self.list(query, args.tags)
    }

    pub fn update_person(&self, args: UpdatePerson) -> ToolResult<Node> {
        self.update(NodeType::Person, "update_person", &args.person_id, &args)
    }

    pub fn create_project(&self, args: CreateProject) -> ToolResult<Node> {
        self.create(NodeType::Project, "create_project", &args)
    }

    pub fn get_projects(&self, args: GetProjects) -> ToolResult<Vec<Node>> {
        let mut query = NodeQuery::of_kind(NodeType::Project);
        if let Some(name) = args.name {
            query = query.with_property("name", name);
        }
        if let Some(status) = args.status {
            query = query.with_property("status", status.as_str());
        }
        self.list(query, args.tags)
    }

    pub fn update_project(&self, args: UpdateProject) -> ToolResult<Node> {
        self.update(NodeType::Project, "update_project", &args.project_id, &args)
    }

    fn create<T: Serialize>(&self, kind: NodeType, tool: &'static str, args: &T) -> ToolResult<Node> {
        let properties = patch_of(tool, args)?;
        Ok(self.engine.create_node(kind, properties)?)
    }

    fn list(&self, query: NodeQuery, tags: Option<Vec<String>>) -> ToolResult<Vec<Node>> {
        let query = query.with_any_tag(tags.unwrap_or_default());
        Ok(self.engine.get_nodes(&query)?)
    }

    fn update<T: Serialize>(
        &self,
        kind: NodeType,
        tool: &'static str,
        id: &str,
        args: &T,
    ) -> ToolResult<Node> {
        let patch = patch_of(tool, args)?;
        if patch.is_empty() {
            return Err(ToolError::EmptyUpdate { tool });
        }
        let id = existing_node_id(id)?;
        Ok(self.engine.update_node_as(kind, id, patch)?)
    }
}
