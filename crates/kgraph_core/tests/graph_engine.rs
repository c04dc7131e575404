use kgraph_core::{
    Direction, Edge, GraphEngine, GraphError, GraphStore, Node, NodeQuery, NodeType, PropertyMap,
    RelatedQuery, SqliteStore, StoreError, StoreResult, TextSearch, ValidationError,
};
use serde_json::{json, Value};
use std::cell::Cell;
use std::collections::HashSet;
use uuid::Uuid;

fn props(value: Value) -> PropertyMap {
    value.as_object().cloned().unwrap()
}

fn engine() -> GraphEngine<SqliteStore> {
    GraphEngine::new(SqliteStore::open_in_memory().unwrap())
}

#[test]
fn created_ids_are_unique() {
    let engine = engine();
    let mut seen = HashSet::new();
    for i in 0..25 {
        let node = engine
            .create_node(NodeType::Task, props(json!({"description": format!("task {i}")})))
            .unwrap();
        assert!(seen.insert(node.id), "duplicate id {}", node.id);
    }
}

#[test]
fn get_nodes_by_type_returns_only_that_type() {
    let engine = engine();
    for i in 0..3 {
        engine
            .create_node(NodeType::Note, props(json!({"title": format!("n{i}"), "content": ""})))
            .unwrap();
    }
    for i in 0..2 {
        engine
            .create_node(NodeType::Person, props(json!({"name": format!("p{i}")})))
            .unwrap();
    }

    let notes = engine.get_nodes(&NodeQuery::of_kind(NodeType::Note)).unwrap();
    assert_eq!(notes.len(), 3);
    assert!(notes.iter().all(|node| node.kind() == NodeType::Note));
    assert_eq!(engine.get_nodes(&NodeQuery::all()).unwrap().len(), 5);
}

#[test]
fn update_changes_only_the_given_key() {
    let engine = engine();
    let task = engine
        .create_node(
            NodeType::Task,
            props(json!({"description": "Write report", "tags": ["work"], "due_date": "2025-12-01"})),
        )
        .unwrap();

    let updated = engine
        .update_node(task.id, props(json!({"status": "in_progress"})))
        .unwrap();
    assert!(updated.modified_at >= task.modified_at);
    assert_eq!(updated.created_at, task.created_at);

    let stored = engine.get_node(task.id).unwrap();
    let map = stored.properties.to_map();
    assert_eq!(map["status"], json!("in_progress"));
    assert_eq!(map["description"], json!("Write report"));
    assert_eq!(map["tags"], json!(["work"]));
    assert_eq!(map["due_date"], json!("2025-12-01T00:00:00Z"));
}

#[test]
fn validation_failures_leave_the_store_untouched() {
    let engine = engine();
    let err = engine
        .create_node(NodeType::Task, props(json!({"description": "   "})))
        .unwrap_err();
    assert!(matches!(
        err,
        GraphError::Validation(ValidationError::BlankField { field: "description", .. })
    ));

    let err = engine
        .create_node(NodeType::Task, props(json!({"description": "x", "status": "blocked"})))
        .unwrap_err();
    assert!(matches!(err, GraphError::Validation(ValidationError::InvalidShape { .. })));

    let task = engine
        .create_node(NodeType::Task, props(json!({"description": "x"})))
        .unwrap();
    let err = engine
        .update_node(task.id, props(json!({"priority": "high"})))
        .unwrap_err();
    assert!(matches!(err, GraphError::Validation(_)));

    assert_eq!(engine.get_nodes(&NodeQuery::all()).unwrap(), vec![task]);
}

#[test]
fn update_of_unknown_id_is_not_found() {
    let engine = engine();
    let missing = Uuid::new_v4();
    let err = engine
        .update_node(missing, props(json!({"status": "done"})))
        .unwrap_err();
    assert!(matches!(err, GraphError::NodeNotFound(ref id) if *id == missing.to_string()));
    assert!(err.is_not_found());
}

#[test]
fn update_as_rejects_other_types() {
    let engine = engine();
    let note = engine
        .create_node(NodeType::Note, props(json!({"title": "t", "content": "c"})))
        .unwrap();
    let err = engine
        .update_node_as(NodeType::Task, note.id, props(json!({"title": "x"})))
        .unwrap_err();
    assert!(matches!(
        err,
        GraphError::Validation(ValidationError::TypeMismatch {
            expected: NodeType::Task,
            actual: NodeType::Note,
            ..
        })
    ));
}

#[test]
fn property_and_tag_filters() {
    let engine = engine();
    engine
        .create_node(
            NodeType::Task,
            props(json!({"description": "a", "status": "done", "tags": ["home"]})),
        )
        .unwrap();
    engine
        .create_node(
            NodeType::Task,
            props(json!({"description": "b", "status": "todo", "tags": ["work", "urgent"]})),
        )
        .unwrap();
    engine
        .create_node(NodeType::Task, props(json!({"description": "c", "tags": ["Work"]})))
        .unwrap();

    let done = engine
        .get_nodes(&NodeQuery::of_kind(NodeType::Task).with_property("status", "done"))
        .unwrap();
    assert_eq!(done.len(), 1);

    let work = engine
        .get_nodes(&NodeQuery::all().with_any_tag(["work", "home"]))
        .unwrap();
    assert_eq!(work.len(), 2);

    let urgent = engine
        .get_nodes(&NodeQuery::all().with_property("tags", "urgent"))
        .unwrap();
    assert_eq!(urgent.len(), 1);
}

#[test]
fn create_edge_requires_existing_endpoints_and_a_label() {
    let engine = engine();
    let note = engine
        .create_node(NodeType::Note, props(json!({"title": "t", "content": ""})))
        .unwrap();
    let ghost = Uuid::new_v4();

    let err = engine.create_edge(note.id, "mentions", ghost).unwrap_err();
    assert!(matches!(err, GraphError::NodeNotFound(ref id) if *id == ghost.to_string()));

    let err = engine.create_edge(note.id, "  ", note.id).unwrap_err();
    assert!(matches!(err, GraphError::Validation(ValidationError::BlankLabel)));

    assert!(engine
        .get_node_edges(note.id, Direction::Both)
        .unwrap()
        .is_empty());
}

#[test]
fn related_nodes_follow_forward_edges() {
    let engine = engine();
    let project = engine
        .create_node(
            NodeType::Project,
            props(json!({"name": "Website Redesign", "description": "refresh"})),
        )
        .unwrap();
    let task = engine
        .create_node(NodeType::Task, props(json!({"description": "Gather requirements"})))
        .unwrap();
    engine.create_edge(task.id, "part_of", project.id).unwrap();

    let forward = engine
        .get_related_nodes(&RelatedQuery::new(task.id).label("part_of"))
        .unwrap();
    assert_eq!(forward, vec![project.clone()]);

    // Default traversal from the project sees nothing: the edge points at it.
    assert!(engine
        .get_related_nodes(&RelatedQuery::new(project.id))
        .unwrap()
        .is_empty());

    let reverse = engine
        .get_related_nodes(&RelatedQuery::new(project.id).direction(Direction::Incoming))
        .unwrap();
    assert_eq!(reverse, vec![task]);
}

#[test]
fn related_nodes_without_matching_edges_is_empty_not_error() {
    let engine = engine();
    let person = engine
        .create_node(NodeType::Person, props(json!({"name": "Lin"})))
        .unwrap();
    assert!(engine
        .get_related_nodes(&RelatedQuery::new(person.id).label("part_of"))
        .unwrap()
        .is_empty());

    let err = engine
        .get_related_nodes(&RelatedQuery::new(Uuid::new_v4()))
        .unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn related_nodes_keep_edge_insertion_order() {
    let engine = engine();
    let hub = engine
        .create_node(NodeType::Project, props(json!({"name": "Hub", "description": ""})))
        .unwrap();
    let mut targets = Vec::new();
    for name in ["Zed", "Amy", "Kim"] {
        let person = engine
            .create_node(NodeType::Person, props(json!({"name": name})))
            .unwrap();
        engine.create_edge(hub.id, "member", person.id).unwrap();
        targets.push(person.id);
    }

    let related: Vec<_> = engine
        .get_related_nodes(&RelatedQuery::new(hub.id))
        .unwrap()
        .into_iter()
        .map(|node| node.id)
        .collect();
    assert_eq!(related, targets);
}

#[test]
fn delete_node_removes_incident_edges() {
    let engine = engine();
    let a = engine
        .create_node(NodeType::Note, props(json!({"title": "a", "content": ""})))
        .unwrap();
    let b = engine
        .create_node(NodeType::Note, props(json!({"title": "b", "content": ""})))
        .unwrap();
    let c = engine
        .create_node(NodeType::Note, props(json!({"title": "c", "content": ""})))
        .unwrap();
    engine.create_edge(a.id, "links", b.id).unwrap();
    engine.create_edge(c.id, "links", a.id).unwrap();
    engine.create_edge(b.id, "links", c.id).unwrap();

    assert!(engine.delete_node(a.id).unwrap());
    assert!(!engine.delete_node(a.id).unwrap());

    let remaining = engine.store().load_edges().unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].source_id, b.id);
    assert!(matches!(engine.get_node(a.id), Err(GraphError::NodeNotFound(_))));
}

#[test]
fn edit_and_delete_edge() {
    let engine = engine();
    let a = engine
        .create_node(NodeType::Person, props(json!({"name": "A"})))
        .unwrap();
    let b = engine
        .create_node(NodeType::Person, props(json!({"name": "B"})))
        .unwrap();
    let edge = engine.create_edge(a.id, "knows", b.id).unwrap();

    let edited = engine.edit_edge(a.id, b.id, "knows", "mentors").unwrap();
    assert_eq!(edited.id, edge.id);
    assert_eq!(edited.label, "mentors");

    let err = engine.edit_edge(a.id, b.id, "knows", "x").unwrap_err();
    assert!(matches!(err, GraphError::EdgeNotFound { .. }));

    assert_eq!(engine.get_node_edges(b.id, Direction::Incoming).unwrap().len(), 1);
    assert!(engine.get_node_edges(b.id, Direction::Outgoing).unwrap().is_empty());

    assert!(engine.delete_edge(a.id, b.id, "mentors").unwrap());
    assert!(!engine.delete_edge(a.id, b.id, "mentors").unwrap());
    assert!(engine.get_node_edges(a.id, Direction::Both).unwrap().is_empty());
}

#[test]
fn padded_labels_match_the_stored_label() {
    let engine = engine();
    let task = engine
        .create_node(NodeType::Task, props(json!({"description": "draft brief"})))
        .unwrap();
    let project = engine
        .create_node(NodeType::Project, props(json!({"name": "Launch", "description": ""})))
        .unwrap();
    let edge = engine.create_edge(task.id, " part_of ", project.id).unwrap();
    assert_eq!(edge.label, "part_of");

    let related = engine
        .get_related_nodes(&RelatedQuery::new(task.id).label(" part_of "))
        .unwrap();
    assert_eq!(related, vec![project.clone()]);

    let edited = engine
        .edit_edge(task.id, project.id, " part_of ", " belongs_to ")
        .unwrap();
    assert_eq!(edited.label, "belongs_to");

    assert!(engine.delete_edge(task.id, project.id, "\tbelongs_to ").unwrap());
    assert!(engine.store().load_edges().unwrap().is_empty());
}

/// SQLite store whose node writes can be switched off.
struct NodeWritesFail {
    inner: SqliteStore,
    failing: Cell<bool>,
}

impl GraphStore for NodeWritesFail {
    fn describe(&self) -> String {
        self.inner.describe()
    }

    fn load_nodes(&self) -> StoreResult<Vec<Node>> {
        self.inner.load_nodes()
    }

    fn save_nodes(&self, nodes: &[Node]) -> StoreResult<()> {
        if self.failing.get() {
            return Err(StoreError::InvalidData("node writes disabled".to_string()));
        }
        self.inner.save_nodes(nodes)
    }

    fn load_edges(&self) -> StoreResult<Vec<Edge>> {
        self.inner.load_edges()
    }

    fn save_edges(&self, edges: &[Edge]) -> StoreResult<()> {
        self.inner.save_edges(edges)
    }
}

#[test]
fn failed_node_delete_leaves_no_dangling_edges() {
    let engine = GraphEngine::new(NodeWritesFail {
        inner: SqliteStore::open_in_memory().unwrap(),
        failing: Cell::new(false),
    });
    let a = engine
        .create_node(NodeType::Person, props(json!({"name": "A"})))
        .unwrap();
    let b = engine
        .create_node(NodeType::Person, props(json!({"name": "B"})))
        .unwrap();
    engine.create_edge(a.id, "knows", b.id).unwrap();

    engine.store().failing.set(true);
    let err = engine.delete_node(a.id).unwrap_err();
    assert!(matches!(err, GraphError::Storage(_)));

    let nodes = engine.store().load_nodes().unwrap();
    for edge in engine.store().load_edges().unwrap() {
        assert!(nodes.iter().any(|node| node.id == edge.source_id));
        assert!(nodes.iter().any(|node| node.id == edge.target_id));
    }

    engine.store().failing.set(false);
    assert!(engine.delete_node(a.id).unwrap());
    assert_eq!(engine.store().load_nodes().unwrap(), vec![b]);
}

#[test]
fn search_nodes_matches_text_case_insensitively() {
    let engine = engine();
    engine
        .create_node(
            NodeType::Note,
            props(json!({"title": "Garden plan", "content": "Plant TOMATOES in May", "tags": ["home"]})),
        )
        .unwrap();
    engine
        .create_node(
            NodeType::Project,
            props(json!({"name": "Tomato sauce", "description": "", "tags": ["food"]})),
        )
        .unwrap();
    engine
        .create_node(NodeType::Task, props(json!({"description": "Buy soil"})))
        .unwrap();

    let search = |text: &str, kind: Option<NodeType>, tags: &[&str]| {
        engine
            .search_nodes(&TextSearch {
                text: Some(text.to_string()),
                kind,
                tags: tags.iter().map(|tag| tag.to_string()).collect(),
            })
            .unwrap()
            .len()
    };

    assert_eq!(search("tomato", None, &[]), 2);
    assert_eq!(search("tomato", Some(NodeType::Note), &[]), 1);
    assert_eq!(search("tomato", None, &["food"]), 1);
    assert_eq!(search("", None, &[]), 3);
    assert_eq!(search("cucumber", None, &[]), 0);
}

#[test]
fn tags_listing_and_rename() {
    let engine = engine();
    let first = engine
        .create_node(NodeType::Task, props(json!({"description": "a", "tags": ["wip", "home"]})))
        .unwrap();
    engine
        .create_node(NodeType::Note, props(json!({"title": "b", "content": "", "tags": ["wip", "in-progress"]})))
        .unwrap();
    engine
        .create_node(NodeType::Person, props(json!({"name": "c", "tags": ["friend"]})))
        .unwrap();

    assert_eq!(
        engine.get_all_tags().unwrap(),
        vec!["friend", "home", "in-progress", "wip"]
    );

    let changed = engine.rename_tag("wip", "in-progress").unwrap();
    assert_eq!(changed.len(), 2);
    assert_eq!(
        engine.get_all_tags().unwrap(),
        vec!["friend", "home", "in-progress"]
    );

    let renamed_first = engine.get_node(first.id).unwrap();
    assert_eq!(renamed_first.tags(), ["in-progress", "home"]);
    assert!(renamed_first.modified_at >= first.modified_at);

    assert!(engine.rename_tag("absent", "x").unwrap().is_empty());
    assert!(engine.rename_tag("home", " ").is_err());
}

#[test]
fn semantic_search_without_index_is_empty() {
    let engine = engine();
    engine
        .create_node(NodeType::Note, props(json!({"title": "anything", "content": ""})))
        .unwrap();
    assert!(!engine.has_index());
    assert!(engine.semantic_search("anything", None, 5).unwrap().is_empty());
    assert_eq!(engine.reindex().unwrap(), 0);
}
