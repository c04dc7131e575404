use kgraph_core::tools::args::{
    CreateEdge, CreateNote, CreatePerson, CreateProject, CreateTask, GetPersons, GetProjects,
    GetRelatedNodes, GetTasks, UpdateProject, UpdateTask,
};
use kgraph_core::{
    Direction, GraphEngine, GraphError, JsonFileStore, KnowledgeGraphTools, NodeType,
    SqliteStore, ToolError,
};
use kgraph_core::model::{ProjectStatus, TaskStatus};
use serde_json::{json, Value};
use uuid::Uuid;

fn tools() -> KnowledgeGraphTools<SqliteStore> {
    KnowledgeGraphTools::new(GraphEngine::new(SqliteStore::open_in_memory().unwrap()))
}

fn task(description: &str) -> CreateTask {
    CreateTask {
        description: description.to_string(),
        ..CreateTask::default()
    }
}

#[test]
fn website_redesign_scenario() {
    let tools = tools();
    let project = tools
        .create_project(CreateProject {
            name: "Website Redesign".to_string(),
            description: "Refresh the marketing site".to_string(),
            ..CreateProject::default()
        })
        .unwrap();
    let task = tools.create_task(task("Gather requirements")).unwrap();
    tools
        .create_edge(CreateEdge {
            source_id: task.id.to_string(),
            label: "part_of".to_string(),
            target_id: project.id.to_string(),
        })
        .unwrap();

    let forward = tools
        .get_related_nodes(GetRelatedNodes {
            node_id: task.id.to_string(),
            label: Some("part_of".to_string()),
            direction: None,
            depth: None,
        })
        .unwrap();
    assert_eq!(forward, vec![project.clone()]);

    let from_project = tools
        .get_related_nodes(GetRelatedNodes {
            node_id: project.id.to_string(),
            label: None,
            direction: None,
            depth: None,
        })
        .unwrap();
    assert!(from_project.is_empty());

    let reversed = tools
        .get_related_nodes(GetRelatedNodes {
            node_id: project.id.to_string(),
            label: Some("part_of".to_string()),
            direction: Some(Direction::Incoming),
            depth: None,
        })
        .unwrap();
    assert_eq!(reversed, vec![task]);
}

#[test]
fn create_pins_the_node_type() {
    let tools = tools();
    let note = tools
        .create_note(CreateNote {
            title: "Retro".to_string(),
            content: "- went well".to_string(),
            tags: Some(vec!["team".to_string()]),
        })
        .unwrap();
    assert_eq!(note.kind(), NodeType::Note);

    let person = tools
        .create_person(CreatePerson {
            name: "Grace".to_string(),
            tags: None,
            metadata: json!({"email": "grace@example.com"}).as_object().cloned(),
        })
        .unwrap();
    assert_eq!(person.kind(), NodeType::Person);
    assert_eq!(
        person.properties.to_map()["metadata"]["email"],
        json!("grace@example.com")
    );
}

#[test]
fn get_filters_by_status_name_and_tags() {
    let tools = tools();
    tools
        .create_task(CreateTask {
            status: Some(TaskStatus::Done),
            tags: Some(vec!["home".to_string()]),
            ..task("laundry")
        })
        .unwrap();
    tools
        .create_task(CreateTask {
            tags: Some(vec!["work".to_string()]),
            ..task("report")
        })
        .unwrap();
    tools
        .create_project(CreateProject {
            name: "Garden".to_string(),
            description: String::new(),
            status: Some(ProjectStatus::Archived),
            tags: None,
        })
        .unwrap();
    tools
        .create_person(CreatePerson {
            name: "Ana".to_string(),
            tags: Some(vec!["family".to_string()]),
            metadata: None,
        })
        .unwrap();

    let done = tools
        .get_tasks(GetTasks {
            status: Some(TaskStatus::Done),
            tags: None,
        })
        .unwrap();
    assert_eq!(done.len(), 1);

    let tagged = tools
        .get_tasks(GetTasks {
            status: None,
            tags: Some(vec!["work".to_string(), "garden".to_string()]),
        })
        .unwrap();
    assert_eq!(tagged.len(), 1);
    assert_eq!(tools.get_tasks(GetTasks::default()).unwrap().len(), 2);

    let archived = tools
        .get_projects(GetProjects {
            status: Some(ProjectStatus::Archived),
            ..GetProjects::default()
        })
        .unwrap();
    assert_eq!(archived.len(), 1);
    assert!(tools
        .get_projects(GetProjects {
            status: Some(ProjectStatus::Active),
            ..GetProjects::default()
        })
        .unwrap()
        .is_empty());

    let ana = tools
        .get_persons(GetPersons {
            name: Some("Ana".to_string()),
            tags: None,
        })
        .unwrap();
    assert_eq!(ana.len(), 1);
    assert!(tools
        .get_persons(GetPersons {
            name: Some("ana".to_string()),
            tags: None,
        })
        .unwrap()
        .is_empty());
}

#[test]
fn update_requires_a_field_and_the_right_type() {
    let tools = tools();
    let created = tools.create_task(task("plan sprint")).unwrap();

    let err = tools
        .update_task(UpdateTask {
            task_id: created.id.to_string(),
            description: None,
            status: None,
            tags: None,
            due_date: None,
        })
        .unwrap_err();
    assert!(matches!(err, ToolError::EmptyUpdate { tool: "update_task" }));

    let updated = tools
        .update_task(UpdateTask {
            task_id: created.id.to_string(),
            description: None,
            status: Some(TaskStatus::InReview),
            tags: None,
            due_date: Some("2025-03-01T09:30:00".to_string()),
        })
        .unwrap();
    let map = updated.properties.to_map();
    assert_eq!(map["status"], json!("in_review"));
    assert_eq!(map["description"], json!("plan sprint"));
    assert_eq!(map["due_date"], json!("2025-03-01T09:30:00Z"));

    let err = tools
        .update_project(UpdateProject {
            project_id: created.id.to_string(),
            name: Some("nope".to_string()),
            description: None,
            status: None,
            tags: None,
        })
        .unwrap_err();
    assert_eq!(err.code(), "validation");

    let err = tools
        .update_project(UpdateProject {
            project_id: Uuid::new_v4().to_string(),
            name: Some("ghost".to_string()),
            description: None,
            status: None,
            tags: None,
        })
        .unwrap_err();
    assert!(matches!(err, ToolError::Graph(GraphError::NodeNotFound(_))));
}

#[test]
fn dynamic_calls_round_trip_through_json() {
    let dir = tempfile::tempdir().unwrap();
    let tools = KnowledgeGraphTools::new(GraphEngine::new(JsonFileStore::open(dir.path()).unwrap()));

    let person = tools
        .call("create_person", json!({"name": "Lovelace", "tags": ["math"]}))
        .unwrap();
    let note = tools
        .call(
            "create_note",
            json!({"title": "Analytical engine", "content": "notes", "tags": ["math", "history"]}),
        )
        .unwrap();
    assert_eq!(note["type"], json!("Note"));
    assert_eq!(note["properties"]["tags"], json!(["math", "history"]));

    let edge = tools
        .call(
            "create_edge",
            json!({"source_id": note["id"], "label": "about", "target_id": person["id"]}),
        )
        .unwrap();
    assert_eq!(edge["label"], json!("about"));

    let edges = tools
        .call("get_node_edges", json!({"node_id": person["id"]}))
        .unwrap();
    assert_eq!(edges.as_array().map(Vec::len), Some(1));

    let found = tools
        .call("search_nodes", json!({"query": "ENGINE", "node_type": "Note"}))
        .unwrap();
    assert_eq!(found[0]["id"], note["id"]);

    assert_eq!(
        tools.call("get_all_tags", json!({})).unwrap(),
        json!(["history", "math"])
    );
    let renamed = tools
        .call("rename_tag", json!({"old_tag": "math", "new_tag": "mathematics"}))
        .unwrap();
    assert_eq!(renamed.as_array().map(Vec::len), Some(2));

    let relabeled = tools
        .call(
            "edit_edge",
            json!({"source_id": note["id"], "target_id": person["id"], "old_label": "about", "new_label": "describes"}),
        )
        .unwrap();
    assert_eq!(relabeled["id"], edge["id"]);

    assert_eq!(
        tools
            .call("delete_node", json!({"node_id": person["id"]}))
            .unwrap(),
        json!({"deleted": true})
    );
    assert_eq!(
        tools
            .call(
                "delete_edge",
                json!({"source_id": note["id"], "target_id": person["id"], "label": "describes"}),
            )
            .unwrap(),
        json!({"deleted": false})
    );
}

#[test]
fn dynamic_call_errors_carry_codes() {
    let tools = tools();
    let bad_id = tools
        .call("get_related_nodes", json!({"node_id": 42}))
        .unwrap_err();
    assert_eq!(bad_id.code(), "invalid_arguments");

    let missing = tools
        .call("get_related_nodes", json!({"node_id": Uuid::new_v4()}))
        .unwrap_err();
    assert_eq!(missing.code(), "not_found");

    let invalid = tools
        .call("create_task", json!({"description": "x", "status": "someday"}))
        .unwrap_err();
    assert_eq!(invalid.code(), "invalid_arguments");

    let blank = tools
        .call("create_task", json!({"description": "  "}))
        .unwrap_err();
    assert_eq!(blank.code(), "validation");

    let bad_date = tools
        .call("create_task", json!({"description": "x", "due_date": "next tuesday"}))
        .unwrap_err();
    assert_eq!(bad_date.code(), "validation");

    let empty = tools
        .call("update_note", json!({"note_id": Uuid::new_v4()}))
        .unwrap_err();
    assert_eq!(empty.code(), "empty_update");
}

#[test]
fn ids_that_name_no_node_are_not_found() {
    let tools = tools();
    let task = tools.call("create_task", json!({"description": "file taxes"})).unwrap();

    let update = tools
        .call("update_task", json!({"task_id": "task-42", "status": "done"}))
        .unwrap_err();
    assert_eq!(update.code(), "not_found");
    assert!(matches!(
        update,
        ToolError::Graph(GraphError::NodeNotFound(ref id)) if id == "task-42"
    ));

    let related = tools
        .call("get_related_nodes", json!({"node_id": "task-42"}))
        .unwrap_err();
    assert_eq!(related.code(), "not_found");

    let edge = tools
        .call(
            "create_edge",
            json!({"source_id": task["id"], "label": "blocks", "target_id": "task-42"}),
        )
        .unwrap_err();
    assert_eq!(edge.code(), "not_found");

    let relabel = tools
        .call(
            "edit_edge",
            json!({"source_id": "task-42", "target_id": task["id"], "old_label": "a", "new_label": "b"}),
        )
        .unwrap_err();
    assert_eq!(relabel.code(), "not_found");

    assert_eq!(
        tools.call("get_node_edges", json!({"node_id": "task-42"})).unwrap(),
        json!([])
    );
    assert_eq!(
        tools.call("delete_node", json!({"node_id": "task-42"})).unwrap(),
        json!({"deleted": false})
    );
    assert_eq!(
        tools
            .call(
                "delete_edge",
                json!({"source_id": "task-42", "target_id": task["id"], "label": "blocks"}),
            )
            .unwrap(),
        json!({"deleted": false})
    );

    let empty = tools
        .call("update_task", json!({"task_id": "task-42"}))
        .unwrap_err();
    assert_eq!(empty.code(), "empty_update");
}

#[test]
fn semantic_search_uses_the_configured_limit() {
    let tools = KnowledgeGraphTools::new(GraphEngine::with_index(
        SqliteStore::open_in_memory().unwrap(),
        Box::new(kgraph_core::InMemoryVectorIndex::new(
            kgraph_core::HashingEmbedder::new(1024),
        )),
    ))
    .with_search_limit(2);

    for i in 0..5 {
        tools
            .call("create_note", json!({"title": format!("garden log {i}"), "content": "garden"}))
            .unwrap();
    }

    let default_limit: Value = tools
        .call("semantic_search", json!({"query": "garden"}))
        .unwrap();
    assert_eq!(default_limit.as_array().map(Vec::len), Some(2));

    let explicit: Value = tools
        .call("semantic_search", json!({"query": "garden", "limit": 4}))
        .unwrap();
    assert_eq!(explicit.as_array().map(Vec::len), Some(4));
}
