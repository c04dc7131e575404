use kgraph_core::{
    migrate, GraphEngine, GraphStore, JsonFileStore, NodeType, PropertyMap, SqliteStore,
    StoreError,
};
use serde_json::{json, Value};

fn props(value: Value) -> PropertyMap {
    value.as_object().cloned().unwrap()
}

fn seeded_engine<S: GraphStore>(store: S) -> GraphEngine<S> {
    let engine = GraphEngine::new(store);
    let project = engine
        .create_node(
            NodeType::Project,
            props(json!({"name": "Website Redesign", "description": "new site"})),
        )
        .unwrap();
    for description in ["Gather requirements", "Draft wireframes", "Pick a CMS"] {
        let task = engine
            .create_node(NodeType::Task, props(json!({"description": description})))
            .unwrap();
        engine.create_edge(task.id, "part_of", project.id).unwrap();
    }
    engine
}

#[test]
fn sqlite_load_preserves_save_order_and_values() {
    let engine = seeded_engine(SqliteStore::open_in_memory().unwrap());
    let store = engine.store();

    let nodes = store.load_nodes().unwrap();
    let edges = store.load_edges().unwrap();
    assert_eq!(nodes.len(), 4);
    assert_eq!(edges.len(), 3);
    assert_eq!(nodes[0].kind(), NodeType::Project);

    let mut reversed = nodes.clone();
    reversed.reverse();
    store.save_nodes(&reversed).unwrap();
    assert_eq!(store.load_nodes().unwrap(), reversed);

    store.save_nodes(&nodes).unwrap();
    store.save_edges(&edges).unwrap();
    assert_eq!(store.load_nodes().unwrap(), nodes);
    assert_eq!(store.load_edges().unwrap(), edges);
}

#[test]
fn sqlite_file_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("graph.db");

    let nodes = {
        let engine = seeded_engine(SqliteStore::open(&path).unwrap());
        engine.store().load_nodes().unwrap()
    };

    let reopened = SqliteStore::open(&path).unwrap();
    assert_eq!(reopened.load_nodes().unwrap(), nodes);
    assert_eq!(reopened.load_edges().unwrap().len(), 3);
    assert!(reopened.describe().starts_with("sqlite:"));
}

#[test]
fn corrupt_properties_row_fails_the_load() {
    let store = SqliteStore::open_in_memory().unwrap();
    store
        .connection()
        .execute(
            "INSERT INTO nodes (id, seq, type, properties, created_at, modified_at)
             VALUES ('7f1f5c43-8d4a-4a4e-9a57-0d1c7f6e9c11', 0, 'Note', '{\"title\": \"x\"}',
                     '2025-01-01T00:00:00Z', '2025-01-01T00:00:00Z');",
            [],
        )
        .unwrap();

    assert!(matches!(store.load_nodes(), Err(StoreError::InvalidData(_))));
}

#[test]
fn migrate_copies_json_collections_into_sqlite_and_back() {
    let dir = tempfile::tempdir().unwrap();
    let json_engine = seeded_engine(JsonFileStore::open(dir.path().join("data")).unwrap());
    let sqlite = SqliteStore::open(dir.path().join("graph.db")).unwrap();

    let report = migrate(json_engine.store(), &sqlite).unwrap();
    assert_eq!(report.nodes, 4);
    assert_eq!(report.edges, 3);
    assert_eq!(
        sqlite.load_nodes().unwrap(),
        json_engine.store().load_nodes().unwrap()
    );
    assert_eq!(
        sqlite.load_edges().unwrap(),
        json_engine.store().load_edges().unwrap()
    );

    let back = JsonFileStore::open(dir.path().join("copy")).unwrap();
    migrate(&sqlite, &back).unwrap();
    assert_eq!(back.load_nodes().unwrap(), sqlite.load_nodes().unwrap());
}
