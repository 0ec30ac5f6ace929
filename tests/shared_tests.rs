use std::sync::Arc;
use std::thread;

use tempfile::tempdir;
use vsstree::{
    CodecConfig, NodeRecord, SearchQuery, SharedTree, VssTree, VssTreeError,
    bench_utils::{TreeShape, generate_tree},
    read_tree_from_path, write_tree_to_path,
};

#[test]
fn test_empty_shared_tree_reports_not_found() {
    let shared = SharedTree::new();
    assert!(!shared.is_loaded());
    assert!(matches!(
        shared.read(|tree| tree.len()),
        Err(VssTreeError::NotFound(_))
    ));
    assert!(shared.search(&SearchQuery::new("*")).is_err());
}

#[test]
fn test_load_lookup_and_save() {
    let dir = tempdir().expect("tempdir");
    let source = dir.path().join("source.binary");
    let copy = dir.path().join("copy.binary");
    let tree = generate_tree(TreeShape::Balanced { fanout: 3 }, 40, 4);
    write_tree_to_path(&tree, &source, &CodecConfig::default()).expect("write");

    let shared = SharedTree::new();
    let report = shared.load(&source, &CodecConfig::default()).expect("load");
    assert_eq!(report.total_nodes, 40);

    let id = shared.lookup("Vehicle.N1.N2").expect("lookup");
    let path = shared.read(|tree| tree.path(id)).expect("read");
    assert_eq!(path, "Vehicle.N1.N2");
    assert!(matches!(
        shared.lookup("Vehicle.Nope"),
        Err(VssTreeError::NotFound(_))
    ));

    shared.save(&copy, &CodecConfig::default()).expect("save");
    let (reloaded, _) = read_tree_from_path(&copy, &CodecConfig::default()).expect("reload");
    assert_eq!(reloaded, tree);
}

fn vehicle(branches: &[&str]) -> VssTree {
    let mut tree = VssTree::new(NodeRecord::branch("Vehicle"));
    for name in branches {
        let id = tree
            .add_child(tree.root(), NodeRecord::branch(*name))
            .expect("branch");
        tree.add_child(id, NodeRecord::branch("Door")).expect("door");
    }
    tree
}

#[test]
fn test_with_node_follows_installed_tree() {
    let shared = SharedTree::new();
    shared.install(vehicle(&["Cabin"]));
    let stale = shared.lookup("Vehicle.Cabin").expect("lookup");

    shared.install(vehicle(&["Body", "Cabin"]));
    let path = shared.read(|tree| tree.path(stale)).expect("read");
    assert_eq!(path, "Vehicle.Body");

    let (name, children) = shared
        .with_node("Vehicle.Cabin", |node| {
            (node.name().to_string(), node.child_count())
        })
        .expect("with_node");
    assert_eq!(name, "Cabin");
    assert_eq!(children, 1);
    assert!(matches!(
        shared.with_node("Vehicle.Trunk", |node| node.child_count()),
        Err(VssTreeError::NotFound(_))
    ));
}

#[test]
fn test_concurrent_readers() {
    let shared = Arc::new(SharedTree::new());
    shared.install(generate_tree(TreeShape::Balanced { fanout: 5 }, 156, 12));

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let shared = Arc::clone(&shared);
            thread::spawn(move || {
                let result = shared
                    .search(&SearchQuery::new("*.*").all_kinds())
                    .expect("search");
                result.count()
            })
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().expect("join"), 25);
    }
}
