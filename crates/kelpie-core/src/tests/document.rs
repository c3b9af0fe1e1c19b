use crate::*;

fn record(id: &str, parent: Option<&str>, level: u32) -> NodeRecord {
    NodeRecord {
        id: id.to_string(),
        title: format!("title-{id}"),
        description: String::new(),
        parent_id: parent.map(str::to_string),
        level,
        kind: NodeKind::Regular,
        page_ref: None,
    }
}

fn assert_forest_invariant(doc: &Document) {
    for node in doc.nodes() {
        match node.parent_id.as_deref() {
            None => assert_eq!(node.level, 0, "root {} must be level 0", node.id),
            Some(pid) => {
                let parent = doc
                    .get(pid)
                    .unwrap_or_else(|| panic!("parent {pid} of {} must exist", node.id));
                assert_eq!(
                    node.level,
                    parent.level + 1,
                    "level of {} must be parent level + 1",
                    node.id
                );
            }
        }
    }
}

#[test]
fn from_records_builds_forest_in_creation_order() {
    let doc = Document::from_records(vec![
        record("r", None, 0),
        record("a", Some("r"), 1),
        record("b", Some("r"), 1),
        record("a1", Some("a"), 2),
    ]);
    assert_eq!(doc.len(), 4);
    let ids: Vec<&str> = doc.node_ids().collect();
    assert_eq!(ids, vec!["r", "a", "b", "a1"]);
    assert_eq!(doc.child_ids("r"), ["a".to_string(), "b".to_string()]);
    assert!(doc.get("r").unwrap().has_children);
    assert!(!doc.get("b").unwrap().has_children);
    assert_forest_invariant(&doc);
}

#[test]
fn from_records_normalizes_inconsistent_levels() {
    // Declared levels disagree with the parent chain; the chain wins.
    let doc = Document::from_records(vec![
        record("r", None, 3),
        record("a", Some("r"), 7),
        record("a1", Some("a"), 0),
    ]);
    assert_eq!(doc.get("r").unwrap().level, 0);
    assert_eq!(doc.get("a").unwrap().level, 1);
    assert_eq!(doc.get("a1").unwrap().level, 2);
    assert_forest_invariant(&doc);
}

#[test]
fn from_records_synthesizes_placeholder_for_dangling_parent() {
    let doc = Document::from_records(vec![record("orphan", Some("ghost"), 1)]);
    assert_eq!(doc.len(), 2);
    let ghost = doc.get("ghost").unwrap();
    assert!(ghost.placeholder);
    assert!(ghost.is_root());
    assert_eq!(ghost.level, 0);
    assert_eq!(ghost.title, "");
    assert!(ghost.has_children);
    assert_eq!(doc.get("orphan").unwrap().level, 1);
    assert_forest_invariant(&doc);
}

#[test]
fn from_records_skips_duplicate_ids() {
    let doc = Document::from_records(vec![
        record("r", None, 0),
        record("r", None, 0),
        record("a", Some("r"), 1),
    ]);
    assert_eq!(doc.len(), 2);
}

#[test]
fn from_records_empty_input_yields_empty_document() {
    let doc = Document::from_records(Vec::new());
    assert!(doc.is_empty());
    assert!(doc.edges().is_empty());
}

#[test]
fn edges_are_derived_one_per_non_root() {
    let doc = Document::from_records(vec![
        record("r", None, 0),
        record("a", Some("r"), 1),
        record("b", Some("r"), 1),
    ]);
    let edges = doc.edges();
    assert_eq!(edges.len(), 2);
    assert_eq!(edges[0], Edge::between("r", "a"));
    assert_eq!(edges[1], Edge::between("r", "b"));
}

#[test]
fn add_child_attaches_one_level_below_parent() {
    let mut doc = Document::from_records(vec![record("r", None, 0)]);
    let id = doc.add_child("r", "Q", "A", None).unwrap();
    let child = doc.get(&id).unwrap();
    assert_eq!(child.level, 1);
    assert_eq!(child.parent_id.as_deref(), Some("r"));
    assert!(doc.get("r").unwrap().has_children);
    assert_forest_invariant(&doc);
}

#[test]
fn add_child_honors_explicit_id_and_rejects_duplicates() {
    let mut doc = Document::from_records(vec![record("r", None, 0)]);
    let id = doc
        .add_child("r", "Q", "A", Some("n1".to_string()))
        .unwrap();
    assert_eq!(id, "n1");
    let err = doc
        .add_child("r", "Q2", "A2", Some("n1".to_string()))
        .unwrap_err();
    assert!(matches!(err, Error::DuplicateNodeId { .. }));
    assert_eq!(doc.len(), 2);
}

#[test]
fn add_child_to_unknown_parent_synthesizes_placeholder() {
    let mut doc = Document::new();
    let id = doc.add_child("ghost", "Q", "A", None).unwrap();
    let ghost = doc.get("ghost").unwrap();
    assert!(ghost.placeholder);
    assert_eq!(ghost.level, 0);
    assert_eq!(doc.get(&id).unwrap().level, 1);
    assert_forest_invariant(&doc);
}

#[test]
fn update_content_merges_fields_without_touching_structure() {
    let mut doc = Document::from_records(vec![record("r", None, 0), record("a", Some("r"), 1)]);
    doc.update_content(
        "a",
        ContentPatch {
            title: Some("new title".to_string()),
            kind: Some(NodeKind::Qna),
            page_ref: Some(12),
            ..ContentPatch::default()
        },
    );
    let a = doc.get("a").unwrap();
    assert_eq!(a.title, "new title");
    assert_eq!(a.description, "");
    assert_eq!(a.kind, NodeKind::Qna);
    assert_eq!(a.page_ref, Some(12));
    assert_eq!(a.level, 1);
    assert_eq!(a.parent_id.as_deref(), Some("r"));
}

#[test]
fn update_content_unknown_id_is_noop() {
    let mut doc = Document::from_records(vec![record("r", None, 0)]);
    doc.update_content("missing", ContentPatch::title("x"));
    assert_eq!(doc.len(), 1);
}

#[test]
fn delete_reparents_children_to_former_parent() {
    let mut doc = Document::from_records(vec![
        record("p", None, 0),
        record("n", Some("p"), 1),
        record("c1", Some("n"), 2),
        record("c2", Some("n"), 2),
    ]);
    let removed = doc.delete_node("n").unwrap();
    assert_eq!(removed.id, "n");
    assert!(!doc.contains("n"));
    assert_eq!(doc.get("c1").unwrap().parent_id.as_deref(), Some("p"));
    assert_eq!(doc.get("c2").unwrap().parent_id.as_deref(), Some("p"));
    assert_eq!(doc.get("c1").unwrap().level, 1);

    let edges = doc.edges();
    assert!(edges.contains(&Edge::between("p", "c1")));
    assert!(edges.contains(&Edge::between("p", "c2")));
    assert!(!edges.iter().any(|e| e.source_id == "n" || e.target_id == "n"));
    assert_forest_invariant(&doc);
}

#[test]
fn delete_shifts_reparented_subtrees_one_level_up() {
    let mut doc = Document::from_records(vec![
        record("p", None, 0),
        record("n", Some("p"), 1),
        record("c", Some("n"), 2),
        record("g", Some("c"), 3),
    ]);
    doc.delete_node("n");
    assert_eq!(doc.get("c").unwrap().level, 1);
    assert_eq!(doc.get("g").unwrap().level, 2);
    assert_forest_invariant(&doc);
}

#[test]
fn delete_root_promotes_children_to_roots() {
    let mut doc = Document::from_records(vec![
        record("r", None, 0),
        record("a", Some("r"), 1),
        record("b", Some("r"), 1),
    ]);
    doc.delete_node("r");
    assert!(doc.get("a").unwrap().is_root());
    assert_eq!(doc.get("a").unwrap().level, 0);
    assert!(doc.get("b").unwrap().is_root());
    assert_forest_invariant(&doc);
}

#[test]
fn delete_clears_has_children_when_parent_becomes_childless() {
    let mut doc = Document::from_records(vec![record("r", None, 0), record("a", Some("r"), 1)]);
    assert!(doc.get("r").unwrap().has_children);
    doc.delete_node("a");
    assert!(!doc.get("r").unwrap().has_children);
}

#[test]
fn delete_unknown_id_and_double_delete_are_noops() {
    let mut doc = Document::from_records(vec![record("r", None, 0), record("a", Some("r"), 1)]);
    assert!(doc.delete_node("missing").is_none());
    assert!(doc.delete_node("a").is_some());
    assert!(doc.delete_node("a").is_none());
    assert_eq!(doc.len(), 1);
}

#[test]
fn add_delete_round_trip_restores_original_tree() {
    let mut doc = Document::from_records(vec![record("r", None, 0)]);
    let n1 = doc.add_child("r", "Q", "A", None).unwrap();
    assert_eq!(doc.get(&n1).unwrap().level, 1);
    assert_eq!(doc.get(&n1).unwrap().parent_id.as_deref(), Some("r"));
    doc.delete_node(&n1);
    assert_eq!(doc.len(), 1);
    assert!(doc.contains("r"));
    assert!(!doc.get("r").unwrap().has_children);
}

#[test]
fn forest_invariant_holds_across_mixed_mutations() {
    let mut doc = Document::from_records(vec![
        record("r", None, 0),
        record("a", Some("r"), 1),
        record("b", Some("r"), 1),
        record("a1", Some("a"), 2),
    ]);
    let c = doc.add_child("a1", "deep", "", None).unwrap();
    doc.add_child("b", "sib", "", None).unwrap();
    doc.delete_node("a");
    doc.add_child(&c, "deeper", "", None).unwrap();
    doc.delete_node("b");
    assert_forest_invariant(&doc);
}

#[test]
fn descendants_walks_breadth_first() {
    let doc = Document::from_records(vec![
        record("r", None, 0),
        record("a", Some("r"), 1),
        record("b", Some("r"), 1),
        record("a1", Some("a"), 2),
        record("b1", Some("b"), 2),
    ]);
    assert_eq!(doc.descendants("r"), vec!["a", "b", "a1", "b1"]);
    assert_eq!(doc.subtree("a"), vec!["a", "a1"]);
    assert!(doc.descendants("a1").is_empty());
}

#[test]
fn has_collapsed_ancestor_checks_whole_path() {
    let mut doc = Document::from_records(vec![
        record("r", None, 0),
        record("a", Some("r"), 1),
        record("a1", Some("a"), 2),
    ]);
    assert!(!doc.has_collapsed_ancestor("a1"));
    doc.set_children_collapsed("r", true);
    assert!(doc.has_collapsed_ancestor("a1"));
    assert!(doc.has_collapsed_ancestor("a"));
    assert!(!doc.has_collapsed_ancestor("r"));
}
