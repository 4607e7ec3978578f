//! Tree creation, listing and rendering through the engine
mod common;

use common::{add, seed_tree, setup_db, RecordingQueue};
use kinship_core::model::{Gender, NewMember};
use kinship_core::logging_facility::init_test_capture;
use kinship_core::{ExErrorKind, RenderLimits};
use kinship_engine::commands::spouse::{spouse_end, spouse_link};
use kinship_engine::commands::tree::{tree_create, tree_list_for_user, tree_render};
use kinship_engine::commands::user::user_create;
use kinship_engine::NoopQueue;

#[test]
fn test_tree_create_sets_root_and_enqueues_it() {
    let (_dir, mut conn) = setup_db();
    let user = user_create(Some("Ann".to_string()), "ann@example.com".to_string(), &conn).unwrap();
    let queue = RecordingQueue::default();

    let tree = tree_create(
        &user.id,
        "  Smiths ".to_string(),
        NewMember::new("John Smith", Gender::Male),
        &mut conn,
        &queue,
    )
    .unwrap();

    assert_eq!(tree.title, "Smiths");
    let root = tree.root_member_id.clone().unwrap();
    assert_eq!(queue.jobs(), vec![root.clone()]);

    let listed = tree_list_for_user(&user.id, &conn).unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].root_member.as_ref().unwrap().id, root);
}

#[test]
fn test_tree_create_validates_input() {
    let (_dir, mut conn) = setup_db();
    let user = user_create(None, "ann@example.com".to_string(), &conn).unwrap();

    let err = tree_create(&user.id, " ".to_string(), NewMember::new("A", Gender::Male), &mut conn, &NoopQueue)
        .unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::InvalidInput);

    let err = tree_create("nobody", "T".to_string(), NewMember::new("A", Gender::Male), &mut conn, &NoopQueue)
        .unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::NotFound);
}

#[test]
fn test_duplicate_email_is_constraint_violation() {
    let (_dir, conn) = setup_db();
    user_create(None, "ann@example.com".to_string(), &conn).unwrap();

    let err = user_create(None, "ann@example.com".to_string(), &conn).unwrap_err();

    assert_eq!(err.kind(), ExErrorKind::ConstraintViolation);
}

#[test]
fn test_render_unknown_tree_is_not_found() {
    let (_dir, conn) = setup_db();

    let err = tree_render("missing", RenderLimits::default(), &conn).unwrap_err();

    assert_eq!(err.kind(), ExErrorKind::NotFound);
}

#[test]
fn test_render_married_and_divorced_spouses() {
    let (_dir, mut conn) = setup_db();
    let (_, tree, child) = seed_tree(&mut conn, "a@example.com", NewMember::new("Child", Gender::Unknown));
    let dad = add(&mut conn, &tree, &child, "parent", "Dad", "male");
    let mum = add(&mut conn, &tree, &child, "parent", "Mum", "female");
    spouse_link(&dad, &mum, &mut conn).unwrap();
    spouse_end(&dad, &mum, None, &mut conn).unwrap();

    let rendered = tree_render(&tree, RenderLimits::default(), &conn).unwrap();

    // Both parents are roots; dissolved spouses are still listed
    assert_eq!(rendered.nodes.len(), 2);
    for root in &rendered.nodes {
        assert_eq!(root.spouses.len(), 1);
        assert_eq!(root.children.len(), 1);
        assert_eq!(root.children[0].name, "Child");
        assert_eq!(root.children[0].generation_level, 1);
    }
    assert!(rendered.is_complete());
}

#[test]
fn test_render_shape_and_boundary_logging() {
    let capture = init_test_capture();
    let (_dir, mut conn) = setup_db();
    let (_, tree, root) = seed_tree(&mut conn, "a@example.com", NewMember::new("Root", Gender::Male));
    add(&mut conn, &tree, &root, "child", "Kid", "female");

    let rendered = tree_render(&tree, RenderLimits::default(), &conn).unwrap();
    let json = serde_json::to_value(&rendered).unwrap();

    assert_eq!(json["treeId"], tree.as_str());
    assert_eq!(json["nodes"][0]["name"], "Root");
    assert_eq!(json["nodes"][0]["children"][0]["generationLevel"], 1);
    assert!(json["nodes"][0]["imageUrl"].is_null());
    assert!(json.get("warnings").is_none());

    capture.assert_event_exists("tree_render", "start");
    capture.assert_event_exists("tree_render", "end");
}
