//! Loading one tree's graph into the core Store
mod common;

use chrono::NaiveDate;
use common::{link, seed_member, seed_owner, setup_db};
use kinship_core::model::{ParentRole, SpouseLink, SpousePair};
use kinship_core::{build_tree, RenderLimits};
use kinship_store::repo::hydration::load_tree;
use kinship_store::SqliteRepo;

#[test]
fn test_load_tree_only_includes_that_tree() {
    let (_dir, conn) = setup_db();
    let (_, tree_a) = seed_owner(&conn, "a@example.com");
    let (_, tree_b) = seed_owner(&conn, "b@example.com");

    let parent = seed_member(&conn, &tree_a, "Parent", Some(1950));
    let child = seed_member(&conn, &tree_a, "Child", Some(1980));
    let spouse = seed_member(&conn, &tree_a, "Spouse", Some(1952));
    seed_member(&conn, &tree_b, "Stranger", None);

    SqliteRepo::insert_parent_link(&conn, &link(&child, &parent, ParentRole::Father)).unwrap();
    SqliteRepo::insert_spouse_link_if_absent(
        &conn,
        &SpouseLink::new(
            SpousePair::new(&parent, &spouse),
            NaiveDate::from_ymd_opt(1975, 5, 5).unwrap(),
        ),
    )
    .unwrap();

    let store = load_tree(&conn, &tree_a).unwrap();

    assert_eq!(store.member_count(), 3);
    assert_eq!(store.parents_of(&child).len(), 1);
    assert_eq!(store.spouse_links_of(&parent).len(), 1);
}

#[test]
fn test_hydrated_graph_renders() {
    let (_dir, conn) = setup_db();
    let (_, tree) = seed_owner(&conn, "a@example.com");
    let parent = seed_member(&conn, &tree, "Parent", Some(1950));
    let child = seed_member(&conn, &tree, "Child", Some(1980));
    SqliteRepo::insert_parent_link(&conn, &link(&child, &parent, ParentRole::Parent)).unwrap();

    let store = load_tree(&conn, &tree).unwrap();
    let rendered = build_tree(&tree, &store, RenderLimits::default());

    assert_eq!(rendered.nodes.len(), 1);
    assert_eq!(rendered.nodes[0].name, "Parent");
    assert_eq!(rendered.nodes[0].children[0].name, "Child");
    assert_eq!(rendered.nodes[0].children[0].generation_level, 1);
}

#[test]
fn test_empty_tree_loads_empty_store() {
    let (_dir, conn) = setup_db();
    let (_, tree) = seed_owner(&conn, "a@example.com");

    let store = load_tree(&conn, &tree).unwrap();

    assert_eq!(store.member_count(), 0);
}
