//! Hydration layer - loads one tree's graph from SQLite into a Store
//!
//! Reads are separate statements without a shared snapshot; a link written
//! between them may or may not be seen.

use crate::errors::Result;
use crate::repo::SqliteRepo;
use kinship_core::ops::Store;
use kinship_core::rules::validate_graph;
use rusqlite::Connection;

/// Load every member of a tree plus all parent and spouse links touching them
///
/// Links to members outside the tree are loaded too; consumers that need
/// both endpoints (the renderer) skip them.
pub fn load_tree_graph(conn: &Connection, tree_id: &str, store: &mut Store) -> Result<()> {
    for member in SqliteRepo::list_members_for_tree(conn, tree_id)? {
        store.insert_member(member);
    }

    for link in SqliteRepo::list_parent_links_for_tree(conn, tree_id)? {
        store.insert_parent_link(link);
    }

    for link in SqliteRepo::list_spouse_links_for_tree(conn, tree_id)? {
        store.insert_spouse_link(link);
    }

    tracing::debug!(
        tree_id,
        member_count = store.member_count(),
        parent_link_count = store.parent_links().len(),
        "tree graph hydrated"
    );

    // Only reachable through writes that bypass the schema guards
    if let Err(e) = validate_graph(store) {
        tracing::warn!(tree_id, error = %e, "hydrated graph violates invariants");
    }

    Ok(())
}

/// Load a tree's graph into a fresh Store
pub fn load_tree(conn: &Connection, tree_id: &str) -> Result<Store> {
    let mut store = Store::new();
    load_tree_graph(conn, tree_id, &mut store)?;
    Ok(store)
}
