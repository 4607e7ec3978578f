//! Family tree commands: create, list and render

use kinship_core::model::{FamilyTree, Member, NewMember, PersonSummary};
use kinship_core::{build_tree, KinshipError, RenderLimits, RenderedTree};
use kinship_core::{log_op_end, log_op_error, log_op_start};
use kinship_store::errors::from_rusqlite;
use kinship_store::repo::hydration::load_tree;
use kinship_store::{Result, SqliteRepo};
use rusqlite::Connection;
use serde::Serialize;

use super::{new_id, write_tx};
use crate::queue::MatchQueue;

/// A tree plus a summary of its first member
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeSummary {
    #[serde(flatten)]
    pub tree: FamilyTree,
    pub root_member: Option<PersonSummary>,
}

/// Create a tree together with its first member (generation level 0)
///
/// The tree row, the member row and the tree's root pointer commit
/// together. The new member is queued for match indexing afterwards.
///
/// ## Errors
///
/// - `NotFound`: unknown user
/// - `InvalidInput`: blank title or member name
pub fn tree_create(
    user_id: &str,
    title: String,
    root: NewMember,
    conn: &mut Connection,
    queue: &dyn MatchQueue,
) -> Result<FamilyTree> {
    log_op_start!("tree_create", user_id = user_id);
    let start = std::time::Instant::now();

    let tree = tree_create_impl(user_id, title, root, conn).map_err(|e| {
        log_op_error!(
            "tree_create",
            e.clone(),
            duration_ms = start.elapsed().as_millis() as u64
        );
        e
    })?;

    if let Some(root_id) = &tree.root_member_id {
        queue.enqueue(root_id);
    }

    log_op_end!(
        "tree_create",
        duration_ms = start.elapsed().as_millis() as u64,
        tree_id = %tree.id
    );

    Ok(tree)
}

fn tree_create_impl(
    user_id: &str,
    title: String,
    root: NewMember,
    conn: &mut Connection,
) -> Result<FamilyTree> {
    if title.trim().is_empty() {
        return Err(KinshipError::InvalidName {
            reason: "tree title must not be blank".to_string(),
        }
        .into());
    }
    if root.name.trim().is_empty() {
        return Err(KinshipError::InvalidName {
            reason: "name must not be blank".to_string(),
        }
        .into());
    }

    let tx = write_tx(conn)?;

    SqliteRepo::get_user(&tx, user_id)?.ok_or_else(|| KinshipError::UserNotFound {
        user_id: user_id.to_string(),
    })?;

    let mut tree = FamilyTree::new(new_id(), user_id.to_string(), title);
    SqliteRepo::insert_tree(&tx, &tree)?;

    let member = Member::new(new_id(), tree.id.clone(), root, 0);
    SqliteRepo::insert_member(&tx, &member)?;
    SqliteRepo::set_tree_root(&tx, &tree.id, &member.id)?;
    tree.root_member_id = Some(member.id);

    tx.commit().map_err(from_rusqlite)?;

    Ok(tree)
}

/// Trees owned by a user, newest first
///
/// ## Errors
///
/// - `NotFound`: unknown user
pub fn tree_list_for_user(user_id: &str, conn: &Connection) -> Result<Vec<TreeSummary>> {
    log_op_start!("tree_list_for_user", user_id = user_id);
    let start = std::time::Instant::now();

    let result = tree_list_for_user_impl(user_id, conn).map_err(|e| {
        log_op_error!(
            "tree_list_for_user",
            e.clone(),
            duration_ms = start.elapsed().as_millis() as u64
        );
        e
    })?;

    log_op_end!(
        "tree_list_for_user",
        duration_ms = start.elapsed().as_millis() as u64,
        tree_count = result.len()
    );

    Ok(result)
}

fn tree_list_for_user_impl(user_id: &str, conn: &Connection) -> Result<Vec<TreeSummary>> {
    SqliteRepo::get_user(conn, user_id)?.ok_or_else(|| KinshipError::UserNotFound {
        user_id: user_id.to_string(),
    })?;

    let mut summaries = Vec::new();
    for tree in SqliteRepo::list_trees_for_user(conn, user_id)? {
        let root_member = match &tree.root_member_id {
            Some(id) => SqliteRepo::get_member(conn, id)?.map(|m| m.summary()),
            None => None,
        };
        summaries.push(TreeSummary { tree, root_member });
    }

    Ok(summaries)
}

/// Render a tree as a forest of nested nodes
///
/// Cycles and bound hits are reported in `RenderedTree::warnings`, never
/// as errors. A tree without members renders as an empty forest.
///
/// ## Errors
///
/// - `NotFound`: unknown tree
pub fn tree_render(tree_id: &str, limits: RenderLimits, conn: &Connection) -> Result<RenderedTree> {
    log_op_start!("tree_render", tree_id = tree_id);
    let start = std::time::Instant::now();

    let result = tree_render_impl(tree_id, limits, conn).map_err(|e| {
        log_op_error!(
            "tree_render",
            e.clone(),
            duration_ms = start.elapsed().as_millis() as u64
        );
        e
    })?;

    log_op_end!(
        "tree_render",
        duration_ms = start.elapsed().as_millis() as u64,
        root_count = result.nodes.len(),
        warning_count = result.warnings.len()
    );

    Ok(result)
}

fn tree_render_impl(tree_id: &str, limits: RenderLimits, conn: &Connection) -> Result<RenderedTree> {
    SqliteRepo::get_tree(conn, tree_id)?.ok_or_else(|| KinshipError::TreeNotFound {
        tree_id: tree_id.to_string(),
    })?;

    let store = load_tree(conn, tree_id)?;
    Ok(build_tree(tree_id, &store, limits))
}
