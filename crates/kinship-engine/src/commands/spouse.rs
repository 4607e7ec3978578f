//! Explicit spouse operations: link and divorce

use chrono::NaiveDate;
use kinship_core::model::{SpouseLink, SpousePair};
use kinship_core::ops::{end_spouse_link, link_spouses, Store};
use kinship_core::KinshipError;
use kinship_core::{log_op_end, log_op_error, log_op_start};
use kinship_store::errors::from_rusqlite;
use kinship_store::repo::hydration::load_tree;
use kinship_store::{Result, SqliteRepo};
use rusqlite::Connection;
use serde::Serialize;

use super::{today, write_tx};

/// Result of an explicit spouse operation
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpouseLinkOutcome {
    pub link: SpouseLink,
    /// False when the pair was already linked
    pub created: bool,
}

/// Link two existing members of the same tree as spouses
///
/// Idempotent: linking an already-linked pair (in either order) returns
/// the existing link untouched, including a dissolved one.
///
/// ## Errors
///
/// - `NotFound`: either member doesn't exist
/// - `InvalidInput`: both ids name the same member
/// - `CrossTreeRelation`: members belong to different trees
pub fn spouse_link(
    member_a: &str,
    member_b: &str,
    conn: &mut Connection,
) -> Result<SpouseLinkOutcome> {
    log_op_start!("spouse_link", member_a = member_a, member_b = member_b);
    let start = std::time::Instant::now();

    let result = spouse_link_impl(member_a, member_b, conn).map_err(|e| {
        log_op_error!(
            "spouse_link",
            e.clone(),
            duration_ms = start.elapsed().as_millis() as u64
        );
        e
    })?;

    log_op_end!(
        "spouse_link",
        duration_ms = start.elapsed().as_millis() as u64,
        created = result.created
    );

    Ok(result)
}

fn spouse_link_impl(
    member_a: &str,
    member_b: &str,
    conn: &mut Connection,
) -> Result<SpouseLinkOutcome> {
    let tx = write_tx(conn)?;

    let a = require_member(&tx, member_a)?;
    let b = require_member(&tx, member_b)?;
    if a.tree_id != b.tree_id {
        return Err(KinshipError::CrossTreeRelation {
            member_id: b.id,
            expected_tree_id: a.tree_id,
            actual_tree_id: b.tree_id,
        }
        .into());
    }

    let mut store = load_tree(&tx, &a.tree_id)?;
    let outcome = match link_spouses(&mut store, member_a, member_b, today())? {
        Some(link) => {
            // A concurrent writer may have won the pair; report what is stored
            let created = SqliteRepo::insert_spouse_link_if_absent(&tx, &link)?;
            let link = if created {
                link
            } else {
                stored_link(&tx, &link.pair)?
            };
            SpouseLinkOutcome { link, created }
        }
        None => SpouseLinkOutcome {
            link: stored_link(&tx, &SpousePair::new(member_a, member_b))?,
            created: false,
        },
    };

    tx.commit().map_err(from_rusqlite)?;

    Ok(outcome)
}

/// Dissolve a spouse link by setting its end date
///
/// The link is kept. `end_date` defaults to today; ending an already
/// ended link overwrites the date.
///
/// ## Errors
///
/// - `NotFound`: no link exists for the pair
pub fn spouse_end(
    member_a: &str,
    member_b: &str,
    end_date: Option<NaiveDate>,
    conn: &mut Connection,
) -> Result<SpouseLink> {
    log_op_start!("spouse_end", member_a = member_a, member_b = member_b);
    let start = std::time::Instant::now();

    let result = spouse_end_impl(member_a, member_b, end_date, conn).map_err(|e| {
        log_op_error!(
            "spouse_end",
            e.clone(),
            duration_ms = start.elapsed().as_millis() as u64
        );
        e
    })?;

    log_op_end!(
        "spouse_end",
        duration_ms = start.elapsed().as_millis() as u64
    );

    Ok(result)
}

fn spouse_end_impl(
    member_a: &str,
    member_b: &str,
    end_date: Option<NaiveDate>,
    conn: &mut Connection,
) -> Result<SpouseLink> {
    let tx = write_tx(conn)?;

    let pair = SpousePair::new(member_a, member_b);
    let mut store = Store::new();
    if let Some(link) = SqliteRepo::get_spouse_link(&tx, &pair)? {
        store.insert_spouse_link(link);
    }

    let link = end_spouse_link(&mut store, member_a, member_b, end_date.unwrap_or_else(today))?;
    if let Some(end) = link.end_date {
        SqliteRepo::set_spouse_end_date(&tx, &link.pair, end)?;
    }

    tx.commit().map_err(from_rusqlite)?;

    Ok(link)
}

fn require_member(conn: &Connection, member_id: &str) -> Result<kinship_core::model::Member> {
    Ok(SqliteRepo::get_member(conn, member_id)?.ok_or_else(|| {
        KinshipError::MemberNotFound {
            member_id: member_id.to_string(),
        }
    })?)
}

fn stored_link(conn: &Connection, pair: &SpousePair) -> Result<SpouseLink> {
    Ok(SqliteRepo::get_spouse_link(conn, pair)?.ok_or_else(|| {
        KinshipError::SpouseLinkNotFound {
            first: pair.first().to_string(),
            second: pair.second().to_string(),
        }
    })?)
}
