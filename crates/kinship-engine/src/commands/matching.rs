//! Ancestor matching: index a member and record scored candidates
//!
//! `index_member` is what the match worker runs for every queued member id.
//! It is safe to run more than once for the same member and safe to run
//! concurrently for both members of a pair: the unique pair index decides
//! which writer creates the record, and only that writer notifies.

use kinship_core::matching::{build_index_entry, confidence_score, CandidateFilter, MatchPolicy};
use kinship_core::model::{MatchIndexEntry, MatchRecord};
use kinship_core::KinshipError;
use kinship_core::{log_op_end, log_op_error, log_op_start};
use kinship_store::{Result, SqliteRepo};
use rusqlite::Connection;
use serde::Serialize;

use super::new_id;
use crate::notify::{MatchNotice, NotificationDispatcher};

/// What one indexing run did
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexOutcome {
    pub member_id: String,
    /// False when the member no longer exists
    pub indexed: bool,
    /// Candidates returned by the search, including already-matched ones
    pub candidates: usize,
    pub matches_created: Vec<MatchRecord>,
}

/// Refresh a member's index entry and create matches for new candidates
///
/// A member deleted before its job ran is not an error; the run reports
/// `indexed: false`. Notification failures are logged and never undo a
/// committed match.
///
/// ## Errors
///
/// - `Persistence`: storage failure (retryable by the worker)
pub fn index_member(
    member_id: &str,
    policy: &MatchPolicy,
    notifier: &dyn NotificationDispatcher,
    conn: &Connection,
) -> Result<IndexOutcome> {
    log_op_start!("index_member", member_id = member_id);
    let start = std::time::Instant::now();

    let outcome = index_member_impl(member_id, policy, notifier, conn).map_err(|e| {
        log_op_error!(
            "index_member",
            e.clone(),
            duration_ms = start.elapsed().as_millis() as u64
        );
        e
    })?;

    log_op_end!(
        "index_member",
        duration_ms = start.elapsed().as_millis() as u64,
        candidates = outcome.candidates,
        matches_created = outcome.matches_created.len()
    );

    Ok(outcome)
}

fn index_member_impl(
    member_id: &str,
    policy: &MatchPolicy,
    notifier: &dyn NotificationDispatcher,
    conn: &Connection,
) -> Result<IndexOutcome> {
    let Some((member, user_id)) = SqliteRepo::get_member_with_owner(conn, member_id)? else {
        tracing::warn!(
            op = "index_member",
            member_id = member_id,
            "member vanished before indexing"
        );
        return Ok(IndexOutcome {
            member_id: member_id.to_string(),
            ..IndexOutcome::default()
        });
    };

    let subject = build_index_entry(&member, &user_id);
    SqliteRepo::upsert_match_index_entry(conn, &subject)?;

    let filter = CandidateFilter::for_subject(&subject, policy);
    let candidates = SqliteRepo::find_match_candidates(conn, &filter)?;

    let mut created = Vec::new();
    for candidate in &candidates {
        if SqliteRepo::find_existing_match(conn, &subject.member_id, &candidate.member_id)?
            .is_some()
        {
            continue;
        }

        let score = confidence_score(&subject, candidate, policy);
        let record = MatchRecord::new(new_id(), &subject, candidate, score);
        if !SqliteRepo::insert_match_if_absent(conn, &record)? {
            tracing::debug!(
                member_a = %record.member_a_id,
                member_b = %record.member_b_id,
                "pair already matched by a concurrent run"
            );
            continue;
        }

        notify(conn, notifier, &record, &subject, candidate, &member.name);
        created.push(record);
    }

    Ok(IndexOutcome {
        member_id: member_id.to_string(),
        indexed: true,
        candidates: candidates.len(),
        matches_created: created,
    })
}

/// Best-effort notice to both owners; failures only log
fn notify(
    conn: &Connection,
    notifier: &dyn NotificationDispatcher,
    record: &MatchRecord,
    subject: &MatchIndexEntry,
    candidate: &MatchIndexEntry,
    subject_name: &str,
) {
    let result = build_notice(conn, record, subject, candidate, subject_name)
        .and_then(|notice| notifier.notify_match(&notice));

    if let Err(e) = result {
        tracing::warn!(
            op = "index_member",
            match_id = %record.id,
            error_code = e.code(),
            err_message = %e,
            "match notification failed"
        );
    }
}

fn build_notice(
    conn: &Connection,
    record: &MatchRecord,
    subject: &MatchIndexEntry,
    candidate: &MatchIndexEntry,
    subject_name: &str,
) -> Result<MatchNotice> {
    let user = |id: &str| -> Result<_> {
        Ok(SqliteRepo::get_user(conn, id)?.ok_or_else(|| KinshipError::UserNotFound {
            user_id: id.to_string(),
        })?)
    };

    let candidate_name = SqliteRepo::get_member(conn, &candidate.member_id)?
        .map(|m| m.name)
        .unwrap_or_else(|| candidate.normalized_name.clone());

    Ok(MatchNotice {
        record: record.clone(),
        user_a: user(&subject.user_id)?,
        user_b: user(&candidate.user_id)?,
        member_a_name: subject_name.to_string(),
        member_b_name: candidate_name,
    })
}

/// Live matches touching any tree owned by a user, best first
///
/// ## Errors
///
/// - `NotFound`: unknown user
pub fn matches_for_user(user_id: &str, conn: &Connection) -> Result<Vec<MatchRecord>> {
    log_op_start!("matches_for_user", user_id = user_id);
    let start = std::time::Instant::now();

    let result = SqliteRepo::get_user(conn, user_id)
        .and_then(|user| {
            user.ok_or_else(|| {
                KinshipError::UserNotFound {
                    user_id: user_id.to_string(),
                }
                .into()
            })
        })
        .and_then(|_| SqliteRepo::list_matches_for_user(conn, user_id))
        .map_err(|e| {
            log_op_error!(
                "matches_for_user",
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64
            );
            e
        })?;

    log_op_end!(
        "matches_for_user",
        duration_ms = start.elapsed().as_millis() as u64,
        match_count = result.len()
    );

    Ok(result)
}

/// Live matches touching one tree, best first
///
/// ## Errors
///
/// - `NotFound`: unknown tree
pub fn matches_for_tree(tree_id: &str, conn: &Connection) -> Result<Vec<MatchRecord>> {
    log_op_start!("matches_for_tree", tree_id = tree_id);
    let start = std::time::Instant::now();

    let result = SqliteRepo::get_tree(conn, tree_id)
        .and_then(|tree| {
            tree.ok_or_else(|| {
                KinshipError::TreeNotFound {
                    tree_id: tree_id.to_string(),
                }
                .into()
            })
        })
        .and_then(|_| SqliteRepo::list_matches_for_tree(conn, tree_id))
        .map_err(|e| {
            log_op_error!(
                "matches_for_tree",
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64
            );
            e
        })?;

    log_op_end!(
        "matches_for_tree",
        duration_ms = start.elapsed().as_millis() as u64,
        match_count = result.len()
    );

    Ok(result)
}
