//! Member commands: add-with-relation, show, profile update, delete

use chrono::{NaiveDate, Utc};
use kinship_core::model::{Gender, Member, NewMember, ParentRole, PersonSummary};
use kinship_core::ops::{add_member_with_relation, AddMemberWithRelation, MutationOutcome, Store};
use kinship_core::{KinshipError, RelationType};
use kinship_core::{log_op_end, log_op_error, log_op_start};
use kinship_store::errors::from_rusqlite;
use kinship_store::repo::hydration::load_tree;
use kinship_store::{Result, SqliteRepo};
use rusqlite::Connection;
use serde::Serialize;

use super::{new_id, today, write_tx};
use crate::queue::MatchQueue;

/// Caller input for adding a member related to an existing one
///
/// Tags arrive as strings and are parsed into closed enums before any
/// lookup happens.
#[derive(Debug, Clone, Default)]
pub struct AddMemberRequest {
    pub tree_id: String,
    pub related_member_id: String,
    /// parent | child | spouse | sibling
    pub relation_type: String,
    pub name: String,
    /// male | female | other | unknown
    pub gender: String,
    pub birth_date: Option<NaiveDate>,
    pub death_date: Option<NaiveDate>,
    pub location: Option<String>,
    pub image_ref: Option<String>,
    /// father | mother | parent; defaults from gender
    pub role: Option<String>,
}

/// A parent or child of a member, with the parent's role in that link
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RelativeRef {
    #[serde(flatten)]
    pub person: PersonSummary,
    pub role: ParentRole,
}

/// A spouse of a member, current or former
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpouseRef {
    #[serde(flatten)]
    pub person: PersonSummary,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
}

/// A member with its immediate relatives resolved
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberDetail {
    #[serde(flatten)]
    pub member: Member,
    pub parents: Vec<RelativeRef>,
    pub children: Vec<RelativeRef>,
    pub spouses: Vec<SpouseRef>,
}

/// What a delete removed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteOutcome {
    pub member_id: String,
    pub parent_links_removed: usize,
    pub spouse_links_removed: usize,
    pub matches_tombstoned: usize,
}

/// Create a member connected to an existing member
///
/// The member row and every edge the relation implies commit in one
/// transaction. On success the new member is queued for match indexing;
/// the queue never affects the result.
///
/// ## Errors
///
/// - `InvalidRelationType` / `InvalidInput`: unparseable relation, gender or role
/// - `NotFound`: related member doesn't exist
/// - `CrossTreeRelation`: related member belongs to another tree
/// - `TooManyParents` / `DuplicateRole`: parent slot unavailable
/// - `NoParentsToInherit`: sibling of a member without parents
pub fn member_add_with_relation(
    request: AddMemberRequest,
    conn: &mut Connection,
    queue: &dyn MatchQueue,
) -> Result<MutationOutcome> {
    log_op_start!(
        "member_add_with_relation",
        tree_id = %request.tree_id,
        related_member_id = %request.related_member_id,
        relation = %request.relation_type
    );
    let start = std::time::Instant::now();

    let outcome = member_add_with_relation_impl(request, conn).map_err(|e| {
        log_op_error!(
            "member_add_with_relation",
            e.clone(),
            duration_ms = start.elapsed().as_millis() as u64
        );
        e
    })?;

    queue.enqueue(&outcome.member.id);

    log_op_end!(
        "member_add_with_relation",
        duration_ms = start.elapsed().as_millis() as u64,
        member_id = %outcome.member.id,
        parent_link_count = outcome.parent_links.len()
    );

    Ok(outcome)
}

fn member_add_with_relation_impl(
    request: AddMemberRequest,
    conn: &mut Connection,
) -> Result<MutationOutcome> {
    let relation: RelationType = request.relation_type.parse()?;
    let gender: Gender = request.gender.parse()?;
    let role = request
        .role
        .as_deref()
        .map(str::parse::<ParentRole>)
        .transpose()?;

    let profile = NewMember {
        name: request.name,
        gender,
        birth_date: request.birth_date,
        death_date: request.death_date,
        location: request.location,
        image_ref: request.image_ref,
    };

    let tx = write_tx(conn)?;

    let related = SqliteRepo::get_member(&tx, &request.related_member_id)?.ok_or_else(|| {
        KinshipError::MemberNotFound {
            member_id: request.related_member_id.clone(),
        }
    })?;
    let mut store = load_tree(&tx, &related.tree_id)?;

    let outcome = add_member_with_relation(
        &mut store,
        &new_id(),
        AddMemberWithRelation {
            tree_id: request.tree_id,
            related_member_id: request.related_member_id,
            relation,
            profile,
            role,
        },
        today(),
    )?;

    SqliteRepo::insert_member(&tx, &outcome.member)?;
    for link in &outcome.parent_links {
        SqliteRepo::insert_parent_link(&tx, link)?;
    }
    if let Some(link) = &outcome.spouse_link {
        SqliteRepo::insert_spouse_link_if_absent(&tx, link)?;
    }

    tx.commit().map_err(from_rusqlite)?;

    Ok(outcome)
}

/// Get a member with parents, children and spouses resolved
///
/// ## Errors
///
/// - `NotFound`: unknown member
pub fn member_get(member_id: &str, conn: &Connection) -> Result<MemberDetail> {
    log_op_start!("member_get", member_id = member_id);
    let start = std::time::Instant::now();

    let result = member_get_impl(member_id, conn).map_err(|e| {
        log_op_error!(
            "member_get",
            e.clone(),
            duration_ms = start.elapsed().as_millis() as u64
        );
        e
    })?;

    log_op_end!("member_get", duration_ms = start.elapsed().as_millis() as u64);

    Ok(result)
}

fn member_get_impl(member_id: &str, conn: &Connection) -> Result<MemberDetail> {
    let member = SqliteRepo::get_member(conn, member_id)?.ok_or_else(|| {
        KinshipError::MemberNotFound {
            member_id: member_id.to_string(),
        }
    })?;
    let store = load_tree(conn, &member.tree_id)?;

    let mut parents: Vec<RelativeRef> = store
        .parents_of(member_id)
        .into_iter()
        .filter_map(|link| relative(&store, &link.parent_id, link.role))
        .collect();
    let mut children: Vec<RelativeRef> = store
        .children_of(member_id)
        .into_iter()
        .filter_map(|link| relative(&store, &link.child_id, link.role))
        .collect();
    let mut spouses: Vec<SpouseRef> = store
        .spouse_links_of(member_id)
        .into_iter()
        .filter_map(|link| {
            let partner = store.get_member(link.pair.partner_of(member_id)?).ok()?;
            Some(SpouseRef {
                person: partner.summary(),
                start_date: link.start_date,
                end_date: link.end_date,
            })
        })
        .collect();

    parents.sort_by(|a, b| person_key(&a.person).cmp(&person_key(&b.person)));
    children.sort_by(|a, b| person_key(&a.person).cmp(&person_key(&b.person)));
    spouses.sort_by(|a, b| person_key(&a.person).cmp(&person_key(&b.person)));

    Ok(MemberDetail {
        member,
        parents,
        children,
        spouses,
    })
}

fn relative(store: &Store, id: &str, role: ParentRole) -> Option<RelativeRef> {
    let member = store.get_member(id).ok()?;
    Some(RelativeRef {
        person: member.summary(),
        role,
    })
}

fn person_key(person: &PersonSummary) -> (Option<NaiveDate>, &str) {
    (person.birth_date, person.id.as_str())
}

/// Update a member's location and/or image reference
///
/// Location feeds the match index, so the member is queued for
/// re-indexing.
///
/// ## Errors
///
/// - `NotFound`: unknown member
pub fn member_update_profile(
    member_id: &str,
    location: Option<String>,
    image_ref: Option<String>,
    conn: &Connection,
    queue: &dyn MatchQueue,
) -> Result<Member> {
    log_op_start!("member_update_profile", member_id = member_id);
    let start = std::time::Instant::now();

    let result = member_update_profile_impl(member_id, location, image_ref, conn).map_err(|e| {
        log_op_error!(
            "member_update_profile",
            e.clone(),
            duration_ms = start.elapsed().as_millis() as u64
        );
        e
    })?;

    queue.enqueue(&result.id);

    log_op_end!(
        "member_update_profile",
        duration_ms = start.elapsed().as_millis() as u64
    );

    Ok(result)
}

fn member_update_profile_impl(
    member_id: &str,
    location: Option<String>,
    image_ref: Option<String>,
    conn: &Connection,
) -> Result<Member> {
    let not_found = || KinshipError::MemberNotFound {
        member_id: member_id.to_string(),
    };

    let location = location.map(|l| l.trim().to_string());
    let image_ref = image_ref.map(|i| i.trim().to_string());

    if !SqliteRepo::update_member_profile(conn, member_id, location.as_deref(), image_ref.as_deref())? {
        return Err(not_found().into());
    }

    Ok(SqliteRepo::get_member(conn, member_id)?.ok_or_else(not_found)?)
}

/// Delete a member
///
/// Parent and spouse links cascade in the schema. The member's index
/// entry is marked stale and every match referencing it is tombstoned,
/// in the same transaction.
///
/// ## Errors
///
/// - `NotFound`: unknown member
pub fn member_delete(member_id: &str, conn: &mut Connection) -> Result<DeleteOutcome> {
    log_op_start!("member_delete", member_id = member_id);
    let start = std::time::Instant::now();

    let result = member_delete_impl(member_id, conn).map_err(|e| {
        log_op_error!(
            "member_delete",
            e.clone(),
            duration_ms = start.elapsed().as_millis() as u64
        );
        e
    })?;

    log_op_end!(
        "member_delete",
        duration_ms = start.elapsed().as_millis() as u64,
        matches_tombstoned = result.matches_tombstoned
    );

    Ok(result)
}

fn member_delete_impl(member_id: &str, conn: &mut Connection) -> Result<DeleteOutcome> {
    let tx = write_tx(conn)?;

    let member = SqliteRepo::get_member(&tx, member_id)?.ok_or_else(|| {
        KinshipError::MemberNotFound {
            member_id: member_id.to_string(),
        }
    })?;

    let mut store = load_tree(&tx, &member.tree_id)?;
    let parent_links_before = store.parent_links().len();
    let spouse_links_before = store.spouse_links().count();
    store.remove_member(member_id)?;

    SqliteRepo::delete_member(&tx, member_id)?;
    let now = Utc::now();
    SqliteRepo::mark_match_index_stale(&tx, member_id, now)?;
    let matches_tombstoned = SqliteRepo::tombstone_matches_for_member(&tx, member_id, now)?;

    tx.commit().map_err(from_rusqlite)?;

    Ok(DeleteOutcome {
        member_id: member_id.to_string(),
        parent_links_removed: parent_links_before - store.parent_links().len(),
        spouse_links_removed: spouse_links_before - store.spouse_links().count(),
        matches_tombstoned,
    })
}
