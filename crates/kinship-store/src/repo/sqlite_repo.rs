//! SQLite repository implementation
//!
//! Row-level reads and writes for every table. All functions take a
//! `&Connection`; pass `&tx` to run them inside a transaction.

use chrono::{DateTime, NaiveDate, Utc};
use kinship_core::matching::CandidateFilter;
use kinship_core::model::{
    FamilyTree, MatchIndexEntry, MatchRecord, Member, ParentLink, SpouseLink, SpousePair, User,
};
use kinship_core_types::Sensitive;
use rusqlite::{params, Connection, OptionalExtension};

use super::rows::{
    date_to_sql, index_entry_from_row, match_from_row, member_from_row, parent_link_from_row,
    spouse_link_from_row, tree_from_row, INDEX_COLUMNS, MATCH_COLUMNS, MEMBER_COLUMNS,
    PARENT_LINK_COLUMNS, SPOUSE_LINK_COLUMNS, TREE_COLUMNS,
};
use crate::errors::{from_rusqlite, Result};

/// SQLite repository for the relationship graph and match state
pub struct SqliteRepo;

impl SqliteRepo {
    // ===== Users =====

    /// Persist a new user
    pub fn insert_user(conn: &Connection, user: &User) -> Result<()> {
        conn.execute(
            "INSERT INTO users (id, name, email, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![
                user.id,
                user.name,
                user.email.expose(),
                Utc::now().timestamp()
            ],
        )
        .map_err(from_rusqlite)?;

        Ok(())
    }

    /// Get a user by ID
    pub fn get_user(conn: &Connection, user_id: &str) -> Result<Option<User>> {
        conn.query_row(
            "SELECT id, name, email FROM users WHERE id = ?",
            [user_id],
            |row| {
                Ok(User {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    email: Sensitive::new(row.get(2)?),
                })
            },
        )
        .optional()
        .map_err(from_rusqlite)
    }

    // ===== Trees =====

    /// Persist a new family tree
    pub fn insert_tree(conn: &Connection, tree: &FamilyTree) -> Result<()> {
        conn.execute(
            "INSERT INTO family_trees (id, user_id, title, root_member_id, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                tree.id,
                tree.user_id,
                tree.title,
                tree.root_member_id,
                tree.created_at.timestamp()
            ],
        )
        .map_err(from_rusqlite)?;

        Ok(())
    }

    /// Point a tree at its first member
    pub fn set_tree_root(conn: &Connection, tree_id: &str, member_id: &str) -> Result<bool> {
        let changed = conn
            .execute(
                "UPDATE family_trees SET root_member_id = ?1 WHERE id = ?2",
                params![member_id, tree_id],
            )
            .map_err(from_rusqlite)?;

        Ok(changed > 0)
    }

    /// Get a tree by ID
    pub fn get_tree(conn: &Connection, tree_id: &str) -> Result<Option<FamilyTree>> {
        conn.query_row(
            &format!("SELECT {} FROM family_trees WHERE id = ?", TREE_COLUMNS),
            [tree_id],
            tree_from_row,
        )
        .optional()
        .map_err(from_rusqlite)
    }

    /// Trees owned by a user, newest first
    pub fn list_trees_for_user(conn: &Connection, user_id: &str) -> Result<Vec<FamilyTree>> {
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {} FROM family_trees WHERE user_id = ? ORDER BY created_at DESC, id DESC",
                TREE_COLUMNS
            ))
            .map_err(from_rusqlite)?;

        let trees = stmt
            .query_map([user_id], tree_from_row)
            .map_err(from_rusqlite)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(from_rusqlite)?;

        Ok(trees)
    }

    // ===== Members =====

    /// Persist a new member
    pub fn insert_member(conn: &Connection, member: &Member) -> Result<()> {
        conn.execute(
            "INSERT INTO members (id, tree_id, name, gender, birth_date, death_date, location,
                                  image_ref, generation_level, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                member.id,
                member.tree_id,
                member.name,
                member.gender.as_str(),
                date_to_sql(member.birth_date),
                date_to_sql(member.death_date),
                member.location,
                member.image_ref,
                member.generation_level,
                member.created_at.timestamp(),
            ],
        )
        .map_err(from_rusqlite)?;

        Ok(())
    }

    /// Get a member by ID
    pub fn get_member(conn: &Connection, member_id: &str) -> Result<Option<Member>> {
        conn.query_row(
            &format!("SELECT {} FROM members m WHERE m.id = ?", MEMBER_COLUMNS),
            [member_id],
            member_from_row,
        )
        .optional()
        .map_err(from_rusqlite)
    }

    /// Get a member together with the id of the user owning its tree
    pub fn get_member_with_owner(
        conn: &Connection,
        member_id: &str,
    ) -> Result<Option<(Member, String)>> {
        conn.query_row(
            &format!(
                "SELECT {}, t.user_id FROM members m
                 JOIN family_trees t ON t.id = m.tree_id
                 WHERE m.id = ?",
                MEMBER_COLUMNS
            ),
            [member_id],
            |row| Ok((member_from_row(row)?, row.get(10)?)),
        )
        .optional()
        .map_err(from_rusqlite)
    }

    /// All members of a tree, ordered by ID
    pub fn list_members_for_tree(conn: &Connection, tree_id: &str) -> Result<Vec<Member>> {
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {} FROM members m WHERE m.tree_id = ? ORDER BY m.id",
                MEMBER_COLUMNS
            ))
            .map_err(from_rusqlite)?;

        let members = stmt
            .query_map([tree_id], member_from_row)
            .map_err(from_rusqlite)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(from_rusqlite)?;

        Ok(members)
    }

    /// Update location and/or image reference; `None` leaves a field as is
    ///
    /// Returns false if the member doesn't exist.
    pub fn update_member_profile(
        conn: &Connection,
        member_id: &str,
        location: Option<&str>,
        image_ref: Option<&str>,
    ) -> Result<bool> {
        let changed = conn
            .execute(
                "UPDATE members
                 SET location = COALESCE(?2, location),
                     image_ref = COALESCE(?3, image_ref)
                 WHERE id = ?1",
                params![member_id, location, image_ref],
            )
            .map_err(from_rusqlite)?;

        Ok(changed > 0)
    }

    /// Delete a member; links cascade via foreign keys
    ///
    /// Returns false if the member doesn't exist.
    pub fn delete_member(conn: &Connection, member_id: &str) -> Result<bool> {
        let changed = conn
            .execute("DELETE FROM members WHERE id = ?", [member_id])
            .map_err(from_rusqlite)?;

        Ok(changed > 0)
    }

    // ===== Parent links =====

    /// Persist a parent link
    ///
    /// A third parent or a second father/mother fails with
    /// `ConstraintViolation`.
    pub fn insert_parent_link(conn: &Connection, link: &ParentLink) -> Result<()> {
        conn.execute(
            "INSERT INTO parent_links (child_id, parent_id, role, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                link.child_id,
                link.parent_id,
                link.role.as_str(),
                link.created_at.timestamp()
            ],
        )
        .map_err(from_rusqlite)?;

        Ok(())
    }

    /// Parent links of a child
    pub fn find_parent_links(conn: &Connection, child_id: &str) -> Result<Vec<ParentLink>> {
        Self::query_parent_links(
            conn,
            "WHERE l.child_id = ?1 ORDER BY l.created_at, l.parent_id",
            child_id,
        )
    }

    /// Links naming `parent_id` as the parent
    pub fn find_child_links(conn: &Connection, parent_id: &str) -> Result<Vec<ParentLink>> {
        Self::query_parent_links(
            conn,
            "WHERE l.parent_id = ?1 ORDER BY l.created_at, l.child_id",
            parent_id,
        )
    }

    /// Parent links touching any member of a tree
    pub fn list_parent_links_for_tree(conn: &Connection, tree_id: &str) -> Result<Vec<ParentLink>> {
        Self::query_parent_links(
            conn,
            "WHERE l.child_id IN (SELECT id FROM members WHERE tree_id = ?1)
                OR l.parent_id IN (SELECT id FROM members WHERE tree_id = ?1)
             ORDER BY l.created_at, l.child_id, l.parent_id",
            tree_id,
        )
    }

    fn query_parent_links(conn: &Connection, clause: &str, arg: &str) -> Result<Vec<ParentLink>> {
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {} FROM parent_links l {}",
                PARENT_LINK_COLUMNS, clause
            ))
            .map_err(from_rusqlite)?;

        let links = stmt
            .query_map([arg], parent_link_from_row)
            .map_err(from_rusqlite)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(from_rusqlite)?;

        Ok(links)
    }

    // ===== Spouse links =====

    /// Persist a spouse link unless the pair already has one
    ///
    /// Returns true if a row was written. The primary key on the canonical
    /// pair makes this safe against concurrent writers.
    pub fn insert_spouse_link_if_absent(conn: &Connection, link: &SpouseLink) -> Result<bool> {
        let changed = conn
            .execute(
                "INSERT INTO spouse_links (first_id, second_id, start_date, end_date)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT DO NOTHING",
                params![
                    link.pair.first(),
                    link.pair.second(),
                    date_to_sql(Some(link.start_date)),
                    date_to_sql(link.end_date),
                ],
            )
            .map_err(from_rusqlite)?;

        Ok(changed > 0)
    }

    /// Get the spouse link for an unordered pair
    pub fn get_spouse_link(conn: &Connection, pair: &SpousePair) -> Result<Option<SpouseLink>> {
        conn.query_row(
            &format!(
                "SELECT {} FROM spouse_links s WHERE s.first_id = ?1 AND s.second_id = ?2",
                SPOUSE_LINK_COLUMNS
            ),
            params![pair.first(), pair.second()],
            spouse_link_from_row,
        )
        .optional()
        .map_err(from_rusqlite)
    }

    /// Set the end date on an existing spouse link
    ///
    /// Returns false if the pair has no link.
    pub fn set_spouse_end_date(
        conn: &Connection,
        pair: &SpousePair,
        end_date: NaiveDate,
    ) -> Result<bool> {
        let changed = conn
            .execute(
                "UPDATE spouse_links SET end_date = ?3 WHERE first_id = ?1 AND second_id = ?2",
                params![pair.first(), pair.second(), date_to_sql(Some(end_date))],
            )
            .map_err(from_rusqlite)?;

        Ok(changed > 0)
    }

    /// Spouse links (active or dissolved) touching a member
    pub fn find_spouse_links(conn: &Connection, member_id: &str) -> Result<Vec<SpouseLink>> {
        Self::query_spouse_links(
            conn,
            "WHERE s.first_id = ?1 OR s.second_id = ?1 ORDER BY s.start_date, s.first_id, s.second_id",
            member_id,
        )
    }

    /// Spouse links touching any member of a tree
    pub fn list_spouse_links_for_tree(conn: &Connection, tree_id: &str) -> Result<Vec<SpouseLink>> {
        Self::query_spouse_links(
            conn,
            "WHERE s.first_id IN (SELECT id FROM members WHERE tree_id = ?1)
                OR s.second_id IN (SELECT id FROM members WHERE tree_id = ?1)
             ORDER BY s.first_id, s.second_id",
            tree_id,
        )
    }

    fn query_spouse_links(conn: &Connection, clause: &str, arg: &str) -> Result<Vec<SpouseLink>> {
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {} FROM spouse_links s {}",
                SPOUSE_LINK_COLUMNS, clause
            ))
            .map_err(from_rusqlite)?;

        let links = stmt
            .query_map([arg], spouse_link_from_row)
            .map_err(from_rusqlite)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(from_rusqlite)?;

        Ok(links)
    }

    // ===== Match index =====

    /// Insert or refresh the index entry for a member
    ///
    /// Refreshing clears any stale mark.
    pub fn upsert_match_index_entry(conn: &Connection, entry: &MatchIndexEntry) -> Result<()> {
        conn.execute(
            "INSERT INTO match_index (member_id, user_id, tree_id, normalized_name,
                                      generation_level, birth_year_approx, location, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             ON CONFLICT(member_id) DO UPDATE SET
                user_id = excluded.user_id,
                tree_id = excluded.tree_id,
                normalized_name = excluded.normalized_name,
                generation_level = excluded.generation_level,
                birth_year_approx = excluded.birth_year_approx,
                location = excluded.location,
                updated_at = excluded.updated_at,
                stale_at = NULL",
            params![
                entry.member_id,
                entry.user_id,
                entry.tree_id,
                entry.normalized_name,
                entry.generation_level,
                entry.birth_year_approx,
                entry.location,
                Utc::now().timestamp(),
            ],
        )
        .map_err(from_rusqlite)?;

        Ok(())
    }

    /// Get the live (not stale) index entry for a member
    pub fn get_match_index_entry(
        conn: &Connection,
        member_id: &str,
    ) -> Result<Option<MatchIndexEntry>> {
        conn.query_row(
            &format!(
                "SELECT {} FROM match_index WHERE member_id = ? AND stale_at IS NULL",
                INDEX_COLUMNS
            ),
            [member_id],
            index_entry_from_row,
        )
        .optional()
        .map_err(from_rusqlite)
    }

    /// Live index entries satisfying a candidate filter, ordered by member ID
    pub fn find_match_candidates(
        conn: &Connection,
        filter: &CandidateFilter,
    ) -> Result<Vec<MatchIndexEntry>> {
        let (lo, hi) = filter.birth_year_range.unzip();
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {} FROM match_index
                 WHERE stale_at IS NULL
                   AND member_id <> ?1
                   AND user_id <> ?2
                   AND normalized_name = ?3
                   AND (?4 IS NULL OR birth_year_approx BETWEEN ?4 AND ?5)
                 ORDER BY member_id",
                INDEX_COLUMNS
            ))
            .map_err(from_rusqlite)?;

        let entries = stmt
            .query_map(
                params![
                    filter.member_id,
                    filter.exclude_user_id,
                    filter.normalized_name,
                    lo,
                    hi
                ],
                index_entry_from_row,
            )
            .map_err(from_rusqlite)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(from_rusqlite)?;

        Ok(entries)
    }

    /// Mark a member's index entry stale so it stops matching
    pub fn mark_match_index_stale(
        conn: &Connection,
        member_id: &str,
        at: DateTime<Utc>,
    ) -> Result<bool> {
        let changed = conn
            .execute(
                "UPDATE match_index SET stale_at = ?2 WHERE member_id = ?1 AND stale_at IS NULL",
                params![member_id, at.timestamp()],
            )
            .map_err(from_rusqlite)?;

        Ok(changed > 0)
    }

    // ===== Ancestor matches =====

    /// Existing record for the unordered pair, tombstoned or not
    pub fn find_existing_match(
        conn: &Connection,
        member_x: &str,
        member_y: &str,
    ) -> Result<Option<MatchRecord>> {
        conn.query_row(
            &format!(
                "SELECT {} FROM ancestor_matches a
                 WHERE (a.member_a_id = ?1 AND a.member_b_id = ?2)
                    OR (a.member_a_id = ?2 AND a.member_b_id = ?1)",
                MATCH_COLUMNS
            ),
            params![member_x, member_y],
            match_from_row,
        )
        .optional()
        .map_err(from_rusqlite)
    }

    /// Persist a match unless the unordered pair already has one
    ///
    /// Returns false when another writer got there first; the unique
    /// pair index is what decides.
    pub fn insert_match_if_absent(conn: &Connection, record: &MatchRecord) -> Result<bool> {
        let changed = conn
            .execute(
                "INSERT INTO ancestor_matches (id, member_a_id, member_b_id, tree_a_id, tree_b_id,
                                               confidence_score, created_at, tombstoned_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                 ON CONFLICT DO NOTHING",
                params![
                    record.id,
                    record.member_a_id,
                    record.member_b_id,
                    record.tree_a_id,
                    record.tree_b_id,
                    record.confidence_score,
                    record.created_at.timestamp(),
                    record.tombstoned_at.map(|t| t.timestamp()),
                ],
            )
            .map_err(from_rusqlite)?;

        Ok(changed > 0)
    }

    /// Tombstone every live match referencing a member
    ///
    /// Returns the number of records tombstoned.
    pub fn tombstone_matches_for_member(
        conn: &Connection,
        member_id: &str,
        at: DateTime<Utc>,
    ) -> Result<usize> {
        conn.execute(
            "UPDATE ancestor_matches SET tombstoned_at = ?2
             WHERE (member_a_id = ?1 OR member_b_id = ?1) AND tombstoned_at IS NULL",
            params![member_id, at.timestamp()],
        )
        .map_err(from_rusqlite)
    }

    /// Live matches touching any tree owned by a user, best first
    pub fn list_matches_for_user(conn: &Connection, user_id: &str) -> Result<Vec<MatchRecord>> {
        Self::query_matches(
            conn,
            "WHERE a.tombstoned_at IS NULL
               AND (a.tree_a_id IN (SELECT id FROM family_trees WHERE user_id = ?1)
                 OR a.tree_b_id IN (SELECT id FROM family_trees WHERE user_id = ?1))",
            user_id,
        )
    }

    /// Live matches touching one tree, best first
    pub fn list_matches_for_tree(conn: &Connection, tree_id: &str) -> Result<Vec<MatchRecord>> {
        Self::query_matches(
            conn,
            "WHERE a.tombstoned_at IS NULL AND (a.tree_a_id = ?1 OR a.tree_b_id = ?1)",
            tree_id,
        )
    }

    fn query_matches(conn: &Connection, clause: &str, arg: &str) -> Result<Vec<MatchRecord>> {
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {} FROM ancestor_matches a {}
                 ORDER BY a.confidence_score DESC, a.created_at DESC, a.id",
                MATCH_COLUMNS, clause
            ))
            .map_err(from_rusqlite)?;

        let records = stmt
            .query_map([arg], match_from_row)
            .map_err(from_rusqlite)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(from_rusqlite)?;

        Ok(records)
    }
}
