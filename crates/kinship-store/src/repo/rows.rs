//! Column encodings and row mappers shared by the repository

use chrono::{DateTime, NaiveDate, Utc};
use kinship_core::model::{
    FamilyTree, MatchIndexEntry, MatchRecord, Member, ParentLink, SpouseLink, SpousePair,
};
use kinship_core::KinshipError;
use rusqlite::types::Type;
use rusqlite::Row;
use std::str::FromStr;

const DATE_FORMAT: &str = "%Y-%m-%d";

pub const MEMBER_COLUMNS: &str = "m.id, m.tree_id, m.name, m.gender, m.birth_date, m.death_date, \
     m.location, m.image_ref, m.generation_level, m.created_at";

pub const TREE_COLUMNS: &str = "id, user_id, title, root_member_id, created_at";

pub const PARENT_LINK_COLUMNS: &str = "l.child_id, l.parent_id, l.role, l.created_at";

pub const SPOUSE_LINK_COLUMNS: &str = "s.first_id, s.second_id, s.start_date, s.end_date";

pub const INDEX_COLUMNS: &str = "member_id, user_id, tree_id, normalized_name, generation_level, \
     birth_year_approx, location";

pub const MATCH_COLUMNS: &str = "a.id, a.member_a_id, a.member_b_id, a.tree_a_id, a.tree_b_id, \
     a.confidence_score, a.created_at, a.tombstoned_at";

pub fn date_to_sql(date: Option<NaiveDate>) -> Option<String> {
    date.map(|d| d.format(DATE_FORMAT).to_string())
}

fn date_from_sql(idx: usize, value: Option<String>) -> rusqlite::Result<Option<NaiveDate>> {
    value
        .map(|s| {
            NaiveDate::parse_from_str(&s, DATE_FORMAT).map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e))
            })
        })
        .transpose()
}

fn timestamp_from_sql(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).unwrap_or_else(Utc::now)
}

fn tag_from_sql<T>(idx: usize, value: String) -> rusqlite::Result<T>
where
    T: FromStr<Err = KinshipError>,
{
    value
        .parse()
        .map_err(|e: KinshipError| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

pub fn member_from_row(row: &Row) -> rusqlite::Result<Member> {
    Ok(Member {
        id: row.get(0)?,
        tree_id: row.get(1)?,
        name: row.get(2)?,
        gender: tag_from_sql(3, row.get(3)?)?,
        birth_date: date_from_sql(4, row.get(4)?)?,
        death_date: date_from_sql(5, row.get(5)?)?,
        location: row.get(6)?,
        image_ref: row.get(7)?,
        generation_level: row.get(8)?,
        created_at: timestamp_from_sql(row.get(9)?),
    })
}

pub fn tree_from_row(row: &Row) -> rusqlite::Result<FamilyTree> {
    Ok(FamilyTree {
        id: row.get(0)?,
        user_id: row.get(1)?,
        title: row.get(2)?,
        root_member_id: row.get(3)?,
        created_at: timestamp_from_sql(row.get(4)?),
    })
}

pub fn parent_link_from_row(row: &Row) -> rusqlite::Result<ParentLink> {
    Ok(ParentLink {
        child_id: row.get(0)?,
        parent_id: row.get(1)?,
        role: tag_from_sql(2, row.get(2)?)?,
        created_at: timestamp_from_sql(row.get(3)?),
    })
}

pub fn spouse_link_from_row(row: &Row) -> rusqlite::Result<SpouseLink> {
    let first: String = row.get(0)?;
    let second: String = row.get(1)?;
    let start_date = date_from_sql(2, row.get(2)?)?
        .ok_or(rusqlite::Error::InvalidColumnType(2, "start_date".to_string(), Type::Null))?;
    Ok(SpouseLink {
        pair: SpousePair::new(first, second),
        start_date,
        end_date: date_from_sql(3, row.get(3)?)?,
    })
}

pub fn index_entry_from_row(row: &Row) -> rusqlite::Result<MatchIndexEntry> {
    Ok(MatchIndexEntry {
        member_id: row.get(0)?,
        user_id: row.get(1)?,
        tree_id: row.get(2)?,
        normalized_name: row.get(3)?,
        generation_level: row.get(4)?,
        birth_year_approx: row.get(5)?,
        location: row.get(6)?,
    })
}

pub fn match_from_row(row: &Row) -> rusqlite::Result<MatchRecord> {
    let tombstoned_at: Option<i64> = row.get(7)?;
    Ok(MatchRecord {
        id: row.get(0)?,
        member_a_id: row.get(1)?,
        member_b_id: row.get(2)?,
        tree_a_id: row.get(3)?,
        tree_b_id: row.get(4)?,
        confidence_score: row.get(5)?,
        created_at: timestamp_from_sql(row.get(6)?),
        tombstoned_at: tombstoned_at.map(timestamp_from_sql),
    })
}
