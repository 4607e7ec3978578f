use chrono::{Datelike, NaiveDate};

use crate::model::{MatchIndexEntry, Member};

/// Case-fold, trim and collapse internal whitespace runs to one space
pub fn normalize_name(name: &str) -> String {
    name.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Approximate birth year of a member
pub fn birth_year(birth_date: Option<NaiveDate>) -> Option<i32> {
    birth_date.map(|d| d.year())
}

/// Project a member into its searchable index entry
pub fn build_index_entry(member: &Member, user_id: &str) -> MatchIndexEntry {
    MatchIndexEntry {
        member_id: member.id.clone(),
        user_id: user_id.to_string(),
        tree_id: member.tree_id.clone(),
        normalized_name: normalize_name(&member.name),
        generation_level: member.generation_level,
        birth_year_approx: birth_year(member.birth_date),
        location: member.location.clone(),
    }
}
