use chrono::NaiveDate;
use kinship_core::ops::{add_member_with_relation, AddMemberWithRelation, MutationOutcome};
use kinship_core::{Gender, KinshipError, Member, NewMember, RelationType, Store};
use uuid::Uuid;

pub const TREE_ID: &str = "tree-1";

/// Date used for spouse start dates in tests
#[allow(dead_code)]
pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
}

#[allow(dead_code)]
pub fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

/// Insert a standalone member at level 0, bypassing the ops
///
/// Returns the generated id.
#[allow(dead_code)]
pub fn insert_root(store: &mut Store, name: &str, gender: Gender) -> String {
    let id = Uuid::now_v7().to_string();
    store.insert_member(Member::new(
        id.clone(),
        TREE_ID.to_string(),
        NewMember::new(name, gender),
        0,
    ));
    id
}

/// Add a member related to `related_id` with the gender-derived role
#[allow(dead_code)]
pub fn add_related(
    store: &mut Store,
    related_id: &str,
    relation: RelationType,
    profile: NewMember,
) -> Result<MutationOutcome, KinshipError> {
    add_member_with_relation(
        store,
        &Uuid::now_v7().to_string(),
        AddMemberWithRelation {
            tree_id: TREE_ID.to_string(),
            related_member_id: related_id.to_string(),
            relation,
            profile,
            role: None,
        },
        today(),
    )
}
