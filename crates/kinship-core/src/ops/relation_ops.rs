use chrono::NaiveDate;
use serde::Serialize;
use std::str::FromStr;

use super::store::Store;
use crate::errors::{KinshipError, Result};
use crate::model::{Member, NewMember, ParentLink, ParentRole, SpouseLink, SpousePair};
use crate::rules::check_parent_slot;

/// How a new member relates to an existing one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelationType {
    /// New member is a parent of the related member
    Parent,
    /// New member is a child of the related member
    Child,
    /// New member is the related member's spouse
    Spouse,
    /// New member shares the related member's parents
    Sibling,
}

impl RelationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RelationType::Parent => "parent",
            RelationType::Child => "child",
            RelationType::Spouse => "spouse",
            RelationType::Sibling => "sibling",
        }
    }

    /// Generation offset of the new member from the related member
    pub fn generation_offset(&self) -> i32 {
        match self {
            RelationType::Parent => -1,
            RelationType::Child => 1,
            RelationType::Spouse | RelationType::Sibling => 0,
        }
    }
}

impl FromStr for RelationType {
    type Err = KinshipError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "parent" => Ok(RelationType::Parent),
            "child" => Ok(RelationType::Child),
            "spouse" => Ok(RelationType::Spouse),
            "sibling" => Ok(RelationType::Sibling),
            _ => Err(KinshipError::InvalidRelationType {
                value: s.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for RelationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request to create a member already connected to an existing one
#[derive(Debug, Clone)]
pub struct AddMemberWithRelation {
    /// Tree the caller believes the related member lives in
    pub tree_id: String,
    pub related_member_id: String,
    pub relation: RelationType,
    pub profile: NewMember,
    /// Overrides the gender-derived parent role (parent and child relations only)
    pub role: Option<ParentRole>,
}

/// Rows created by one mutation, ready to persist in one transaction
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MutationOutcome {
    pub member: Member,
    pub parent_links: Vec<ParentLink>,
    pub spouse_link: Option<SpouseLink>,
}

/// Create a member and the edges implied by its relation to an existing member
///
/// Every check runs before the store is touched, so a failure leaves the
/// store unchanged and no member is created.
///
/// # Arguments
/// * `store` - Graph of the related member's tree
/// * `new_id` - Identifier for the new member
/// * `cmd` - Relation request
/// * `today` - Start date for a spouse link
///
/// # Errors
/// * `MemberNotFound` - If the related member isn't loaded
/// * `CrossTreeRelation` - If the related member lives in another tree
/// * `InvalidName` - If the name is blank
/// * `TooManyParents` / `DuplicateRole` - If a parent slot is unavailable
/// * `NoParentsToInherit` - If a sibling's related member has no parents
pub fn add_member_with_relation(
    store: &mut Store,
    new_id: &str,
    cmd: AddMemberWithRelation,
    today: NaiveDate,
) -> Result<MutationOutcome> {
    let related = store.get_member(&cmd.related_member_id)?;

    if related.tree_id != cmd.tree_id {
        return Err(KinshipError::CrossTreeRelation {
            member_id: related.id.clone(),
            expected_tree_id: cmd.tree_id.clone(),
            actual_tree_id: related.tree_id.clone(),
        });
    }

    if cmd.profile.name.trim().is_empty() {
        return Err(KinshipError::InvalidName {
            reason: "name must not be blank".to_string(),
        });
    }

    let level = related.generation_level + cmd.relation.generation_offset();
    let related_id = related.id.clone();
    let related_gender = related.gender;
    let new_gender = cmd.profile.gender;

    let mut parent_links = Vec::new();
    let mut spouse_link = None;

    match cmd.relation {
        RelationType::Parent => {
            let role = cmd.role.unwrap_or_else(|| new_gender.default_parent_role());
            check_parent_slot(&related_id, &store.parents_of(&related_id), role)?;
            parent_links.push(ParentLink::new(related_id, new_id.to_string(), role));
        }
        RelationType::Child => {
            let role = cmd
                .role
                .unwrap_or_else(|| related_gender.default_parent_role());
            check_parent_slot(new_id, &[], role)?;
            parent_links.push(ParentLink::new(new_id.to_string(), related_id, role));
        }
        RelationType::Spouse => {
            spouse_link = Some(SpouseLink::new(SpousePair::new(new_id, related_id), today));
        }
        RelationType::Sibling => {
            let inherited = store.parents_of(&related_id);
            if inherited.is_empty() {
                return Err(KinshipError::NoParentsToInherit {
                    member_id: related_id,
                });
            }
            for link in inherited {
                let planned: Vec<&ParentLink> = parent_links.iter().collect();
                check_parent_slot(new_id, &planned, link.role)?;
                parent_links.push(ParentLink::new(
                    new_id.to_string(),
                    link.parent_id.clone(),
                    link.role,
                ));
            }
        }
    }

    let member = Member::new(new_id.to_string(), cmd.tree_id, cmd.profile, level);

    store.insert_member(member.clone());
    for link in &parent_links {
        store.insert_parent_link(link.clone());
    }
    if let Some(link) = &spouse_link {
        store.insert_spouse_link(link.clone());
    }

    tracing::debug!(
        member_id = %member.id,
        relation = cmd.relation.as_str(),
        edge_count = parent_links.len() + usize::from(spouse_link.is_some()),
        "member added with relation"
    );

    Ok(MutationOutcome {
        member,
        parent_links,
        spouse_link,
    })
}

/// Link two existing members as child and parent
///
/// Linking a pair that is already linked is a no-op and returns `None`.
///
/// # Errors
/// * `MemberNotFound` - If either member isn't loaded
/// * `SelfRelation` - If both ids are the same
/// * `CrossTreeRelation` - If the members live in different trees
/// * `TooManyParents` / `DuplicateRole` - If the parent slot is unavailable
pub fn add_parent_link(
    store: &mut Store,
    child_id: &str,
    parent_id: &str,
    role: Option<ParentRole>,
) -> Result<Option<ParentLink>> {
    if child_id == parent_id {
        return Err(KinshipError::SelfRelation {
            member_id: child_id.to_string(),
        });
    }

    let child = store.get_member(child_id)?;
    let parent = store.get_member(parent_id)?;
    ensure_same_tree(child, parent)?;

    let existing = store.parents_of(child_id);
    if existing.iter().any(|l| l.parent_id == parent_id) {
        return Ok(None);
    }

    let role = role.unwrap_or_else(|| parent.gender.default_parent_role());
    check_parent_slot(child_id, &existing, role)?;

    let link = ParentLink::new(child_id.to_string(), parent_id.to_string(), role);
    store.insert_parent_link(link.clone());
    Ok(Some(link))
}

/// Record two existing members as spouses
///
/// Returns the created link, or `None` when the pair already has one
/// (active or dissolved).
///
/// # Errors
/// * `MemberNotFound` - If either member isn't loaded
/// * `SelfRelation` - If both ids are the same
/// * `CrossTreeRelation` - If the members live in different trees
pub fn link_spouses(
    store: &mut Store,
    a: &str,
    b: &str,
    start_date: NaiveDate,
) -> Result<Option<SpouseLink>> {
    if a == b {
        return Err(KinshipError::SelfRelation {
            member_id: a.to_string(),
        });
    }

    ensure_same_tree(store.get_member(a)?, store.get_member(b)?)?;

    let pair = SpousePair::new(a, b);
    if store.spouse_link(&pair).is_some() {
        return Ok(None);
    }

    let link = SpouseLink::new(pair, start_date);
    store.insert_spouse_link(link.clone());
    Ok(Some(link))
}

/// Dissolve a spouse link by setting its end date
///
/// The link is kept. Ending an already-ended link overwrites the date.
///
/// # Errors
/// * `SpouseLinkNotFound` - If the pair has no link
pub fn end_spouse_link(
    store: &mut Store,
    a: &str,
    b: &str,
    end_date: NaiveDate,
) -> Result<SpouseLink> {
    let pair = SpousePair::new(a, b);
    let link = store
        .spouse_link_mut(&pair)
        .ok_or_else(|| KinshipError::SpouseLinkNotFound {
            first: pair.first().to_string(),
            second: pair.second().to_string(),
        })?;
    link.end_date = Some(end_date);
    Ok(link.clone())
}

fn ensure_same_tree(a: &Member, b: &Member) -> Result<()> {
    if a.tree_id != b.tree_id {
        return Err(KinshipError::CrossTreeRelation {
            member_id: b.id.clone(),
            expected_tree_id: a.tree_id.clone(),
            actual_tree_id: b.tree_id.clone(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Gender;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    }

    fn store_with_root(gender: Gender) -> Store {
        let mut store = Store::new();
        store.insert_member(Member::new(
            "root".to_string(),
            "t1".to_string(),
            NewMember::new("Root", gender),
            0,
        ));
        store
    }

    fn add(
        store: &mut Store,
        id: &str,
        related: &str,
        relation: RelationType,
        gender: Gender,
    ) -> Result<MutationOutcome> {
        add_member_with_relation(
            store,
            id,
            AddMemberWithRelation {
                tree_id: "t1".to_string(),
                related_member_id: related.to_string(),
                relation,
                profile: NewMember::new(id.to_uppercase(), gender),
                role: None,
            },
            day(),
        )
    }

    #[test]
    fn test_relation_type_parse() {
        assert_eq!("Sibling".parse::<RelationType>().unwrap(), RelationType::Sibling);
        assert!(matches!(
            "cousin".parse::<RelationType>(),
            Err(KinshipError::InvalidRelationType { .. })
        ));
    }

    #[test]
    fn test_parent_gets_role_from_own_gender() {
        let mut store = store_with_root(Gender::Unknown);
        let out = add(&mut store, "dad", "root", RelationType::Parent, Gender::Male).unwrap();
        assert_eq!(out.member.generation_level, -1);
        assert_eq!(out.parent_links[0].role, ParentRole::Father);
        assert_eq!(out.parent_links[0].child_id, "root");
    }

    #[test]
    fn test_child_gets_role_from_related_gender() {
        let mut store = store_with_root(Gender::Female);
        let out = add(&mut store, "kid", "root", RelationType::Child, Gender::Male).unwrap();
        assert_eq!(out.member.generation_level, 1);
        assert_eq!(out.parent_links[0].role, ParentRole::Mother);
        assert_eq!(out.parent_links[0].parent_id, "root");
    }

    #[test]
    fn test_cross_tree_request_rejected() {
        let mut store = store_with_root(Gender::Male);
        let result = add_member_with_relation(
            &mut store,
            "x",
            AddMemberWithRelation {
                tree_id: "other".to_string(),
                related_member_id: "root".to_string(),
                relation: RelationType::Spouse,
                profile: NewMember::new("X", Gender::Female),
                role: None,
            },
            day(),
        );
        assert!(matches!(result, Err(KinshipError::CrossTreeRelation { .. })));
        assert_eq!(store.member_count(), 1);
    }

    #[test]
    fn test_blank_name_rejected() {
        let mut store = store_with_root(Gender::Male);
        let result = add_member_with_relation(
            &mut store,
            "x",
            AddMemberWithRelation {
                tree_id: "t1".to_string(),
                related_member_id: "root".to_string(),
                relation: RelationType::Child,
                profile: NewMember::new("   ", Gender::Female),
                role: None,
            },
            day(),
        );
        assert!(matches!(result, Err(KinshipError::InvalidName { .. })));
    }

    #[test]
    fn test_add_parent_link_is_idempotent_for_same_pair() {
        let mut store = store_with_root(Gender::Unknown);
        add(&mut store, "dad", "root", RelationType::Parent, Gender::Male).unwrap();
        let again = add_parent_link(&mut store, "root", "dad", None).unwrap();
        assert!(again.is_none());
        assert_eq!(store.parents_of("root").len(), 1);
    }

    #[test]
    fn test_end_spouse_link_requires_link() {
        let mut store = store_with_root(Gender::Male);
        let result = end_spouse_link(&mut store, "root", "nobody", day());
        assert!(matches!(result, Err(KinshipError::SpouseLinkNotFound { .. })));
    }

    #[test]
    fn test_link_spouses_rejects_self() {
        let mut store = store_with_root(Gender::Male);
        let result = link_spouses(&mut store, "root", "root", day());
        assert!(matches!(result, Err(KinshipError::SelfRelation { .. })));
    }
}
