use std::collections::{BTreeMap, HashMap};

use crate::errors::{KinshipError, Result};
use crate::model::{Member, ParentLink, SpouseLink, SpousePair};

/// In-memory relationship graph for one family tree
///
/// Holds the tree's members plus every parent and spouse link touching
/// them. The engine hydrates a Store from SQLite, applies one op, and
/// persists whatever the op returns. Not thread-safe; each command owns
/// its own Store.
#[derive(Debug, Clone, Default)]
pub struct Store {
    /// Map of member ID to Member
    pub(crate) members: HashMap<String, Member>,
    /// Parent links in insertion order
    pub(crate) parent_links: Vec<ParentLink>,
    /// Spouse links keyed by canonical pair
    pub(crate) spouse_links: BTreeMap<SpousePair, SpouseLink>,
}

impl Store {
    /// Create a new empty Store
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a member by ID
    ///
    /// # Errors
    ///
    /// Returns `MemberNotFound` if the member isn't loaded.
    pub fn get_member(&self, id: &str) -> Result<&Member> {
        self.members
            .get(id)
            .ok_or_else(|| KinshipError::MemberNotFound {
                member_id: id.to_string(),
            })
    }

    /// Check whether a member is loaded
    pub fn contains_member(&self, id: &str) -> bool {
        self.members.contains_key(id)
    }

    /// List all members in deterministic order (birth date, then id)
    pub fn list_members(&self) -> Vec<&Member> {
        let mut members: Vec<&Member> = self.members.values().collect();
        members.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
        members
    }

    /// Number of loaded members
    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    /// Insert a member
    pub fn insert_member(&mut self, member: Member) {
        self.members.insert(member.id.clone(), member);
    }

    /// Insert a parent link
    ///
    /// Performs no validation; ops check invariants before calling this.
    pub fn insert_parent_link(&mut self, link: ParentLink) {
        self.parent_links.push(link);
    }

    /// Insert or replace a spouse link
    pub fn insert_spouse_link(&mut self, link: SpouseLink) {
        self.spouse_links.insert(link.pair.clone(), link);
    }

    /// All parent links, in insertion order
    pub fn parent_links(&self) -> &[ParentLink] {
        &self.parent_links
    }

    /// All spouse links, in canonical pair order
    pub fn spouse_links(&self) -> impl Iterator<Item = &SpouseLink> {
        self.spouse_links.values()
    }

    /// Links naming `child_id` as the child
    pub fn parents_of(&self, child_id: &str) -> Vec<&ParentLink> {
        self.parent_links
            .iter()
            .filter(|l| l.child_id == child_id)
            .collect()
    }

    /// Links naming `parent_id` as the parent
    pub fn children_of(&self, parent_id: &str) -> Vec<&ParentLink> {
        self.parent_links
            .iter()
            .filter(|l| l.parent_id == parent_id)
            .collect()
    }

    /// Spouse link for the unordered pair, if any
    pub fn spouse_link(&self, pair: &SpousePair) -> Option<&SpouseLink> {
        self.spouse_links.get(pair)
    }

    /// Mutable spouse link for the unordered pair, if any
    pub fn spouse_link_mut(&mut self, pair: &SpousePair) -> Option<&mut SpouseLink> {
        self.spouse_links.get_mut(pair)
    }

    /// Spouse links (active or dissolved) touching a member
    pub fn spouse_links_of(&self, member_id: &str) -> Vec<&SpouseLink> {
        self.spouse_links
            .values()
            .filter(|l| l.pair.contains(member_id))
            .collect()
    }

    /// Remove a member and every link referencing it
    ///
    /// Mirrors the storage layer's cascade. Returns the removed member.
    pub fn remove_member(&mut self, id: &str) -> Result<Member> {
        let member = self
            .members
            .remove(id)
            .ok_or_else(|| KinshipError::MemberNotFound {
                member_id: id.to_string(),
            })?;
        self.parent_links
            .retain(|l| l.child_id != id && l.parent_id != id);
        self.spouse_links.retain(|pair, _| !pair.contains(id));
        Ok(member)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Gender, NewMember, ParentRole};
    use chrono::NaiveDate;

    fn member(id: &str) -> Member {
        Member::new(
            id.to_string(),
            "tree".to_string(),
            NewMember::new(id.to_uppercase(), Gender::Unknown),
            0,
        )
    }

    #[test]
    fn test_new_store() {
        let store = Store::new();
        assert_eq!(store.member_count(), 0);
        assert!(store.parent_links().is_empty());
    }

    #[test]
    fn test_get_nonexistent_member() {
        let store = Store::new();
        let result = store.get_member("nonexistent");
        assert!(matches!(result, Err(KinshipError::MemberNotFound { .. })));
    }

    #[test]
    fn test_parent_and_child_lookups() {
        let mut store = Store::new();
        store.insert_member(member("p"));
        store.insert_member(member("c"));
        store.insert_parent_link(ParentLink::new(
            "c".to_string(),
            "p".to_string(),
            ParentRole::Parent,
        ));

        assert_eq!(store.parents_of("c").len(), 1);
        assert_eq!(store.children_of("p").len(), 1);
        assert!(store.parents_of("p").is_empty());
    }

    #[test]
    fn test_remove_member_cascades_links() {
        let mut store = Store::new();
        for id in ["a", "b", "c"] {
            store.insert_member(member(id));
        }
        store.insert_parent_link(ParentLink::new(
            "c".to_string(),
            "a".to_string(),
            ParentRole::Parent,
        ));
        store.insert_spouse_link(SpouseLink::new(
            SpousePair::new("a", "b"),
            NaiveDate::from_ymd_opt(2001, 1, 1).unwrap(),
        ));

        store.remove_member("a").unwrap();

        assert!(store.parent_links().is_empty());
        assert_eq!(store.spouse_links().count(), 0);
        assert!(store.contains_member("b"));
    }
}
