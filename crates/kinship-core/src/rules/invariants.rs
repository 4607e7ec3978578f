use std::collections::{HashMap, HashSet};

use crate::errors::{KinshipError, Result};
use crate::model::{ParentLink, ParentRole};
use crate::ops::Store;

/// Maximum number of parent links a child may carry
pub const MAX_PARENTS: usize = 2;

/// Check that a child with `existing` parent links can take one more with `role`
///
/// # Errors
/// * `TooManyParents` - If the child already has two parents
/// * `DuplicateRole` - If `role` is father/mother and that role is taken
pub fn check_parent_slot(child_id: &str, existing: &[&ParentLink], role: ParentRole) -> Result<()> {
    if existing.len() >= MAX_PARENTS {
        return Err(KinshipError::TooManyParents {
            child_id: child_id.to_string(),
        });
    }

    if role.is_exclusive() && existing.iter().any(|l| l.role == role) {
        return Err(KinshipError::DuplicateRole {
            child_id: child_id.to_string(),
            role: role.to_string(),
        });
    }

    Ok(())
}

/// Find children with more than two parent links
///
/// Returns list of (child_id, parent_count) tuples
pub fn find_children_with_too_many_parents(store: &Store) -> Vec<(String, usize)> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for link in store.parent_links() {
        *counts.entry(link.child_id.as_str()).or_insert(0) += 1;
    }

    let mut violations: Vec<(String, usize)> = counts
        .into_iter()
        .filter(|(_, n)| *n > MAX_PARENTS)
        .map(|(id, n)| (id.to_string(), n))
        .collect();
    violations.sort();
    violations
}

/// Find children with two fathers or two mothers
///
/// Returns list of (child_id, role) tuples
pub fn find_duplicate_exclusive_roles(store: &Store) -> Vec<(String, ParentRole)> {
    let mut seen: HashSet<(&str, ParentRole)> = HashSet::new();
    let mut duplicates = Vec::new();

    for link in store.parent_links() {
        if !link.role.is_exclusive() {
            continue;
        }
        if !seen.insert((link.child_id.as_str(), link.role)) {
            duplicates.push((link.child_id.clone(), link.role));
        }
    }

    duplicates
}

/// Find members linked as their own parent
pub fn find_self_parent_links(store: &Store) -> Vec<String> {
    store
        .parent_links()
        .iter()
        .filter(|l| l.child_id == l.parent_id)
        .map(|l| l.child_id.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn link(child: &str, parent: &str, role: ParentRole) -> ParentLink {
        ParentLink::new(child.to_string(), parent.to_string(), role)
    }

    #[test]
    fn test_slot_rejects_third_parent() {
        let a = link("c", "a", ParentRole::Parent);
        let b = link("c", "b", ParentRole::Parent);
        let result = check_parent_slot("c", &[&a, &b], ParentRole::Parent);
        assert!(matches!(result, Err(KinshipError::TooManyParents { .. })));
    }

    #[test]
    fn test_slot_rejects_second_father() {
        let a = link("c", "a", ParentRole::Father);
        let result = check_parent_slot("c", &[&a], ParentRole::Father);
        assert!(matches!(result, Err(KinshipError::DuplicateRole { .. })));
    }

    #[test]
    fn test_slot_allows_two_unspecified_parents() {
        let a = link("c", "a", ParentRole::Parent);
        assert!(check_parent_slot("c", &[&a], ParentRole::Parent).is_ok());
    }
}
