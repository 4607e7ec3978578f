use crate::errors::{KinshipError, Result};
use crate::ops::Store;

use super::invariants;

/// Validate the parent-link invariants of a loaded graph
///
/// Checks, in order:
/// 1. No member is its own parent
/// 2. No child has more than two parents
/// 3. No child has two fathers or two mothers
///
/// Spouse-pair uniqueness holds structurally (links are keyed by canonical
/// pair) and is not re-checked here. Ancestor cycles are tolerated.
///
/// # Errors
/// Returns the first violation found. For exhaustive reporting call the
/// individual invariant functions directly.
pub fn validate_graph(store: &Store) -> Result<()> {
    if let Some(member_id) = invariants::find_self_parent_links(store).into_iter().next() {
        return Err(KinshipError::SelfRelation { member_id });
    }

    if let Some((child_id, _)) = invariants::find_children_with_too_many_parents(store)
        .into_iter()
        .next()
    {
        return Err(KinshipError::TooManyParents { child_id });
    }

    if let Some((child_id, role)) = invariants::find_duplicate_exclusive_roles(store)
        .into_iter()
        .next()
    {
        return Err(KinshipError::DuplicateRole {
            child_id,
            role: role.to_string(),
        });
    }

    Ok(())
}
