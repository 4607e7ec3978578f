/// Property tests over random relationship graphs
use kinship_core::ops::{add_parent_link, Store};
use kinship_core::rules::{invariants, validation};
use kinship_core::{
    build_tree, Gender, Member, NewMember, ParentLink, ParentRole, RenderLimits, SpouseLink,
    SpousePair,
};
use proptest::prelude::*;

const TREE: &str = "prop-tree";

fn store_with_members(count: usize) -> Store {
    let mut store = Store::new();
    for i in 0..count {
        let gender = match i % 3 {
            0 => Gender::Male,
            1 => Gender::Female,
            _ => Gender::Other,
        };
        store.insert_member(Member::new(
            format!("m{:02}", i),
            TREE.to_string(),
            NewMember::new(format!("Member {}", i), gender),
            0,
        ));
    }
    store
}

fn count_nodes(nodes: &[kinship_core::TreeNode]) -> usize {
    nodes.iter().map(|n| 1 + count_nodes(&n.children)).sum()
}

proptest! {
    #[test]
    fn prop_parent_invariants_hold_under_random_links(
        edges in prop::collection::vec((0usize..8, 0usize..8, 0u8..4), 0..40)
    ) {
        let mut store = store_with_members(8);
        for (child, parent, role) in edges {
            let role = match role {
                0 => Some(ParentRole::Father),
                1 => Some(ParentRole::Mother),
                2 => Some(ParentRole::Parent),
                _ => None,
            };
            // Rejections are expected; only the resulting graph matters
            let _ = add_parent_link(
                &mut store,
                &format!("m{:02}", child),
                &format!("m{:02}", parent),
                role,
            );
        }

        prop_assert!(validation::validate_graph(&store).is_ok());
        prop_assert!(invariants::find_children_with_too_many_parents(&store).is_empty());
        prop_assert!(invariants::find_duplicate_exclusive_roles(&store).is_empty());
        prop_assert_eq!(store.spouse_links().count(), 0);
    }

    #[test]
    fn prop_build_tree_never_panics_on_arbitrary_edges(
        parents in prop::collection::vec((0usize..10, 0usize..10), 0..40),
        spouses in prop::collection::vec((0usize..10, 0usize..10), 0..10),
    ) {
        let mut store = store_with_members(10);
        for (child, parent) in parents {
            store.insert_parent_link(ParentLink::new(
                format!("m{:02}", child),
                format!("m{:02}", parent),
                ParentRole::Parent,
            ));
        }
        for (a, b) in spouses {
            store.insert_spouse_link(SpouseLink::new(
                SpousePair::new(format!("m{:02}", a), format!("m{:02}", b)),
                chrono::NaiveDate::from_ymd_opt(2000, 1, 1).unwrap(),
            ));
        }

        let limits = RenderLimits { max_depth: 16, max_nodes: 5_000 };
        let rendered = build_tree(TREE, &store, limits);

        prop_assert!(count_nodes(&rendered.nodes) <= limits.max_nodes);
        prop_assert_eq!(rendered.tree_id.as_str(), TREE);
    }
}
