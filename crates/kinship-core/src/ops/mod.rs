pub mod relation_ops;
pub mod store;

pub use relation_ops::{
    add_member_with_relation, add_parent_link, end_spouse_link, link_spouses,
    AddMemberWithRelation, MutationOutcome, RelationType,
};
pub use store::Store;
