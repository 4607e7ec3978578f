//! Kinship Core - in-memory genealogical graph kernel
//!
//! This crate provides the I/O-free parts of the relationship graph engine:
//! - Member, parent-link, spouse-link and match models
//! - Relationship mutation ops that enforce the parent/spouse/sibling invariants
//! - Tree materialization into a cycle-safe, deterministically ordered forest
//! - Name normalization and confidence scoring for cross-tree ancestor matches
//!
//! Persistence lives in `kinship-store`; orchestration and the async matching
//! worker live in `kinship-engine`.

pub mod errors;
pub mod logging_facility;
pub mod matching;
pub mod model;
pub mod ops;
pub mod render;
pub mod rules;

// Re-export commonly used types
pub use errors::{ExError, ExErrorKind, KinshipError, Result};
pub use model::{
    FamilyTree, Gender, MatchIndexEntry, MatchRecord, Member, NewMember, ParentLink, ParentRole,
    PersonSummary, SpouseLink, SpousePair, User,
};
pub use ops::{RelationType, Store};
pub use render::{build_tree, RenderLimits, RenderWarning, RenderedTree, TreeNode};
