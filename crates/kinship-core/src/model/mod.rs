pub mod links;
pub mod matching;
pub mod member;
pub mod tree;

pub use links::{ParentLink, ParentRole, SpouseLink, SpousePair};
pub use matching::{MatchIndexEntry, MatchRecord};
pub use member::{Gender, Member, NewMember, PersonSummary};
pub use tree::{FamilyTree, User};
