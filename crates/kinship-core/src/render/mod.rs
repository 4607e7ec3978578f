pub mod family_tree;

pub use family_tree::{build_tree, RenderLimits, RenderWarning, RenderedTree, TreeNode};
