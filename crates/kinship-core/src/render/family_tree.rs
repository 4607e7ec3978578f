use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use kinship_core_types::schema::{EVENT_BOUND_REACHED, EVENT_CYCLE_PRUNED};

use crate::model::{Gender, Member, PersonSummary};
use crate::ops::Store;

/// Construction bounds for one render
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderLimits {
    /// Generations emitted per branch; nodes at generation `max_depth - 1`
    /// (root = 0) are rendered without their children
    pub max_depth: usize,
    /// Total nodes emitted across the whole forest
    pub max_nodes: usize,
}

impl Default for RenderLimits {
    fn default() -> Self {
        Self {
            max_depth: 256,
            max_nodes: 100_000,
        }
    }
}

/// One member as placed in the rendered forest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeNode {
    pub id: String,
    pub name: String,
    pub gender: Gender,
    pub birth_date: Option<NaiveDate>,
    pub death_date: Option<NaiveDate>,
    pub location: Option<String>,
    pub image_url: Option<String>,
    /// Distance from this branch's root, not the stored creation-time level
    pub generation_level: i32,
    pub spouses: Vec<PersonSummary>,
    pub children: Vec<TreeNode>,
}

/// Something the renderer left out instead of failing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum RenderWarning {
    /// `member_id` was already on the current path below `parent_id`
    #[serde(rename_all = "camelCase")]
    CyclePruned { member_id: String, parent_id: String },
    /// Children of `member_id` were not expanded
    #[serde(rename_all = "camelCase")]
    DepthLimit { member_id: String },
    /// The node budget ran out; later branches are missing
    #[serde(rename_all = "camelCase")]
    NodeLimit { max_nodes: usize },
    /// Members with no parentless ancestor, left out of the forest
    #[serde(rename_all = "camelCase")]
    Unreachable { member_ids: Vec<String> },
}

/// Rendered forest for one tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedTree {
    pub tree_id: String,
    pub nodes: Vec<TreeNode>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<RenderWarning>,
}

impl RenderedTree {
    /// Whether any branch was pruned or cut short
    pub fn is_complete(&self) -> bool {
        self.warnings.is_empty()
    }
}

/// Materialize a tree's relationship graph into a forest of nested nodes
///
/// Roots are members with no parent inside the tree. Each root is rendered
/// depth-first; a member already on the current root-to-node path is pruned
/// (recorded as a warning, never an error). A member reachable from two
/// roots appears under both. Roots, children and spouses are ordered by
/// birth date (undated first), then id. Members only reachable through a
/// parent cycle with no parentless entry point are reported as unreachable.
///
/// Spouse links are included whether active or dissolved.
pub fn build_tree(tree_id: &str, store: &Store, limits: RenderLimits) -> RenderedTree {
    let members: HashMap<&str, &Member> = store
        .members
        .values()
        .filter(|m| m.tree_id == tree_id)
        .map(|m| (m.id.as_str(), m))
        .collect();

    let mut children: HashMap<&str, Vec<&Member>> = HashMap::new();
    let mut has_parent: HashSet<&str> = HashSet::new();
    for link in store.parent_links() {
        let (Some(child), Some(_)) = (
            members.get(link.child_id.as_str()).copied(),
            members.get(link.parent_id.as_str()),
        ) else {
            continue;
        };
        children.entry(link.parent_id.as_str()).or_default().push(child);
        has_parent.insert(child.id.as_str());
    }

    let mut spouses: HashMap<&str, Vec<&Member>> = HashMap::new();
    for link in store.spouse_links() {
        let (Some(first), Some(second)) = (
            members.get(link.pair.first()).copied(),
            members.get(link.pair.second()).copied(),
        ) else {
            continue;
        };
        spouses.entry(first.id.as_str()).or_default().push(second);
        spouses.entry(second.id.as_str()).or_default().push(first);
    }

    for list in children.values_mut().chain(spouses.values_mut()) {
        list.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
        list.dedup_by(|a, b| a.id == b.id);
    }

    let mut roots: Vec<&Member> = members
        .values()
        .copied()
        .filter(|m| !has_parent.contains(m.id.as_str()))
        .collect();
    roots.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));

    let mut reachable: HashSet<&str> = roots.iter().map(|m| m.id.as_str()).collect();
    let mut frontier: Vec<&str> = reachable.iter().copied().collect();
    while let Some(id) = frontier.pop() {
        for child in children.get(id).into_iter().flatten() {
            if reachable.insert(child.id.as_str()) {
                frontier.push(child.id.as_str());
            }
        }
    }
    let mut unreachable: Vec<&Member> = members
        .values()
        .copied()
        .filter(|m| !reachable.contains(m.id.as_str()))
        .collect();
    unreachable.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));

    let mut renderer = Renderer {
        tree_id,
        children,
        spouses,
        limits,
        path: HashSet::new(),
        emitted: 0,
        warnings: Vec::new(),
    };

    let nodes: Vec<TreeNode> = roots
        .into_iter()
        .filter_map(|root| renderer.render(root, None, 0))
        .collect();

    if !unreachable.is_empty() {
        let member_ids: Vec<String> = unreachable.iter().map(|m| m.id.clone()).collect();
        tracing::warn!(
            op = "build_tree",
            event = EVENT_CYCLE_PRUNED,
            tree_id,
            member_ids = ?member_ids,
            "parent cycle without a root, members left out"
        );
        renderer.warnings.push(RenderWarning::Unreachable { member_ids });
    }

    tracing::debug!(
        tree_id,
        root_count = nodes.len(),
        node_count = renderer.emitted,
        warning_count = renderer.warnings.len(),
        "tree built"
    );

    RenderedTree {
        tree_id: tree_id.to_string(),
        nodes,
        warnings: renderer.warnings,
    }
}

struct Renderer<'a> {
    tree_id: &'a str,
    children: HashMap<&'a str, Vec<&'a Member>>,
    spouses: HashMap<&'a str, Vec<&'a Member>>,
    limits: RenderLimits,
    /// Members on the current root-to-node path; popped on backtrack
    path: HashSet<&'a str>,
    emitted: usize,
    warnings: Vec<RenderWarning>,
}

impl<'a> Renderer<'a> {
    fn render(&mut self, member: &'a Member, parent: Option<&str>, depth: usize) -> Option<TreeNode> {
        let id = member.id.as_str();

        if self.path.contains(id) {
            let parent_id = parent.unwrap_or_default().to_string();
            tracing::warn!(
                op = "build_tree",
                event = EVENT_CYCLE_PRUNED,
                tree_id = self.tree_id,
                member_id = id,
                parent_id = %parent_id,
                "cycle in parent links, branch pruned"
            );
            self.warnings.push(RenderWarning::CyclePruned {
                member_id: id.to_string(),
                parent_id,
            });
            return None;
        }

        if self.emitted >= self.limits.max_nodes {
            if !self
                .warnings
                .iter()
                .any(|w| matches!(w, RenderWarning::NodeLimit { .. }))
            {
                tracing::warn!(
                    op = "build_tree",
                    event = EVENT_BOUND_REACHED,
                    tree_id = self.tree_id,
                    max_nodes = self.limits.max_nodes,
                    "node limit reached"
                );
                self.warnings.push(RenderWarning::NodeLimit {
                    max_nodes: self.limits.max_nodes,
                });
            }
            return None;
        }
        self.emitted += 1;

        let spouses = self
            .spouses
            .get(id)
            .map(|list| list.iter().map(|s| s.summary()).collect())
            .unwrap_or_default();

        let kids = self.children.get(id).cloned().unwrap_or_default();
        let mut rendered_children = Vec::with_capacity(kids.len());
        if !kids.is_empty() {
            if depth + 1 >= self.limits.max_depth {
                tracing::warn!(
                    op = "build_tree",
                    event = EVENT_BOUND_REACHED,
                    tree_id = self.tree_id,
                    member_id = id,
                    max_depth = self.limits.max_depth,
                    "depth limit reached"
                );
                self.warnings.push(RenderWarning::DepthLimit {
                    member_id: id.to_string(),
                });
            } else {
                self.path.insert(id);
                for child in kids {
                    if let Some(node) = self.render(child, Some(id), depth + 1) {
                        rendered_children.push(node);
                    }
                }
                self.path.remove(id);
            }
        }

        Some(TreeNode {
            id: member.id.clone(),
            name: member.name.clone(),
            gender: member.gender,
            birth_date: member.birth_date,
            death_date: member.death_date,
            location: member.location.clone(),
            image_url: member.image_ref.clone(),
            generation_level: i32::try_from(depth).unwrap_or(i32::MAX),
            spouses,
            children: rendered_children,
        })
    }
}
