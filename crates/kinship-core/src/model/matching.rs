use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Denormalized, cross-tree searchable projection of one member
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchIndexEntry {
    pub member_id: String,
    pub user_id: String,
    pub tree_id: String,
    /// Case-folded, trimmed, whitespace-collapsed name
    pub normalized_name: String,
    pub generation_level: i32,
    pub birth_year_approx: Option<i32>,
    pub location: Option<String>,
}

/// Scored candidate pairing of two members from different users' trees
///
/// At most one non-tombstoned record exists per unordered member pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchRecord {
    pub id: String,
    pub member_a_id: String,
    pub member_b_id: String,
    pub tree_a_id: String,
    pub tree_b_id: String,
    /// Heuristic estimate in [0, 1] that both members are the same person
    pub confidence_score: f64,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tombstoned_at: Option<DateTime<Utc>>,
}

impl MatchRecord {
    /// Build a record for the pair (subject, candidate) in discovery order
    pub fn new(
        id: String,
        subject: &MatchIndexEntry,
        candidate: &MatchIndexEntry,
        confidence_score: f64,
    ) -> Self {
        Self {
            id,
            member_a_id: subject.member_id.clone(),
            member_b_id: candidate.member_id.clone(),
            tree_a_id: subject.tree_id.clone(),
            tree_b_id: candidate.tree_id.clone(),
            confidence_score,
            created_at: Utc::now(),
            tombstoned_at: None,
        }
    }

    /// Whether this record pairs the two members, in either order
    pub fn pairs(&self, x: &str, y: &str) -> bool {
        (self.member_a_id == x && self.member_b_id == y)
            || (self.member_a_id == y && self.member_b_id == x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(member_id: &str, tree_id: &str) -> MatchIndexEntry {
        MatchIndexEntry {
            member_id: member_id.to_string(),
            user_id: format!("user-of-{}", tree_id),
            tree_id: tree_id.to_string(),
            normalized_name: "john smith".to_string(),
            generation_level: 0,
            birth_year_approx: Some(1950),
            location: None,
        }
    }

    #[test]
    fn test_pairs_is_order_independent() {
        let record = MatchRecord::new("r1".to_string(), &entry("a", "t1"), &entry("b", "t2"), 1.0);
        assert!(record.pairs("a", "b"));
        assert!(record.pairs("b", "a"));
        assert!(!record.pairs("a", "c"));
    }

    #[test]
    fn test_record_serializes_public_shape() {
        let record = MatchRecord::new("r1".to_string(), &entry("a", "t1"), &entry("b", "t2"), 0.8);
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["memberAId"], "a");
        assert_eq!(json["memberBId"], "b");
        assert_eq!(json["treeAId"], "t1");
        assert_eq!(json["treeBId"], "t2");
        assert_eq!(json["confidenceScore"], 0.8);
        assert!(json.get("tombstonedAt").is_none());
    }
}
