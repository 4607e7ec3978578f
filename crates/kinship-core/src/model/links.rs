use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::errors::KinshipError;

/// Role a parent plays for a child
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParentRole {
    Father,
    Mother,
    /// Parent with no father/mother distinction
    Parent,
}

impl ParentRole {
    /// Stable storage tag
    pub fn as_str(&self) -> &'static str {
        match self {
            ParentRole::Father => "father",
            ParentRole::Mother => "mother",
            ParentRole::Parent => "parent",
        }
    }

    /// Whether at most one parent of a child may carry this role
    pub fn is_exclusive(&self) -> bool {
        matches!(self, ParentRole::Father | ParentRole::Mother)
    }
}

impl FromStr for ParentRole {
    type Err = KinshipError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "father" => Ok(ParentRole::Father),
            "mother" => Ok(ParentRole::Mother),
            "parent" => Ok(ParentRole::Parent),
            _ => Err(KinshipError::InvalidParentRole {
                value: s.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for ParentRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Directed edge child -> parent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParentLink {
    pub child_id: String,
    pub parent_id: String,
    pub role: ParentRole,
    pub created_at: DateTime<Utc>,
}

impl ParentLink {
    pub fn new(child_id: String, parent_id: String, role: ParentRole) -> Self {
        Self {
            child_id,
            parent_id,
            role,
            created_at: Utc::now(),
        }
    }
}

/// Unordered member pair stored with the lower-sorting id first
///
/// Construction always canonicalizes, so two `SpousePair`s built from the
/// same members in either order compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "StoredPair")]
pub struct SpousePair {
    first: String,
    second: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredPair {
    first: String,
    second: String,
}

impl From<StoredPair> for SpousePair {
    fn from(stored: StoredPair) -> Self {
        SpousePair::new(stored.first, stored.second)
    }
}

impl SpousePair {
    pub fn new(a: impl Into<String>, b: impl Into<String>) -> Self {
        let (a, b) = (a.into(), b.into());
        if a <= b {
            Self {
                first: a,
                second: b,
            }
        } else {
            Self {
                first: b,
                second: a,
            }
        }
    }

    pub fn first(&self) -> &str {
        &self.first
    }

    pub fn second(&self) -> &str {
        &self.second
    }

    pub fn contains(&self, member_id: &str) -> bool {
        self.first == member_id || self.second == member_id
    }

    /// The other member of the pair, if `member_id` is part of it
    pub fn partner_of(&self, member_id: &str) -> Option<&str> {
        if self.first == member_id {
            Some(&self.second)
        } else if self.second == member_id {
            Some(&self.first)
        } else {
            None
        }
    }
}

/// Undirected spouse edge; an end date marks a dissolved relationship
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpouseLink {
    pub pair: SpousePair,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
}

impl SpouseLink {
    pub fn new(pair: SpousePair, start_date: NaiveDate) -> Self {
        Self {
            pair,
            start_date,
            end_date: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.end_date.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spouse_pair_is_canonical() {
        let ab = SpousePair::new("b-2", "a-1");
        let ba = SpousePair::new("a-1", "b-2");
        assert_eq!(ab, ba);
        assert_eq!(ab.first(), "a-1");
        assert_eq!(ab.second(), "b-2");
    }

    #[test]
    fn test_spouse_pair_deserializes_canonically() {
        let pair: SpousePair =
            serde_json::from_str(r#"{"first":"zed","second":"amy"}"#).unwrap();
        assert_eq!(pair.first(), "amy");
        assert_eq!(pair.second(), "zed");
        assert_eq!(pair, SpousePair::new("amy", "zed"));
    }

    #[test]
    fn test_spouse_pair_partner_of() {
        let pair = SpousePair::new("x", "y");
        assert_eq!(pair.partner_of("x"), Some("y"));
        assert_eq!(pair.partner_of("y"), Some("x"));
        assert_eq!(pair.partner_of("z"), None);
    }

    #[test]
    fn test_parent_role_parse() {
        assert_eq!("FATHER".parse::<ParentRole>().unwrap(), ParentRole::Father);
        assert!("uncle".parse::<ParentRole>().is_err());
        assert!(ParentRole::Mother.is_exclusive());
        assert!(!ParentRole::Parent.is_exclusive());
    }

    #[test]
    fn test_spouse_link_activity() {
        let mut link = SpouseLink::new(
            SpousePair::new("a", "b"),
            NaiveDate::from_ymd_opt(2000, 6, 1).unwrap(),
        );
        assert!(link.is_active());
        link.end_date = NaiveDate::from_ymd_opt(2010, 1, 1);
        assert!(!link.is_active());
    }
}
