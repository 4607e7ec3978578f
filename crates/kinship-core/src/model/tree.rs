use chrono::{DateTime, Utc};
use kinship_core_types::Sensitive;
use serde::{Deserialize, Serialize};

/// Owner of one or more family trees
///
/// Only the fields needed to own trees and receive match notices.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: String,
    pub name: Option<String>,
    pub email: Sensitive<String>,
}

impl User {
    pub fn new(id: String, name: Option<String>, email: String) -> Self {
        Self {
            id,
            name,
            email: Sensitive::new(email),
        }
    }

    /// Name used in notices, falling back to a generic greeting
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("User")
    }
}

/// A family tree owned by one user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FamilyTree {
    pub id: String,
    pub user_id: String,
    pub title: String,
    /// First member created with the tree (generation level 0)
    pub root_member_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl FamilyTree {
    pub fn new(id: String, user_id: String, title: String) -> Self {
        Self {
            id,
            user_id,
            title: title.trim().to_string(),
            root_member_id: None,
            created_at: Utc::now(),
        }
    }
}
