use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::links::ParentRole;
use crate::errors::KinshipError;

/// Recorded gender of a member
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
    Unknown,
}

impl Gender {
    /// Stable storage tag
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Other => "other",
            Gender::Unknown => "unknown",
        }
    }

    /// Parent role implied by this gender when none is given explicitly
    pub fn default_parent_role(&self) -> ParentRole {
        match self {
            Gender::Male => ParentRole::Father,
            Gender::Female => ParentRole::Mother,
            Gender::Other | Gender::Unknown => ParentRole::Parent,
        }
    }
}

impl FromStr for Gender {
    type Err = KinshipError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "male" => Ok(Gender::Male),
            "female" => Ok(Gender::Female),
            "other" => Ok(Gender::Other),
            "unknown" => Ok(Gender::Unknown),
            _ => Err(KinshipError::InvalidGender {
                value: s.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for Gender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Member - a person node in exactly one family tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    /// Unique identifier (UUID v7)
    pub id: String,

    /// Owning tree
    pub tree_id: String,

    pub name: String,

    pub gender: Gender,

    pub birth_date: Option<NaiveDate>,

    pub death_date: Option<NaiveDate>,

    pub location: Option<String>,

    /// Reference to an uploaded portrait
    #[serde(rename = "imageUrl")]
    pub image_ref: Option<String>,

    /// Creation-time generation relative to the tree's first member (level 0).
    /// Rendering recomputes generation from traversal depth instead.
    pub generation_level: i32,

    pub created_at: DateTime<Utc>,
}

impl Member {
    /// Create a member from a profile at the given generation level
    pub fn new(id: String, tree_id: String, profile: NewMember, generation_level: i32) -> Self {
        Self {
            id,
            tree_id,
            name: profile.name.trim().to_string(),
            gender: profile.gender,
            birth_date: profile.birth_date,
            death_date: profile.death_date,
            location: profile.location,
            image_ref: profile.image_ref,
            generation_level,
            created_at: Utc::now(),
        }
    }

    /// Lightweight reference used for spouse lists and detail views
    pub fn summary(&self) -> PersonSummary {
        PersonSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            gender: self.gender,
            birth_date: self.birth_date,
            image_url: self.image_ref.clone(),
        }
    }

    /// Ordering key used wherever members are listed: birth date ascending
    /// (undated first), then id ascending.
    pub fn sort_key(&self) -> (Option<NaiveDate>, &str) {
        (self.birth_date, self.id.as_str())
    }
}

/// Identity fields supplied when creating a member
#[derive(Debug, Clone, PartialEq)]
pub struct NewMember {
    pub name: String,
    pub gender: Gender,
    pub birth_date: Option<NaiveDate>,
    pub death_date: Option<NaiveDate>,
    pub location: Option<String>,
    pub image_ref: Option<String>,
}

impl NewMember {
    /// Profile with only the required fields set
    pub fn new(name: impl Into<String>, gender: Gender) -> Self {
        Self {
            name: name.into(),
            gender,
            birth_date: None,
            death_date: None,
            location: None,
            image_ref: None,
        }
    }

    pub fn born(mut self, date: NaiveDate) -> Self {
        self.birth_date = Some(date);
        self
    }

    pub fn died(mut self, date: NaiveDate) -> Self {
        self.death_date = Some(date);
        self
    }

    pub fn at(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_image(mut self, image_ref: impl Into<String>) -> Self {
        self.image_ref = Some(image_ref.into());
        self
    }
}

/// Person summary: a leaf-like reference that is never expanded further
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonSummary {
    pub id: String,
    pub name: String,
    pub gender: Gender,
    pub birth_date: Option<NaiveDate>,
    pub image_url: Option<String>,
}
