use kinship_core_types::RequestId;
use thiserror::Error;

/// Result type alias using KinshipError
pub type Result<T> = std::result::Result<T, KinshipError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Every error that crosses a crate boundary is classified into one of these
/// kinds. Each kind maps to a stable code that callers (CLI, tests, any
/// future HTTP surface) can match on without parsing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Caller input validation
    InvalidInput,
    InvalidRelationType,
    NotFound,

    // Genealogical invariants
    TooManyParents,
    DuplicateRole,
    NoParentsToInherit,
    CrossTreeRelation,

    // Integration/IO
    Io,
    Persistence,
    ConstraintViolation,
    ExternalService,
    Config,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            ExErrorKind::InvalidRelationType => "ERR_INVALID_RELATION_TYPE",
            ExErrorKind::NotFound => "ERR_NOT_FOUND",
            ExErrorKind::TooManyParents => "ERR_TOO_MANY_PARENTS",
            ExErrorKind::DuplicateRole => "ERR_DUPLICATE_ROLE",
            ExErrorKind::NoParentsToInherit => "ERR_NO_PARENTS_TO_INHERIT",
            ExErrorKind::CrossTreeRelation => "ERR_CROSS_TREE_RELATION",
            ExErrorKind::Io => "ERR_IO",
            ExErrorKind::Persistence => "ERR_PERSISTENCE",
            ExErrorKind::ConstraintViolation => "ERR_CONSTRAINT_VIOLATION",
            ExErrorKind::ExternalService => "ERR_EXTERNAL_SERVICE",
            ExErrorKind::Config => "ERR_CONFIG",
        }
    }
}

/// Canonical structured error type
///
/// Carries a classification plus enough context (operation, entity id,
/// request id) to debug a failure from a single log line.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    entity_id: Option<String>,
    request_id: Option<RequestId>,
    message: String,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            entity_id: None,
            request_id: None,
            message: String::new(),
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add entity ID context
    pub fn with_entity_id(mut self, id: impl Into<String>) -> Self {
        self.entity_id = Some(id.into());
        self
    }

    /// Add request ID context
    pub fn with_request_id(mut self, request_id: RequestId) -> Self {
        self.request_id = Some(request_id);
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Get the error kind
    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// Get the operation context, if any
    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    /// Get the entity ID context, if any
    pub fn entity_id(&self) -> Option<&str> {
        self.entity_id.as_deref()
    }

    /// Get the request ID context, if any
    pub fn request_id(&self) -> Option<&RequestId> {
        self.request_id.as_ref()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(entity_id) = &self.entity_id {
            write!(f, " (entity_id: {})", entity_id)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {}

// ========== End Error Facility ==========

/// Domain error taxonomy for genealogical graph operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum KinshipError {
    // ===== Lookup Errors =====
    /// Member not found
    #[error("Member not found: {member_id}")]
    MemberNotFound { member_id: String },

    /// Family tree not found
    #[error("Family tree not found: {tree_id}")]
    TreeNotFound { tree_id: String },

    /// User not found
    #[error("User not found: {user_id}")]
    UserNotFound { user_id: String },

    /// No spouse link recorded for the pair
    #[error("No spouse link between {first} and {second}")]
    SpouseLinkNotFound { first: String, second: String },

    // ===== Input Errors =====
    /// Relation tag is not one of parent/child/spouse/sibling
    #[error("Invalid relation type: {value}")]
    InvalidRelationType { value: String },

    /// Gender tag is not one of male/female/other/unknown
    #[error("Invalid gender: {value}")]
    InvalidGender { value: String },

    /// Parent role tag is not one of father/mother/parent
    #[error("Invalid parent role: {value}")]
    InvalidParentRole { value: String },

    /// Name or title is blank
    #[error("Invalid name: {reason}")]
    InvalidName { reason: String },

    /// A member cannot be related to itself
    #[error("Member cannot be related to itself: {member_id}")]
    SelfRelation { member_id: String },

    /// Both ends of a relationship must live in the same tree
    #[error("Member {member_id} belongs to tree {actual_tree_id}, not {expected_tree_id}")]
    CrossTreeRelation {
        member_id: String,
        expected_tree_id: String,
        actual_tree_id: String,
    },

    // ===== Invariant Errors =====
    /// Child already has two parents
    #[error("Member {child_id} already has 2 parents")]
    TooManyParents { child_id: String },

    /// Child already has a parent with this role
    #[error("Member {child_id} already has a {role}")]
    DuplicateRole { child_id: String, role: String },

    /// Sibling add requires the related member to have parents
    #[error("Cannot add sibling: member {member_id} has no parents")]
    NoParentsToInherit { member_id: String },
}

impl From<KinshipError> for ExError {
    fn from(err: KinshipError) -> Self {
        match err {
            KinshipError::MemberNotFound { member_id } => ExError::new(ExErrorKind::NotFound)
                .with_entity_id(member_id)
                .with_message("Member not found"),

            KinshipError::TreeNotFound { tree_id } => ExError::new(ExErrorKind::NotFound)
                .with_entity_id(tree_id)
                .with_message("Family tree not found"),

            KinshipError::UserNotFound { user_id } => ExError::new(ExErrorKind::NotFound)
                .with_entity_id(user_id)
                .with_message("User not found"),

            KinshipError::SpouseLinkNotFound { first, second } => {
                ExError::new(ExErrorKind::NotFound)
                    .with_entity_id(first)
                    .with_message(format!("No spouse link with {}", second))
            }

            KinshipError::InvalidRelationType { value } => {
                ExError::new(ExErrorKind::InvalidRelationType)
                    .with_message(format!("Invalid relation type: {}", value))
            }

            KinshipError::InvalidGender { value } => ExError::new(ExErrorKind::InvalidInput)
                .with_message(format!("Invalid gender: {}", value)),

            KinshipError::InvalidParentRole { value } => ExError::new(ExErrorKind::InvalidInput)
                .with_message(format!("Invalid parent role: {}", value)),

            KinshipError::InvalidName { reason } => ExError::new(ExErrorKind::InvalidInput)
                .with_message(format!("Invalid name: {}", reason)),

            KinshipError::SelfRelation { member_id } => ExError::new(ExErrorKind::InvalidInput)
                .with_entity_id(member_id)
                .with_message("Member cannot be related to itself"),

            KinshipError::CrossTreeRelation {
                member_id,
                expected_tree_id,
                actual_tree_id,
            } => ExError::new(ExErrorKind::CrossTreeRelation)
                .with_entity_id(member_id)
                .with_message(format!(
                    "Member belongs to tree {}, not {}",
                    actual_tree_id, expected_tree_id
                )),

            KinshipError::TooManyParents { child_id } => ExError::new(ExErrorKind::TooManyParents)
                .with_entity_id(child_id)
                .with_message("Child already has 2 parents"),

            KinshipError::DuplicateRole { child_id, role } => {
                ExError::new(ExErrorKind::DuplicateRole)
                    .with_entity_id(child_id)
                    .with_message(format!("Child already has a {}", role))
            }

            KinshipError::NoParentsToInherit { member_id } => {
                ExError::new(ExErrorKind::NoParentsToInherit)
                    .with_entity_id(member_id)
                    .with_message("Cannot add sibling: related member has no parents")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invariant_error_kind_codes() {
        let cases = [
            (ExErrorKind::TooManyParents, "ERR_TOO_MANY_PARENTS"),
            (ExErrorKind::DuplicateRole, "ERR_DUPLICATE_ROLE"),
            (ExErrorKind::NoParentsToInherit, "ERR_NO_PARENTS_TO_INHERIT"),
            (ExErrorKind::InvalidRelationType, "ERR_INVALID_RELATION_TYPE"),
            (ExErrorKind::NotFound, "ERR_NOT_FOUND"),
        ];
        for (kind, expected_code) in cases {
            assert_eq!(kind.code(), expected_code, "Wrong code for {:?}", kind);
        }
    }

    #[test]
    fn test_member_not_found_maps_to_not_found() {
        let ex: ExError = KinshipError::MemberNotFound {
            member_id: "m1".to_string(),
        }
        .into();
        assert_eq!(ex.kind(), ExErrorKind::NotFound);
        assert_eq!(ex.entity_id(), Some("m1"));
    }

    #[test]
    fn test_display_includes_code_op_and_entity() {
        let err = ExError::new(ExErrorKind::DuplicateRole)
            .with_op("member_add")
            .with_entity_id("child-1")
            .with_message("Child already has a father");
        let text = err.to_string();
        assert!(text.starts_with("[ERR_DUPLICATE_ROLE]"));
        assert!(text.contains("member_add"));
        assert!(text.contains("child-1"));
    }
}
