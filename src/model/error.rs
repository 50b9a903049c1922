//! Errors raised while validating a family

use thiserror::Error;

/// Structural violations of the person identity invariant
///
/// Everything else about the relationship data is tolerated and normalized.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Two people share the same id
    #[error("a person with id '{id}' already exists")]
    DuplicateId { id: String },

    /// A person has an id that is empty after trimming
    #[error("person #{position} has an empty id")]
    EmptyId { position: usize },
}

impl ValidationError {
    pub fn duplicate(id: impl Into<String>) -> Self {
        Self::DuplicateId { id: id.into() }
    }
}
