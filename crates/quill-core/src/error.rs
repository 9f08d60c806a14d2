//! Domain-level error types.

use thiserror::Error;

/// Content errors - a submitted block list breaks a page invariant.
///
/// These are caller errors: they are reported before any write is planned
/// and are never retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContentError {
    #[error("Block positions must form the sequence 1..{expected}, got {positions:?}")]
    InvalidOrdering {
        expected: usize,
        positions: Vec<i32>,
    },

    #[error("A page needs at least one header and one paragraph or image block")]
    InsufficientContent,

    #[error("Unknown block reference: {0}")]
    UnknownBlockReference(String),
}

/// Domain errors - business logic failures.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound { entity_type: &'static str, id: i64 },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error(transparent)]
    Content(#[from] ContentError),

    #[error("Unauthorized access")]
    Unauthorized,

    #[error("Operation not permitted")]
    Forbidden,

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Repository-level errors.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Database connection failed: {0}")]
    Connection(String),

    #[error("Query execution failed: {0}")]
    Query(String),

    #[error("Entity not found")]
    NotFound,

    #[error("Constraint violation: {0}")]
    Constraint(String),
}
