use thiserror::Error;

use crate::access::Capability;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("forbidden: {0:?} required")]
    Forbidden(Capability),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error(transparent)]
    Transition(#[from] TransitionError),
    #[error("database error: {0}")]
    Db(String),
    #[error("model error: {0}")]
    Model(#[from] models::errors::ModelError),
}

impl ServiceError {
    pub fn not_found(entity: &str) -> Self { Self::NotFound(format!("{} not found", entity)) }

    /// Lost compare-and-swap on a status column.
    pub fn concurrent_update(entity: &str) -> Self {
        Self::Conflict(format!("{} was modified concurrently", entity))
    }
}

/// Rejection from a status transition function.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("state {0} is terminal")]
    Terminal(String),
    #[error("no transition from {from} via {action}")]
    Invalid { from: String, action: String },
    #[error("role {role} may not perform {action}")]
    WrongRole { role: String, action: String },
}
