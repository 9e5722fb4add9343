//! Error types for menu model operations

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MenuModelError {
    /// Bad input to a constructor or setter, or a child of the wrong kind
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// An argument with the same name already exists in the collection
    #[error("Duplicate name: {0}")]
    DuplicateName(String),

    /// A lookup by name found nothing
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Node not found: {0}")]
    NodeNotFound(Uuid),
}

pub type Result<T> = std::result::Result<T, MenuModelError>;
