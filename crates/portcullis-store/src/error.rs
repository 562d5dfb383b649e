//! Store error types.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors raised by an [`AccessStore`](crate::AccessStore) or by
/// provisioning a [`MemoryStore`](crate::MemoryStore).
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store cannot serve reads or writes right now.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// A role or permission name is already taken.
    #[error("{kind} name '{name}' already exists")]
    DuplicateName { kind: &'static str, name: String },

    /// A role name was rejected before reaching the store.
    #[error("invalid role name {0:?}")]
    InvalidRoleName(String),

    /// A referenced row does not exist.
    #[error("{kind} not found: {key}")]
    NotFound { kind: &'static str, key: String },

    /// A seed fixture could not be read.
    #[error("failed to read seed file at {path}: {source}")]
    SeedRead {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A seed fixture could not be parsed or applied.
    #[error("invalid seed: {0}")]
    Seed(String),

    /// Failure reported by a backing database.
    #[error("backend error: {0}")]
    Backend(String),
}

impl StoreError {
    pub(crate) fn not_found(kind: &'static str, key: impl ToString) -> Self {
        Self::NotFound {
            kind,
            key: key.to_string(),
        }
    }

    pub(crate) fn duplicate(kind: &'static str, name: impl Into<String>) -> Self {
        Self::DuplicateName {
            kind,
            name: name.into(),
        }
    }

    /// Returns true if the error is a missing row rather than a store fault.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
