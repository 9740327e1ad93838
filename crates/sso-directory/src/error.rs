//! Directory error types.

use thiserror::Error;

/// Errors surfaced by the remote directory service.
///
/// The remote store signals outcomes through a small status set; everything
/// outside it maps to [`DirectoryError::Unexpected`] and is propagated
/// as-is, never swallowed.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// Entity absent where the operation requires it.
    #[error("{entity} not found: {key}")]
    NotFound {
        /// Kind of entity (e.g. "user", "group").
        entity: &'static str,
        /// Lookup key that failed to resolve.
        key: String,
    },

    /// Unique-constraint conflict reported by the store.
    #[error("{entity} conflict: {key}")]
    Conflict {
        /// Kind of entity.
        entity: &'static str,
        /// Conflicting key.
        key: String,
    },

    /// The store rejected the payload as malformed or policy-violating.
    #[error("invalid data: {0}")]
    InvalidData(String),

    /// Transport-level failure reaching the store.
    #[error("connection error: {0}")]
    Connection(String),

    /// A response outside the modeled status set.
    #[error("unexpected directory response: status {status}")]
    Unexpected {
        /// Raw status code of the response.
        status: u16,
    },
}

impl DirectoryError {
    /// Creates a not-found error.
    #[must_use]
    pub fn not_found(entity: &'static str, key: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            key: key.into(),
        }
    }

    /// Creates a conflict error.
    #[must_use]
    pub fn conflict(entity: &'static str, key: impl Into<String>) -> Self {
        Self::Conflict {
            entity,
            key: key.into(),
        }
    }

    /// Creates an unexpected-response error.
    #[must_use]
    pub const fn unexpected(status: u16) -> Self {
        Self::Unexpected { status }
    }

    /// Checks if this is a not-found error.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Checks if this is a conflict error.
    #[must_use]
    pub const fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }
}

/// Result type for directory operations.
pub type DirectoryResult<T> = Result<T, DirectoryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_error() {
        let err = DirectoryError::not_found("user", "generated-C1");

        assert!(err.is_not_found());
        assert!(!err.is_conflict());
        assert!(err.to_string().contains("generated-C1"));
    }

    #[test]
    fn conflict_error() {
        let err = DirectoryError::conflict("group", "/Accounts/ACME");

        assert!(err.is_conflict());
        assert!(err.to_string().contains("/Accounts/ACME"));
    }

    #[test]
    fn unexpected_keeps_status() {
        let err = DirectoryError::unexpected(502);
        assert_eq!(err.to_string(), "unexpected directory response: status 502");
    }
}
