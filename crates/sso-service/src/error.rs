//! Service error taxonomy.

use sso_directory::DirectoryError;
use thiserror::Error;

/// Result type alias for service operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by account and identity operations.
///
/// Resolution failures (not-found, duplicate) are always surfaced to the
/// caller; the only silent paths are the documented best-effort secondary
/// effects (username upgrade, action-email dispatch), which log and keep
/// the primary operation intact.
#[derive(Debug, Error)]
pub enum Error {
    /// No account carries the given account number.
    #[error("account not found: {0}")]
    AccountNotFound(String),

    /// No identity matches the lookup key.
    #[error("identity not found: {0}")]
    IdentityNotFound(String),

    /// A required attribute is absent on the entity.
    #[error("attribute not found: {0}")]
    AttributeNotFound(&'static str),

    /// The request is missing a required identifying key.
    #[error("missing required key: {0}")]
    MissingKey(&'static str),

    /// An account with the same account number already exists.
    #[error("account already exists")]
    DuplicateAccount,

    /// An identity with the same uniqueness key already exists.
    #[error("duplicate identity: {0}")]
    DuplicateIdentity(String),

    /// The request is malformed.
    #[error("validation error: {0}")]
    Validation(String),

    /// The store rejected the password against its policy.
    #[error("password rejected by policy")]
    PasswordPolicy,

    /// The store rejected the identity update.
    #[error("identity update rejected: {0}")]
    UpdateRejected(String),

    /// A password reset was requested without a verified email.
    #[error("email not present or not verified: {0}")]
    EmailNotVerified(String),

    /// Unexpected directory failure, propagated as-is.
    #[error(transparent)]
    Directory(#[from] DirectoryError),
}

impl Error {
    /// Checks if this is a not-found resolution failure.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::AccountNotFound(_) | Self::IdentityNotFound(_) | Self::AttributeNotFound(_)
        )
    }

    /// Checks if this is a uniqueness failure.
    #[must_use]
    pub const fn is_duplicate(&self) -> bool {
        matches!(self, Self::DuplicateAccount | Self::DuplicateIdentity(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn predicates_classify_variants() {
        assert!(Error::IdentityNotFound("C1".to_string()).is_not_found());
        assert!(Error::DuplicateAccount.is_duplicate());
        assert!(!Error::PasswordPolicy.is_not_found());
        assert!(!Error::PasswordPolicy.is_duplicate());
    }

    #[test]
    fn directory_errors_pass_through() {
        let err = Error::from(DirectoryError::unexpected(502));
        assert_eq!(err.to_string(), "unexpected directory response: status 502");
    }
}
