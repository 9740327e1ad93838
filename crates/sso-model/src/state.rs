//! Identity lifecycle state.
//!
//! The state is never stored; it is a pure function of the raw signals
//! (record existence, credential presence, login history) re-evaluated on
//! every query, so it cannot drift from the underlying record.

use serde::{Deserialize, Serialize};

/// Lifecycle state of an identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IdentityState {
    /// No matching identity record exists.
    NotExists,
    /// The record exists but no credential is set.
    Created,
    /// A credential is set, no successful login recorded yet.
    CredentialsCreated,
    /// A credential is set and at least one login is recorded.
    Active,
}

impl IdentityState {
    /// Derives the state from the raw signals, evaluated in order:
    /// missing record, then credential presence, then login history.
    #[must_use]
    pub const fn derive(exists: bool, has_credentials: bool, has_login: bool) -> Self {
        if !exists {
            Self::NotExists
        } else if !has_credentials {
            Self::Created
        } else if has_login {
            Self::Active
        } else {
            Self::CredentialsCreated
        }
    }

    /// Whether this state implies a credential is set on the record.
    #[must_use]
    pub const fn has_credentials(self) -> bool {
        matches!(self, Self::CredentialsCreated | Self::Active)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derivation_table() {
        assert_eq!(
            IdentityState::derive(false, false, false),
            IdentityState::NotExists
        );
        assert_eq!(
            IdentityState::derive(false, true, true),
            IdentityState::NotExists
        );
        assert_eq!(
            IdentityState::derive(true, false, false),
            IdentityState::Created
        );
        assert_eq!(
            IdentityState::derive(true, false, true),
            IdentityState::Created
        );
        assert_eq!(
            IdentityState::derive(true, true, false),
            IdentityState::CredentialsCreated
        );
        assert_eq!(IdentityState::derive(true, true, true), IdentityState::Active);
    }

    #[test]
    fn credential_flag_tracks_state() {
        assert!(!IdentityState::Created.has_credentials());
        assert!(IdentityState::CredentialsCreated.has_credentials());
        assert!(IdentityState::Active.has_credentials());
        assert!(!IdentityState::NotExists.has_credentials());
    }

    #[test]
    fn wire_format_is_screaming_snake() {
        let json = serde_json::to_string(&IdentityState::CredentialsCreated).unwrap();
        assert_eq!(json, "\"CREDENTIALS_CREATED\"");
    }
}
