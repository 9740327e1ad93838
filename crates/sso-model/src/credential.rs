//! Credentials, required actions and redirect targets.

use serde::{Deserialize, Serialize};

/// New credentials to apply to an identity.
///
/// Both parts are optional: a username change and a password reset are
/// applied independently, each only when a non-blank value is supplied.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    /// Replacement username.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// New password.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// Whether the password is temporary and must be changed on next login.
    #[serde(default)]
    pub temporary: bool,
}

impl Credentials {
    /// Creates credentials with only a password.
    #[must_use]
    pub fn password(password: impl Into<String>) -> Self {
        Self {
            username: None,
            password: Some(password.into()),
            temporary: false,
        }
    }

    /// Marks the password as temporary.
    #[must_use]
    pub const fn temporary(mut self, temporary: bool) -> Self {
        self.temporary = temporary;
        self
    }

    /// Sets a replacement username.
    #[must_use]
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }
}

/// Client redirect target attached to an action email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientRedirect {
    /// Client the user lands on after completing the action.
    pub client_id: String,
    /// Redirect URI registered for that client.
    pub redirect_uri: String,
}

/// A pending mandatory step attached to an identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequiredAction {
    /// The user must verify their email address.
    VerifyEmail,
    /// The user must update their password.
    UpdatePassword,
}

impl RequiredAction {
    /// The action name as stored on the directory user.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::VerifyEmail => "VERIFY_EMAIL",
            Self::UpdatePassword => "UPDATE_PASSWORD",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_builder() {
        let credentials = Credentials::password("s3cret").temporary(true);

        assert_eq!(credentials.password.as_deref(), Some("s3cret"));
        assert!(credentials.temporary);
        assert!(credentials.username.is_none());
    }

    #[test]
    fn action_names_match_store_values() {
        assert_eq!(RequiredAction::VerifyEmail.as_str(), "VERIFY_EMAIL");
        assert_eq!(RequiredAction::UpdatePassword.as_str(), "UPDATE_PASSWORD");
    }
}
