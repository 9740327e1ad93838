//! Identity domain view.
//!
//! The same struct serves as the decoded read model, the creation request
//! and the partial-update request; unknown or absent fields stay `None`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::state::IdentityState;

/// Login telemetry of an identity.
///
/// The directory records the creation timestamp itself; the `last*` values
/// are free-form strings written by the login event listener.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginInfo {
    /// When the directory record was created.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,
    /// Last successful login.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_login: Option<String>,
    /// Last logout.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_logout: Option<String>,
    /// Last failed login.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_login_error: Option<String>,
}

/// A user record scoped to an account.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    /// Directory-assigned user id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity_id: Option<Uuid>,
    /// Owning account business key; the identity must belong to an
    /// existing account.
    pub account_number: String,
    /// Business key within the account.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_number: Option<String>,
    /// Alternate business key; the primary uniqueness key when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nav4_id: Option<String>,
    /// Login username; derived at creation when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// First name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    /// Last name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    /// Email address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Whether the email is verified; never true for a blank email.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_verified: Option<bool>,
    /// Contact phone number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Free-text note.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    /// Preferred locale; defaults to the account locale at creation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
    /// Soft-lock flag: set when the directory user is disabled.
    #[serde(default)]
    pub locked: bool,
    /// Derived lifecycle state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<IdentityState>,
    /// Derived credential-presence flag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_credentials: Option<bool>,
    /// Login telemetry, populated on request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub login_info: Option<LoginInfo>,
    /// Creation-only flag: opt out of the best-effort upgrade of a
    /// generated username to the email address.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub no_email_as_username: bool,
}

impl Identity {
    /// Creates an identity request for the given account.
    #[must_use]
    pub fn new(account_number: impl Into<String>) -> Self {
        Self {
            account_number: account_number.into(),
            ..Self::default()
        }
    }

    /// Sets the contact number.
    #[must_use]
    pub fn with_contact_number(mut self, contact_number: impl Into<String>) -> Self {
        self.contact_number = Some(contact_number.into());
        self
    }

    /// Sets the nav4 id.
    #[must_use]
    pub fn with_nav4_id(mut self, nav4_id: impl Into<String>) -> Self {
        self.nav4_id = Some(nav4_id.into());
        self
    }

    /// Sets an explicit username.
    #[must_use]
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Sets the first name.
    #[must_use]
    pub fn with_first_name(mut self, name: impl Into<String>) -> Self {
        self.first_name = Some(name.into());
        self
    }

    /// Sets the last name.
    #[must_use]
    pub fn with_last_name(mut self, name: impl Into<String>) -> Self {
        self.last_name = Some(name.into());
        self
    }

    /// Sets the email address.
    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Sets the email-verified flag.
    #[must_use]
    pub const fn with_email_verified(mut self, verified: bool) -> Self {
        self.email_verified = Some(verified);
        self
    }

    /// Sets the phone number.
    #[must_use]
    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    /// Sets the note.
    #[must_use]
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    /// Sets the locale.
    #[must_use]
    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }

    /// Opts out of the username-to-email upgrade at creation.
    #[must_use]
    pub const fn keep_generated_username(mut self) -> Self {
        self.no_email_as_username = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_produces_creation_request() {
        let identity = Identity::new("ACC1")
            .with_contact_number("C1")
            .with_email("driver@example.com")
            .with_first_name("Jan")
            .keep_generated_username();

        assert_eq!(identity.account_number, "ACC1");
        assert_eq!(identity.contact_number.as_deref(), Some("C1"));
        assert!(identity.no_email_as_username);
        assert!(identity.state.is_none());
    }

    #[test]
    fn serde_skips_unset_fields() {
        let identity = Identity::new("ACC1").with_contact_number("C1");

        let json = serde_json::to_value(&identity).unwrap();
        assert_eq!(json["accountNumber"], "ACC1");
        assert_eq!(json["contactNumber"], "C1");
        assert!(json.get("nav4Id").is_none());
        assert!(json.get("noEmailAsUsername").is_none());
    }
}
