//! Directory user representation.
//!
//! Mirrors the remote admin API's user JSON. Domain semantics (account
//! membership, business keys, lifecycle state) live in the attribute
//! encoding and the service layer, not here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::attribute::Attributes;

/// A user entity as stored in the remote directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Directory-assigned identifier; absent until the user is created.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    /// Unique login username.
    pub username: String,
    /// Whether the user may authenticate.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// First name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    /// Last name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    /// Email address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Whether the email address has been verified.
    #[serde(default)]
    pub email_verified: bool,
    /// Creation timestamp recorded by the directory (milliseconds on the wire).
    #[serde(
        default,
        rename = "createdTimestamp",
        with = "chrono::serde::ts_milliseconds_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,
    /// Pending required actions (e.g. `VERIFY_EMAIL`, `UPDATE_PASSWORD`).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required_actions: Vec<String>,
    /// Free-form attributes.
    #[serde(default, skip_serializing_if = "Attributes::is_empty")]
    pub attributes: Attributes,
}

fn default_enabled() -> bool {
    true
}

impl User {
    /// Creates a new enabled user with the given username.
    #[must_use]
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            id: None,
            username: username.into(),
            enabled: true,
            first_name: None,
            last_name: None,
            email: None,
            email_verified: false,
            created_at: None,
            required_actions: Vec::new(),
            attributes: Attributes::new(),
        }
    }

    /// Sets the email address.
    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
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

    /// Sets whether the user is enabled.
    #[must_use]
    pub const fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Sets a single-valued attribute.
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.set_single(name, value);
        self
    }

    /// Checks whether the user carries a specific required action.
    #[must_use]
    pub fn has_required_action(&self, action: &str) -> bool {
        self.required_actions.iter().any(|a| a == action)
    }

    /// Adds a required action unless already present.
    pub fn add_required_action(&mut self, action: impl Into<String>) {
        let action = action.into();
        if !self.has_required_action(&action) {
            self.required_actions.push(action);
        }
    }

    /// Removes a required action if present.
    pub fn remove_required_action(&mut self, action: &str) {
        self.required_actions.retain(|a| a != action);
    }

    /// Whether a non-blank email address is set.
    #[must_use]
    pub fn has_email(&self) -> bool {
        self.email.as_deref().is_some_and(|e| !e.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribute::names;
    use crate::credential::RequiredAction;

    #[test]
    fn new_user_is_enabled_and_unverified() {
        let user = User::new("generated-C1");

        assert_eq!(user.username, "generated-C1");
        assert!(user.enabled);
        assert!(!user.email_verified);
        assert!(user.required_actions.is_empty());
        assert!(user.id.is_none());
    }

    #[test]
    fn required_actions_do_not_duplicate() {
        let mut user = User::new("u");
        user.add_required_action(RequiredAction::VerifyEmail.as_str());
        user.add_required_action(RequiredAction::VerifyEmail.as_str());

        assert_eq!(user.required_actions.len(), 1);

        user.remove_required_action(RequiredAction::VerifyEmail.as_str());
        assert!(user.required_actions.is_empty());
    }

    #[test]
    fn blank_email_does_not_count() {
        let user = User::new("u").with_email("  ");
        assert!(!user.has_email());

        let user = User::new("u").with_email("u@example.com");
        assert!(user.has_email());
    }

    #[test]
    fn wire_format_is_camel_case() {
        let user = User::new("u")
            .with_first_name("Jan")
            .with_attribute(names::CONTACT_NUMBER, "C1");

        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["firstName"], "Jan");
        assert_eq!(json["emailVerified"], false);
        assert_eq!(json["attributes"]["contactNumber"][0], "C1");
    }
}
