//! Account domain view.

use serde::{Deserialize, Serialize};

/// An organizational account, decoded from its directory group.
///
/// The account number is the externally assigned business key; the name is
/// independent of it and only determines the group path, which is never
/// used for lookups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    /// Externally assigned unique account number.
    pub account_number: String,
    /// Display name; also the underlying group name and path segment.
    pub name: String,
    /// Company registration number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comp_reg_no: Option<String>,
    /// Account contact email.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_email: Option<String>,
    /// Account-level default locale applied to new identities.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
}

impl Account {
    /// Creates a new account with the given number and name.
    #[must_use]
    pub fn new(account_number: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            account_number: account_number.into(),
            name: name.into(),
            comp_reg_no: None,
            contact_email: None,
            locale: None,
        }
    }

    /// Sets the company registration number.
    #[must_use]
    pub fn with_comp_reg_no(mut self, comp_reg_no: impl Into<String>) -> Self {
        self.comp_reg_no = Some(comp_reg_no.into());
        self
    }

    /// Sets the contact email.
    #[must_use]
    pub fn with_contact_email(mut self, email: impl Into<String>) -> Self {
        self.contact_email = Some(email.into());
        self
    }

    /// Sets the default locale.
    #[must_use]
    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_covers_optional_fields() {
        let account = Account::new("ACC1", "ACME")
            .with_comp_reg_no("60255523")
            .with_contact_email("info@acme.example")
            .with_locale("cs");

        assert_eq!(account.account_number, "ACC1");
        assert_eq!(account.name, "ACME");
        assert_eq!(account.comp_reg_no.as_deref(), Some("60255523"));
        assert_eq!(account.locale.as_deref(), Some("cs"));
    }
}
