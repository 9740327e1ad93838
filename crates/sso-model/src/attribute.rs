//! Attribute maps and well-known attribute names.
//!
//! The remote directory stores free-form, multi-valued string attributes on
//! groups and users. Domain fields are projected through a fixed enumeration
//! of known names with typed accessors, so lookups cannot drift apart on
//! typos between the read and write sides.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Well-known attribute names used on directory entities.
pub mod names {
    /// Business key of an identity within its account.
    pub const CONTACT_NUMBER: &str = "contactNumber";
    /// Owning account business key (on identity users and account groups).
    pub const ACCOUNT_NUMBER: &str = "accountNumber";
    /// Alternate identity business key; primary uniqueness key when present.
    pub const NAV4_ID: &str = "nav4Id";
    /// Contact phone number.
    pub const PHONE: &str = "phone";
    /// Free-text note.
    pub const NOTE: &str = "note";
    /// Preferred locale.
    pub const LOCALE: &str = "locale";
    /// Cached binary encoding of the assigned realm-role set.
    pub const BINARY_RIGHTS: &str = "binaryRights";
    /// Driver PIN code.
    pub const DRIVER_PIN: &str = "driverPIN";
    /// Last successful login, written by the login event listener.
    pub const LAST_LOGIN: &str = "lastLogin";
    /// Last logout.
    pub const LAST_LOGOUT: &str = "lastLogout";
    /// Last failed login.
    pub const LAST_LOGIN_ERROR: &str = "lastLoginError";
    /// Company registration number (account groups).
    pub const COMP_REG_NO: &str = "compRegNo";
    /// Account contact email (account groups).
    pub const CONTACT_EMAIL: &str = "contactEmail";
    /// Single-bit mask identifying a realm role's index (role attribute).
    pub const BINARY_MASK: &str = "binaryMask";
}

/// Multi-valued string attributes attached to a directory entity.
///
/// Single-valued attributes follow the store's convention of a one-element
/// value list; accessors read the first value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Attributes(HashMap<String, Vec<String>>);

impl Attributes {
    /// Creates an empty attribute map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Gets the first value of an attribute, if any.
    #[must_use]
    pub fn first(&self, name: &str) -> Option<&str> {
        self.0.get(name).and_then(|v| v.first()).map(String::as_str)
    }

    /// Gets all values of an attribute.
    #[must_use]
    pub fn values(&self, name: &str) -> Option<&Vec<String>> {
        self.0.get(name)
    }

    /// Checks whether any value of `name` equals `value`.
    #[must_use]
    pub fn contains(&self, name: &str, value: &str) -> bool {
        self.0.get(name).is_some_and(|v| v.iter().any(|x| x == value))
    }

    /// Checks whether the attribute is present with at least one value.
    #[must_use]
    pub fn has(&self, name: &str) -> bool {
        self.first(name).is_some()
    }

    /// Sets a single-valued attribute, replacing any previous values.
    pub fn set_single(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), vec![value.into()]);
    }

    /// Sets a multi-valued attribute, replacing any previous values.
    pub fn set_multi(&mut self, name: impl Into<String>, values: Vec<String>) {
        self.0.insert(name.into(), values);
    }

    /// Removes an attribute entirely. Returns whether it was present.
    pub fn remove(&mut self, name: &str) -> bool {
        self.0.remove(name).is_some()
    }

    /// Number of distinct attribute names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the map holds no attributes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Searchable identity properties.
///
/// `Id`, `Username` and `Email` address directory-native user fields; the
/// `Attr*` entries address encoded attributes. `AttrHasCredentials` is
/// derived during decode and can never seed an index lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IdentityProperty {
    /// Directory-assigned user id.
    Id,
    /// Login username (matched case-insensitively).
    Username,
    /// Email address (matched case-insensitively).
    Email,
    /// The `accountNumber` attribute.
    AttrAccountNumber,
    /// The `contactNumber` attribute.
    AttrContactNumber,
    /// The `nav4Id` attribute.
    AttrNav4Id,
    /// The `phone` attribute.
    AttrPhone,
    /// The `note` attribute.
    AttrNote,
    /// Derived credential-presence flag, matched against "true"/"false".
    AttrHasCredentials,
}

impl IdentityProperty {
    /// The field or attribute name this property queries in the store.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Username => "username",
            Self::Email => "email",
            Self::AttrAccountNumber => names::ACCOUNT_NUMBER,
            Self::AttrContactNumber => names::CONTACT_NUMBER,
            Self::AttrNav4Id => names::NAV4_ID,
            Self::AttrPhone => names::PHONE,
            Self::AttrNote => names::NOTE,
            Self::AttrHasCredentials => "hasCredentials",
        }
    }

    /// Whether this property can seed the store's single-predicate index.
    #[must_use]
    pub const fn indexable(self) -> bool {
        !matches!(self, Self::AttrHasCredentials)
    }
}

/// Searchable account properties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountProperty {
    /// The `accountNumber` attribute.
    AttrAccountNumber,
    /// The `compRegNo` attribute.
    AttrCompRegNo,
    /// The `contactEmail` attribute.
    AttrContactEmail,
}

impl AccountProperty {
    /// The attribute name this property queries in the store.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AttrAccountNumber => names::ACCOUNT_NUMBER,
            Self::AttrCompRegNo => names::COMP_REG_NO,
            Self::AttrContactEmail => names::CONTACT_EMAIL,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_valued_access() {
        let mut attrs = Attributes::new();
        attrs.set_single(names::CONTACT_NUMBER, "C1");

        assert_eq!(attrs.first(names::CONTACT_NUMBER), Some("C1"));
        assert!(attrs.has(names::CONTACT_NUMBER));
        assert!(!attrs.has(names::PHONE));
    }

    #[test]
    fn contains_matches_any_value() {
        let mut attrs = Attributes::new();
        attrs.set_multi("tags", vec!["a".to_string(), "b".to_string()]);

        assert!(attrs.contains("tags", "b"));
        assert!(!attrs.contains("tags", "c"));
        assert!(!attrs.contains("missing", "a"));
    }

    #[test]
    fn remove_reports_presence() {
        let mut attrs = Attributes::new();
        attrs.set_single(names::PHONE, "+420123456789");

        assert!(attrs.remove(names::PHONE));
        assert!(!attrs.remove(names::PHONE));
        assert!(attrs.is_empty());
    }

    #[test]
    fn property_names_match_store_keys() {
        assert_eq!(IdentityProperty::AttrContactNumber.as_str(), "contactNumber");
        assert_eq!(IdentityProperty::Username.as_str(), "username");
        assert_eq!(AccountProperty::AttrAccountNumber.as_str(), "accountNumber");
    }

    #[test]
    fn has_credentials_is_not_indexable() {
        assert!(!IdentityProperty::AttrHasCredentials.indexable());
        assert!(IdentityProperty::AttrNav4Id.indexable());
    }

    #[test]
    fn serializes_as_plain_map() {
        let mut attrs = Attributes::new();
        attrs.set_single(names::NOTE, "vip");

        let json = serde_json::to_value(&attrs).unwrap();
        assert_eq!(json, serde_json::json!({ "note": ["vip"] }));
    }
}
