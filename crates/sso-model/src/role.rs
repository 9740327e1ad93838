//! Realm role representation.
//!
//! Roles are addressed by a stable identifier at the role API. A role may
//! carry a `binaryMask` attribute, a binary digit string with exactly one
//! set bit marking the role's index in the compact rights encoding.

use serde::{Deserialize, Serialize};

use crate::attribute::{names, Attributes};

/// A realm-level role in the remote directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    /// Stable role identifier used to address the role API.
    pub id: String,
    /// Human-readable role name.
    pub name: String,
    /// Free-form attributes.
    #[serde(default, skip_serializing_if = "Attributes::is_empty")]
    pub attributes: Attributes,
}

impl Role {
    /// Creates a new role whose name equals its identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            attributes: Attributes::new(),
        }
    }

    /// Sets a distinct display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the role's binary mask attribute.
    #[must_use]
    pub fn with_binary_mask(mut self, mask: impl Into<String>) -> Self {
        self.attributes.set_single(names::BINARY_MASK, mask);
        self
    }

    /// The role's binary mask, if one is assigned.
    #[must_use]
    pub fn binary_mask(&self) -> Option<&str> {
        self.attributes.first(names::BINARY_MASK)
    }
}
