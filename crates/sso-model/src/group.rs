//! Directory group representation.
//!
//! Accounts are represented as subgroups of a single master group; the
//! group name doubles as the path segment, while all lookups go through the
//! `accountNumber` attribute.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::attribute::Attributes;

/// A group entity as stored in the remote directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    /// Directory-assigned identifier; absent until the group is created.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    /// Group name; also the final path segment.
    pub name: String,
    /// Full path from the realm root (e.g. `/Accounts/ACME`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Free-form attributes.
    #[serde(default, skip_serializing_if = "Attributes::is_empty")]
    pub attributes: Attributes,
}

impl Group {
    /// Creates a new group with the given name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            path: None,
            attributes: Attributes::new(),
        }
    }

    /// Sets the full path.
    #[must_use]
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Sets a single-valued attribute.
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.set_single(name, value);
        self
    }
}
