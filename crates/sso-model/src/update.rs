//! Partial-update merge semantics.
//!
//! Every mutable identity field goes through the same three-mode merge so
//! per-field behavior cannot diverge. Fields backed by removable attributes
//! (`phone`, `locale`) use [`patch_attribute`], which can drop the stored
//! attribute entirely; plain fields use [`patch`].

use serde::{Deserialize, Serialize};

/// How a partial update merges into the existing record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UpdateMode {
    /// Fill blanks: supplied non-blank values win, everything else is kept.
    Add,
    /// Replace: supplied values always win; a blank value clears the field.
    Update,
    /// Subtract: removable attributes are dropped when no replacement is
    /// supplied; otherwise behaves like [`UpdateMode::Add`].
    Delete,
}

/// Outcome of merging a removable attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributePatch {
    /// Store this value.
    Set(String),
    /// Leave the stored value untouched.
    Keep,
    /// Remove the attribute from the store entirely.
    Remove,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Merges `new` into `old` for a plain field.
#[must_use]
pub fn patch(old: Option<String>, new: Option<String>, mode: UpdateMode) -> Option<String> {
    match mode {
        UpdateMode::Update => non_blank(new),
        UpdateMode::Add | UpdateMode::Delete => non_blank(new).or(old),
    }
}

/// Merges a new value into a removable attribute.
#[must_use]
pub fn patch_attribute(new: Option<&str>, mode: UpdateMode) -> AttributePatch {
    match new.filter(|v| !v.trim().is_empty()) {
        Some(value) => AttributePatch::Set(value.to_owned()),
        None => match mode {
            UpdateMode::Add => AttributePatch::Keep,
            UpdateMode::Update | UpdateMode::Delete => AttributePatch::Remove,
        },
    }
}
