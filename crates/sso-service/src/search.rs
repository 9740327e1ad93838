//! Attribute-indexed search composition.
//!
//! The store answers exactly one attribute-equality predicate per query.
//! Compound filters are emulated client-side: the first predicate seeds a
//! candidate set through the index, every candidate is re-read and decoded,
//! and the remaining predicates filter in memory. That costs one remote
//! read per candidate for each additional predicate, which is acceptable
//! only because directories stay small; callers with large result sets
//! should lead with their most selective predicate.

use std::sync::Arc;

use sso_directory::Directory;
use sso_model::attribute::names;
use sso_model::{Identity, IdentityProperty, IdentityState, User};
use uuid::Uuid;

use crate::codec;
use crate::error::{Error, Result};

/// Identity lookup over the store's single-predicate index.
#[derive(Clone)]
pub struct IdentitySearch {
    directory: Arc<dyn Directory>,
}

impl IdentitySearch {
    /// Creates a search facade over the given directory.
    #[must_use]
    pub fn new(directory: Arc<dyn Directory>) -> Self {
        Self { directory }
    }

    /// Ids of users whose `property` equals `value`.
    ///
    /// Non-indexable properties (the derived credential flag) resolve to an
    /// empty candidate set.
    pub async fn find_ids(&self, property: IdentityProperty, value: &str) -> Result<Vec<Uuid>> {
        if !property.indexable() {
            return Ok(Vec::new());
        }
        Ok(self
            .directory
            .find_user_ids_by_attribute(property.as_str(), value)
            .await?)
    }

    /// Resolves at most one user by `property`.
    ///
    /// ## Errors
    ///
    /// Returns `Error::DuplicateIdentity` when more than one user matches;
    /// the store does not enforce uniqueness for encoded attributes.
    pub async fn find_unique(
        &self,
        property: IdentityProperty,
        value: &str,
    ) -> Result<Option<User>> {
        let ids = self.find_ids(property, value).await?;
        if ids.len() > 1 {
            return Err(Error::DuplicateIdentity(format!(
                "{} = {value}",
                property.as_str()
            )));
        }
        match ids.first() {
            Some(id) => Ok(self.directory.user_by_id(*id).await?),
            None => Ok(None),
        }
    }

    /// Reads a possibly-deleted user id; absent users are `None`.
    pub async fn user_by_id(&self, id: Uuid) -> Result<Option<User>> {
        Ok(self.directory.user_by_id(id).await?)
    }

    /// Decodes a user into its identity view with derived state.
    pub async fn decode(&self, user: &User, with_login_info: bool) -> Result<Identity> {
        let mut identity = codec::decode_identity(user);
        let state = self.state_of(user).await?;
        identity.state = Some(state);
        identity.has_credentials = Some(state.has_credentials());
        if with_login_info {
            identity.login_info = Some(codec::decode_login_info(user));
        }
        Ok(identity)
    }

    /// Derives the lifecycle state of an existing record.
    pub async fn state_of(&self, user: &User) -> Result<IdentityState> {
        let has_credentials = match user.id {
            Some(id) => self.directory.has_credentials(id).await?,
            None => false,
        };
        let has_login = user.attributes.has(names::LAST_LOGIN);
        Ok(IdentityState::derive(true, has_credentials, has_login))
    }

    /// Compound search over an ordered list of predicates.
    ///
    /// The first predicate seeds the candidate set; the rest filter the
    /// decoded candidates in memory. Candidates deleted between the index
    /// lookup and the read are skipped.
    ///
    /// ## Errors
    ///
    /// Returns `Error::Validation` for an empty predicate list: matching
    /// everything is never what a caller wants.
    pub async fn search(&self, predicates: &[(IdentityProperty, String)]) -> Result<Vec<Identity>> {
        let Some(((first_property, first_value), rest)) = predicates.split_first() else {
            return Err(Error::Validation(
                "search requires at least one predicate".to_string(),
            ));
        };

        let ids = self.find_ids(*first_property, first_value).await?;
        let mut found = Vec::with_capacity(ids.len());
        for id in ids {
            let Some(user) = self.directory.user_by_id(id).await? else {
                continue;
            };
            found.push(self.decode(&user, false).await?);
        }

        for (property, value) in rest {
            found.retain(|identity| matches_property(identity, *property, value));
        }
        Ok(found)
    }
}

/// Whether a decoded identity satisfies a single property predicate.
///
/// Username and email match case-insensitively, attributes exactly; the
/// credential flag matches against "true"/"false".
#[must_use]
pub fn matches_property(identity: &Identity, property: IdentityProperty, value: &str) -> bool {
    match property {
        IdentityProperty::Id => identity
            .identity_id
            .is_some_and(|id| id.to_string() == value),
        IdentityProperty::Username => identity
            .username
            .as_deref()
            .is_some_and(|u| u.eq_ignore_ascii_case(value)),
        IdentityProperty::Email => identity
            .email
            .as_deref()
            .is_some_and(|e| e.eq_ignore_ascii_case(value)),
        IdentityProperty::AttrAccountNumber => identity.account_number == value,
        IdentityProperty::AttrContactNumber => identity.contact_number.as_deref() == Some(value),
        IdentityProperty::AttrNav4Id => identity.nav4_id.as_deref() == Some(value),
        IdentityProperty::AttrPhone => identity.phone.as_deref() == Some(value),
        IdentityProperty::AttrNote => identity.note.as_deref() == Some(value),
        IdentityProperty::AttrHasCredentials => {
            let wanted = value.eq_ignore_ascii_case("true");
            identity.has_credentials == Some(wanted)
        }
    }
}
