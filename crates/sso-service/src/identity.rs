//! Identity lifecycle orchestration.
//!
//! Composes the index lookups, the attribute codec, the patch merge, the
//! state derivation and the rights cache into the operations callers see:
//! creation with duplicate resolution, partial updates, credential
//! lifecycle, required-action triggers, soft locking and role updates.

use std::sync::Arc;

use sso_directory::{Directory, DirectoryError};
use sso_model::attribute::names;
use sso_model::{
    ClientRedirect, Credentials, Identity, IdentityProperty, IdentityState, RequiredAction, Role,
    UpdateMode, User,
};
use uuid::Uuid;

use crate::account::AccountService;
use crate::codec::{self, non_blank};
use crate::error::{Error, Result};
use crate::rights::RightsService;
use crate::search::IdentitySearch;

/// Identity CRUD, duplicate resolution, credential lifecycle and
/// required-action triggers over the remote directory.
#[derive(Clone)]
pub struct IdentityService {
    directory: Arc<dyn Directory>,
    accounts: AccountService,
    search: IdentitySearch,
    rights: RightsService,
}

fn user_id(user: &User) -> Result<Uuid> {
    user.id
        .ok_or_else(|| Error::Validation("directory user carries no id".to_string()))
}

impl IdentityService {
    /// Creates an identity service over the given directory.
    #[must_use]
    pub fn new(directory: Arc<dyn Directory>) -> Self {
        Self {
            accounts: AccountService::new(directory.clone()),
            search: IdentitySearch::new(directory.clone()),
            rights: RightsService::new(directory.clone()),
            directory,
        }
    }

    /// The rights service sharing this directory.
    #[must_use]
    pub const fn rights(&self) -> &RightsService {
        &self.rights
    }

    /// Creates an identity once account and uniqueness constraints hold.
    ///
    /// The effective username prefers, in order: the explicit value, the
    /// nav4 id, `"generated-" + contactNumber`. When no explicit username
    /// was supplied (and the request doesn't opt out), a second best-effort
    /// write upgrades the derived username to the email address; its
    /// failure keeps the derived username and never unwinds the creation.
    ///
    /// Uniqueness checks are check-then-act against the remote store: two
    /// concurrent creations racing on the same business key can both pass
    /// unless they collide on the username the store enforces natively.
    ///
    /// ## Errors
    ///
    /// - `Error::MissingKey` without a contact number or nav4 id
    /// - `Error::AccountNotFound` when the account doesn't exist
    /// - `Error::DuplicateIdentity` on a username, nav4 id or contact
    ///   number collision
    pub async fn create_identity(&self, request: &Identity) -> Result<Identity> {
        let contact_number = non_blank(request.contact_number.as_deref());
        let nav4_id = non_blank(request.nav4_id.as_deref());
        if contact_number.is_none() && nav4_id.is_none() {
            return Err(Error::MissingKey(names::CONTACT_NUMBER));
        }
        if non_blank(Some(request.account_number.as_str())).is_none() {
            return Err(Error::MissingKey(names::ACCOUNT_NUMBER));
        }

        let explicit_username = non_blank(request.username.as_deref());
        let username = if let Some(username) = explicit_username {
            username.to_owned()
        } else if let Some(nav4_id) = nav4_id {
            nav4_id.to_owned()
        } else {
            // The key check above guarantees the contact number here.
            format!("generated-{}", contact_number.unwrap_or_default())
        };

        if self.identity_exists(&username).await? {
            return Err(Error::DuplicateIdentity(
                "identity with the same username already exists".to_string(),
            ));
        }

        let account = self.accounts.get_account(&request.account_number).await?;

        if let Some(nav4_id) = nav4_id {
            if !self
                .search
                .find_ids(IdentityProperty::AttrNav4Id, nav4_id)
                .await?
                .is_empty()
            {
                return Err(Error::DuplicateIdentity(
                    "identity with the same nav4Id already exists".to_string(),
                ));
            }
        } else if let Some(contact_number) = contact_number {
            if !self
                .search
                .find_ids(IdentityProperty::AttrContactNumber, contact_number)
                .await?
                .is_empty()
            {
                return Err(Error::DuplicateIdentity(
                    "identity with the same contactNumber already exists, \
                     use nav4Id for guaranteed uniqueness"
                        .to_string(),
                ));
            }
        }

        let locale = non_blank(request.locale.as_deref()).or(account.locale.as_deref());
        let user = codec::encode_new_identity(request, &username, locale);
        let id = match self.directory.create_user(&user).await {
            Ok(id) => id,
            Err(e) if e.is_conflict() => {
                return Err(Error::DuplicateIdentity(
                    "identity with the same username already exists".to_string(),
                ))
            }
            Err(e) => return Err(e.into()),
        };

        // Membership in the account group keeps member listings working.
        if let Some(group) = self.accounts.find_group(&request.account_number).await? {
            if let Some(group_id) = group.id {
                self.directory.add_group_member(group_id, id).await?;
            }
        }

        if user.has_required_action(RequiredAction::VerifyEmail.as_str()) {
            self.dispatch_verify_email(id).await;
        }

        if !request.no_email_as_username && explicit_username.is_none() {
            if let Some(email) = non_blank(request.email.as_deref()) {
                if !self.identity_exists(email).await? {
                    self.try_username_upgrade(id, email).await;
                }
            }
        }

        let created = self
            .directory
            .user_by_id(id)
            .await?
            .ok_or_else(|| Error::IdentityNotFound(id.to_string()))?;
        self.search.decode(&created, false).await
    }

    /// Attempts to switch a derived username to the email address.
    ///
    /// The creation already succeeded; a failing secondary write keeps the
    /// derived username and is only logged.
    async fn try_username_upgrade(&self, id: Uuid, email: &str) {
        let result = async {
            let mut user = self
                .directory
                .user_by_id(id)
                .await?
                .ok_or_else(|| DirectoryError::not_found("user", id.to_string()))?;
            user.username = email.to_owned();
            self.directory.update_user(&user).await
        }
        .await;
        if let Err(error) = result {
            tracing::warn!(%error, "username upgrade to email failed, keeping the derived username");
        }
    }

    async fn dispatch_verify_email(&self, id: Uuid) {
        if let Err(error) = self.send_verify_email(id).await {
            tracing::warn!(%error, "verification email dispatch failed");
        }
    }

    /// Sends the email-verification action email when the identity has an
    /// email address. A missing identity is a no-op.
    pub async fn send_verify_email(&self, identity_id: Uuid) -> Result<()> {
        if let Some(user) = self.directory.user_by_id(identity_id).await? {
            if user.has_email() {
                self.directory
                    .execute_actions_email(identity_id, &[RequiredAction::VerifyEmail], None)
                    .await?;
            }
        }
        Ok(())
    }

    /// Finds the directory record by contact number.
    ///
    /// ## Errors
    ///
    /// Returns `Error::DuplicateIdentity` when more than one record carries
    /// the number.
    pub async fn find_identity(&self, contact_number: &str) -> Result<Option<User>> {
        self.search
            .find_unique(IdentityProperty::AttrContactNumber, contact_number)
            .await
    }

    /// Finds the directory record by nav4 id.
    pub async fn find_identity_nav4(&self, nav4_id: &str) -> Result<Option<User>> {
        self.search
            .find_unique(IdentityProperty::AttrNav4Id, nav4_id)
            .await
    }

    /// Finds the directory record by username.
    pub async fn find_identity_by_username(&self, username: &str) -> Result<Option<User>> {
        self.search
            .find_unique(IdentityProperty::Username, username)
            .await
    }

    /// Whether an identity with the given username exists.
    pub async fn identity_exists(&self, username: &str) -> Result<bool> {
        Ok(!self
            .search
            .find_ids(IdentityProperty::Username, username)
            .await?
            .is_empty())
    }

    /// Reads the decoded identity by contact number.
    pub async fn get_identity(
        &self,
        contact_number: &str,
        with_login_info: bool,
    ) -> Result<Identity> {
        let user = self
            .find_identity(contact_number)
            .await?
            .ok_or_else(|| Error::IdentityNotFound(contact_number.to_string()))?;
        self.search.decode(&user, with_login_info).await
    }

    /// Reads the decoded identity by nav4 id.
    pub async fn get_identity_nav4(
        &self,
        nav4_id: &str,
        with_login_info: bool,
    ) -> Result<Identity> {
        let user = self
            .find_identity_nav4(nav4_id)
            .await?
            .ok_or_else(|| Error::IdentityNotFound(format!("nav4Id = {nav4_id}")))?;
        self.search.decode(&user, with_login_info).await
    }

    /// Reads the decoded identity by username.
    pub async fn get_identity_by_username(&self, username: &str) -> Result<Identity> {
        let user = self
            .find_identity_by_username(username)
            .await?
            .ok_or_else(|| Error::IdentityNotFound(format!("username = {username}")))?;
        self.search.decode(&user, false).await
    }

    /// Batch read: one index query per contact number, skipping numbers
    /// that resolve to nothing.
    pub async fn get_identities(
        &self,
        contact_numbers: &[String],
        with_login_info: bool,
    ) -> Result<Vec<Identity>> {
        let mut identities = Vec::new();
        for contact_number in contact_numbers {
            let ids = self
                .search
                .find_ids(IdentityProperty::AttrContactNumber, contact_number)
                .await?;
            for id in ids {
                if let Some(user) = self.directory.user_by_id(id).await? {
                    identities.push(self.search.decode(&user, with_login_info).await?);
                }
            }
        }
        Ok(identities)
    }

    /// Derives the lifecycle state for a contact number.
    ///
    /// An absent record is `IdentityState::NotExists`, not an error.
    pub async fn get_identity_state(&self, contact_number: &str) -> Result<IdentityState> {
        match self.find_identity(contact_number).await? {
            Some(user) => self.search.state_of(&user).await,
            None => Ok(IdentityState::NotExists),
        }
    }

    /// Derives the lifecycle state for a nav4 id.
    pub async fn get_identity_state_nav4(&self, nav4_id: &str) -> Result<IdentityState> {
        match self.find_identity_nav4(nav4_id).await? {
            Some(user) => self.search.state_of(&user).await,
            None => Ok(IdentityState::NotExists),
        }
    }

    /// Deletes the identity with the given contact number.
    pub async fn delete_identity(&self, contact_number: &str) -> Result<()> {
        let user = self
            .find_identity(contact_number)
            .await?
            .ok_or_else(|| Error::IdentityNotFound(contact_number.to_string()))?;
        self.directory.delete_user(user_id(&user)?).await?;
        Ok(())
    }

    /// Deletes the identity with the given nav4 id.
    pub async fn delete_identity_nav4(&self, nav4_id: &str) -> Result<()> {
        let user = self
            .find_identity_nav4(nav4_id)
            .await?
            .ok_or_else(|| Error::IdentityNotFound(format!("nav4Id = {nav4_id}")))?;
        self.directory.delete_user(user_id(&user)?).await?;
        Ok(())
    }

    /// Merges a partial update into the identity and returns the fresh
    /// decoded view.
    pub async fn update_identity(
        &self,
        contact_number: &str,
        update: &Identity,
        mode: UpdateMode,
    ) -> Result<Identity> {
        let user = self
            .find_identity(contact_number)
            .await?
            .ok_or_else(|| Error::IdentityNotFound(contact_number.to_string()))?;
        self.apply_update(user, update, mode).await?;
        self.get_identity(contact_number, false).await
    }

    /// Merges a partial update into the identity resolved by nav4 id.
    pub async fn update_identity_nav4(
        &self,
        nav4_id: &str,
        update: &Identity,
        mode: UpdateMode,
    ) -> Result<Identity> {
        let user = self
            .find_identity_nav4(nav4_id)
            .await?
            .ok_or_else(|| Error::IdentityNotFound(format!("nav4Id = {nav4_id}")))?;
        self.apply_update(user, update, mode).await?;
        self.get_identity_nav4(nav4_id, false).await
    }

    async fn apply_update(&self, mut user: User, update: &Identity, mode: UpdateMode) -> Result<()> {
        let outcome = codec::apply_identity_patch(&mut user, update, mode);
        self.write_user(&user).await?;
        if outcome.send_verify_email {
            if let Some(id) = user.id {
                self.dispatch_verify_email(id).await;
            }
        }
        Ok(())
    }

    async fn write_user(&self, user: &User) -> Result<()> {
        match self.directory.update_user(user).await {
            Ok(()) => Ok(()),
            Err(DirectoryError::InvalidData(message)) => Err(Error::UpdateRejected(message)),
            Err(e) if e.is_conflict() => Err(Error::UpdateRejected(e.to_string())),
            Err(e) => Err(e.into()),
        }
    }

    /// Applies new credentials to the identity with the contact number.
    pub async fn create_credentials(
        &self,
        contact_number: &str,
        credentials: &Credentials,
    ) -> Result<()> {
        let user = self
            .find_identity(contact_number)
            .await?
            .ok_or_else(|| Error::IdentityNotFound(contact_number.to_string()))?;
        self.apply_credentials(user, credentials).await
    }

    /// Applies new credentials to the identity with the username.
    pub async fn create_credentials_by_username(
        &self,
        username: &str,
        credentials: &Credentials,
    ) -> Result<()> {
        let user = self
            .find_identity_by_username(username)
            .await?
            .ok_or_else(|| Error::IdentityNotFound(format!("username = {username}")))?;
        self.apply_credentials(user, credentials).await
    }

    /// Applies new credentials to the identity with the nav4 id.
    pub async fn create_credentials_nav4(
        &self,
        nav4_id: &str,
        credentials: &Credentials,
    ) -> Result<()> {
        let user = self
            .find_identity_nav4(nav4_id)
            .await?
            .ok_or_else(|| Error::IdentityNotFound(format!("nav4Id = {nav4_id}")))?;
        self.apply_credentials(user, credentials).await
    }

    /// Applies an optional username change and an optional password reset.
    ///
    /// A temporary password pins the `UPDATE_PASSWORD` required action; a
    /// permanent one clears it. The identity is re-enabled so fresh
    /// credentials are usable immediately.
    async fn apply_credentials(&self, mut user: User, credentials: &Credentials) -> Result<()> {
        let id = user_id(&user)?;
        user.enabled = true;

        if let Some(username) = non_blank(credentials.username.as_deref()) {
            user.username = username.to_owned();
            self.write_user(&user).await?;
        }

        if let Some(password) = non_blank(credentials.password.as_deref()) {
            if credentials.temporary {
                user.add_required_action(RequiredAction::UpdatePassword.as_str());
            } else {
                user.remove_required_action(RequiredAction::UpdatePassword.as_str());
            }
            match self
                .directory
                .reset_password(id, password, credentials.temporary)
                .await
            {
                Ok(()) => {}
                Err(DirectoryError::InvalidData(_)) => return Err(Error::PasswordPolicy),
                Err(e) => return Err(e.into()),
            }
            self.write_user(&user).await?;
        }
        Ok(())
    }

    /// Triggers the password-update action email for the contact number.
    ///
    /// ## Errors
    ///
    /// Returns `Error::EmailNotVerified` unless a verified email is set.
    pub async fn reset_password_action(
        &self,
        contact_number: &str,
        redirect: Option<&ClientRedirect>,
    ) -> Result<()> {
        let user = self
            .find_identity(contact_number)
            .await?
            .ok_or_else(|| Error::IdentityNotFound(contact_number.to_string()))?;
        self.request_password_update(&user, contact_number, redirect)
            .await
    }

    /// Triggers the password-update action email for the nav4 id.
    pub async fn reset_password_action_nav4(
        &self,
        nav4_id: &str,
        redirect: Option<&ClientRedirect>,
    ) -> Result<()> {
        let user = self
            .find_identity_nav4(nav4_id)
            .await?
            .ok_or_else(|| Error::IdentityNotFound(format!("nav4Id = {nav4_id}")))?;
        self.request_password_update(&user, nav4_id, redirect).await
    }

    async fn request_password_update(
        &self,
        user: &User,
        key: &str,
        redirect: Option<&ClientRedirect>,
    ) -> Result<()> {
        if !user.has_email() || !user.email_verified {
            return Err(Error::EmailNotVerified(key.to_string()));
        }
        self.directory
            .execute_actions_email(user_id(user)?, &[RequiredAction::UpdatePassword], redirect)
            .await?;
        Ok(())
    }

    /// Pending required actions of the identity with the username.
    pub async fn required_actions(&self, username: &str) -> Result<Vec<String>> {
        let user = self
            .find_identity_by_username(username)
            .await?
            .ok_or_else(|| Error::IdentityNotFound(format!("username = {username}")))?;
        Ok(user.required_actions)
    }

    /// Soft-locks (or unlocks) the identity by toggling the enabled flag.
    pub async fn block_identity(&self, contact_number: &str, blocked: bool) -> Result<()> {
        let mut user = self
            .find_identity(contact_number)
            .await?
            .ok_or_else(|| Error::IdentityNotFound(contact_number.to_string()))?;
        user.enabled = !blocked;
        self.write_user(&user).await
    }

    /// Starts an impersonated session for the identity.
    pub async fn impersonate_identity(&self, contact_number: &str) -> Result<()> {
        let user = self
            .find_identity(contact_number)
            .await?
            .ok_or_else(|| Error::IdentityNotFound(contact_number.to_string()))?;
        self.directory.impersonate(user_id(&user)?).await?;
        Ok(())
    }

    /// Terminates the identity's sessions.
    pub async fn logout_identity(&self, contact_number: &str) -> Result<()> {
        let user = self
            .find_identity(contact_number)
            .await?
            .ok_or_else(|| Error::IdentityNotFound(contact_number.to_string()))?;
        self.directory.logout(user_id(&user)?).await?;
        Ok(())
    }

    /// Whether the brute-force detector currently locks the username out.
    /// Unknown usernames report `false`.
    pub async fn is_temporarily_locked(&self, username: &str) -> Result<bool> {
        match self.find_identity_by_username(username).await? {
            Some(user) => Ok(self.directory.is_brute_force_locked(user_id(&user)?).await?),
            None => Ok(false),
        }
    }

    /// Stores the driver PIN of the identity.
    pub async fn set_driver_pin(&self, contact_number: &str, pin: &str) -> Result<()> {
        let pin = non_blank(Some(pin))
            .ok_or_else(|| Error::Validation("driver PIN must not be blank".to_string()))?;
        let mut user = self
            .find_identity(contact_number)
            .await?
            .ok_or_else(|| Error::IdentityNotFound(contact_number.to_string()))?;
        user.attributes.set_single(names::DRIVER_PIN, pin);
        self.write_user(&user).await
    }

    /// Reads the driver PIN of the identity.
    ///
    /// ## Errors
    ///
    /// Returns `Error::AttributeNotFound` when no PIN is stored.
    pub async fn get_driver_pin(&self, contact_number: &str) -> Result<String> {
        let user = self
            .find_identity(contact_number)
            .await?
            .ok_or_else(|| Error::IdentityNotFound(contact_number.to_string()))?;
        user.attributes
            .first(names::DRIVER_PIN)
            .map(str::to_owned)
            .ok_or(Error::AttributeNotFound(names::DRIVER_PIN))
    }

    /// Removes the driver PIN of the identity.
    pub async fn remove_driver_pin(&self, contact_number: &str) -> Result<()> {
        let mut user = self
            .find_identity(contact_number)
            .await?
            .ok_or_else(|| Error::IdentityNotFound(contact_number.to_string()))?;
        user.attributes.remove(names::DRIVER_PIN);
        self.write_user(&user).await
    }

    /// Applies a role-set mutation to the identity and refreshes the
    /// rights cache (see [`RightsService::update_roles`]).
    pub async fn update_roles(
        &self,
        identity_id: Uuid,
        role_ids: &[String],
        mode: UpdateMode,
        scope: Option<&[Role]>,
    ) -> Result<()> {
        self.rights
            .update_roles(identity_id, role_ids, mode, scope)
            .await
    }

    /// Whether the role is assigned to the identity with the contact
    /// number.
    pub async fn is_active_role(&self, role_id: &str, contact_number: &str) -> Result<bool> {
        let user = self
            .find_identity(contact_number)
            .await?
            .ok_or_else(|| Error::IdentityNotFound(contact_number.to_string()))?;
        self.rights.is_active_role(user_id(&user)?, role_id).await
    }

    /// Whether the role is assigned to the identity with the nav4 id.
    pub async fn is_active_role_nav4(&self, role_id: &str, nav4_id: &str) -> Result<bool> {
        let user = self
            .find_identity_nav4(nav4_id)
            .await?
            .ok_or_else(|| Error::IdentityNotFound(format!("nav4Id = {nav4_id}")))?;
        self.rights.is_active_role(user_id(&user)?, role_id).await
    }

    /// Compound attribute search over an ordered predicate list (see
    /// [`IdentitySearch::search`]).
    pub async fn search(&self, predicates: &[(IdentityProperty, String)]) -> Result<Vec<Identity>> {
        self.search.search(predicates).await
    }
}

#[cfg(test)]
mod tests {
    use sso_directory::MemoryDirectory;

    use super::*;

    fn service() -> IdentityService {
        IdentityService::new(Arc::new(MemoryDirectory::new()))
    }

    #[tokio::test]
    async fn creation_requires_a_business_key() {
        let identities = service();
        let err = identities
            .create_identity(&Identity::new("ACC1"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::MissingKey(_)));
    }

    #[tokio::test]
    async fn creation_requires_an_existing_account() {
        let identities = service();
        let err = identities
            .create_identity(&Identity::new("ACC404").with_contact_number("C1"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::AccountNotFound(_)));
    }

    #[tokio::test]
    async fn state_of_unknown_identity_is_not_exists() {
        let identities = service();
        let state = identities.get_identity_state("C404").await.unwrap();
        assert_eq!(state, IdentityState::NotExists);
    }
}
