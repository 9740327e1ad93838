//! Account management over master-group subgroups.
//!
//! Every account is a subgroup of one well-known master group. The group
//! name (and therefore the path) comes from the account's display name;
//! lookups always go through the `accountNumber` attribute, never the
//! path, so renames and numbers stay independent.

use std::sync::Arc;

use sso_directory::{Directory, DirectoryError};
use sso_model::attribute::names;
use sso_model::{Account, Group, Identity, IdentityProperty};
use uuid::Uuid;

use crate::codec;
use crate::error::{Error, Result};
use crate::search::IdentitySearch;

/// Name of the master group containing every account subgroup.
pub const MASTER_GROUP: &str = "Accounts";

/// Account CRUD composed from group operations on the remote directory.
#[derive(Clone)]
pub struct AccountService {
    directory: Arc<dyn Directory>,
    search: IdentitySearch,
}

fn group_id(group: &Group) -> Result<Uuid> {
    group
        .id
        .ok_or_else(|| Error::Validation("directory group carries no id".to_string()))
}

impl AccountService {
    /// Creates an account service over the given directory.
    #[must_use]
    pub fn new(directory: Arc<dyn Directory>) -> Self {
        Self {
            search: IdentitySearch::new(directory.clone()),
            directory,
        }
    }

    /// Resolves the master group, creating it when absent.
    ///
    /// The bootstrap is idempotent: a conflict from a concurrent creation
    /// is re-resolved as success rather than surfaced.
    async fn master_group(&self) -> Result<Group> {
        let path = format!("/{MASTER_GROUP}");
        if let Some(group) = self.directory.group_by_path(&path).await? {
            return Ok(group);
        }
        match self.directory.create_group(&Group::new(MASTER_GROUP)).await {
            Ok(_) => {}
            Err(e) if e.is_conflict() => {}
            Err(e) => return Err(e.into()),
        }
        match self.directory.group_by_path(&path).await? {
            Some(group) => Ok(group),
            None => Err(DirectoryError::not_found("group", path).into()),
        }
    }

    /// Finds the account group by its `accountNumber` attribute.
    ///
    /// A linear scan of the master group's direct subgroups; no secondary
    /// index is kept at this scale.
    pub async fn find_group(&self, account_number: &str) -> Result<Option<Group>> {
        let master = self.master_group().await?;
        let subgroups = self.directory.subgroups(group_id(&master)?).await?;
        Ok(subgroups
            .into_iter()
            .find(|g| g.attributes.contains(names::ACCOUNT_NUMBER, account_number)))
    }

    /// Finds the decoded account, if present.
    pub async fn find_account(&self, account_number: &str) -> Result<Option<Account>> {
        Ok(self
            .find_group(account_number)
            .await?
            .as_ref()
            .and_then(codec::decode_account))
    }

    /// Reads an account.
    ///
    /// ## Errors
    ///
    /// Returns `Error::AccountNotFound` when no account carries the number.
    pub async fn get_account(&self, account_number: &str) -> Result<Account> {
        self.find_account(account_number)
            .await?
            .ok_or_else(|| Error::AccountNotFound(account_number.to_string()))
    }

    /// Creates an account as a subgroup of the master group.
    ///
    /// ## Errors
    ///
    /// Returns `Error::DuplicateAccount` when the store reports a conflict
    /// on the computed group path; any other failure is unexpected.
    pub async fn create_account(&self, account: &Account) -> Result<Account> {
        let master = self.master_group().await?;
        let group = codec::encode_account(account, &format!("/{MASTER_GROUP}"));
        match self
            .directory
            .create_subgroup(group_id(&master)?, &group)
            .await
        {
            Ok(_) => self.get_account(&account.account_number).await,
            Err(e) if e.is_conflict() => Err(Error::DuplicateAccount),
            Err(e) => Err(e.into()),
        }
    }

    /// Lists all accounts (subgroups carrying an account number).
    pub async fn get_accounts(&self) -> Result<Vec<Account>> {
        let master = self.master_group().await?;
        let subgroups = self.directory.subgroups(group_id(&master)?).await?;
        Ok(subgroups
            .iter()
            .filter_map(codec::decode_account)
            .collect())
    }

    /// Deletes an account.
    ///
    /// ## Errors
    ///
    /// Returns `Error::AccountNotFound` when no account carries the number.
    pub async fn delete_account(&self, account_number: &str) -> Result<()> {
        let group = self
            .find_group(account_number)
            .await?
            .ok_or_else(|| Error::AccountNotFound(account_number.to_string()))?;
        self.directory.delete_group(group_id(&group)?).await?;
        Ok(())
    }

    /// Identities that are members of the account.
    ///
    /// With a non-empty `contact_numbers` filter only matching members are
    /// returned; an empty filter returns every member.
    pub async fn get_account_identities(
        &self,
        account_number: &str,
        contact_numbers: &[String],
    ) -> Result<Vec<Identity>> {
        let group = self
            .find_group(account_number)
            .await?
            .ok_or_else(|| Error::AccountNotFound(account_number.to_string()))?;
        let members = self.directory.group_members(group_id(&group)?).await?;
        let mut identities = Vec::new();
        for user in members {
            let contact = user.attributes.first(names::CONTACT_NUMBER);
            let keep = contact_numbers.is_empty()
                || contact.is_some_and(|c| contact_numbers.iter().any(|n| n == c));
            if keep {
                identities.push(self.search.decode(&user, false).await?);
            }
        }
        Ok(identities)
    }

    /// The member identity with the given contact number.
    ///
    /// ## Errors
    ///
    /// Returns `Error::IdentityNotFound` when no member matches.
    pub async fn get_account_identity(
        &self,
        account_number: &str,
        contact_number: &str,
    ) -> Result<Identity> {
        self.get_account_identities(account_number, &[contact_number.to_string()])
            .await?
            .into_iter()
            .find(|i| i.contact_number.as_deref() == Some(contact_number))
            .ok_or_else(|| Error::IdentityNotFound(contact_number.to_string()))
    }

    /// Deletes the member identity with the given contact number.
    pub async fn delete_account_identity(
        &self,
        account_number: &str,
        contact_number: &str,
    ) -> Result<()> {
        let identity = self
            .get_account_identity(account_number, contact_number)
            .await?;
        let id = identity
            .identity_id
            .ok_or_else(|| Error::IdentityNotFound(contact_number.to_string()))?;
        self.directory.delete_user(id).await?;
        Ok(())
    }

    /// Whether a username is already taken.
    pub async fn username_exists(&self, username: &str) -> Result<bool> {
        Ok(!self
            .search
            .find_ids(IdentityProperty::Username, username)
            .await?
            .is_empty())
    }
}
