//! Role bitmask cache maintenance.
//!
//! Permission checks elsewhere in the system read a single `binaryRights`
//! attribute instead of listing roles. The attribute is the union of the
//! assigned roles' `binaryMask` bits, recomputed synchronously after every
//! role mutation and removed entirely when the role set becomes empty.

use std::sync::Arc;

use sso_directory::Directory;
use sso_model::attribute::names;
use sso_model::{BinaryRights, Role, UpdateMode};
use uuid::Uuid;

use crate::error::{Error, Result};

/// Maintains the compact rights encoding of assigned role sets.
#[derive(Clone)]
pub struct RightsService {
    directory: Arc<dyn Directory>,
}

impl RightsService {
    /// Creates a rights service over the given directory.
    #[must_use]
    pub fn new(directory: Arc<dyn Directory>) -> Self {
        Self { directory }
    }

    /// Resolves roles by id, skipping ids the role service doesn't know.
    async fn resolve_roles(&self, role_ids: &[String]) -> Result<Vec<Role>> {
        let mut roles = Vec::with_capacity(role_ids.len());
        for id in role_ids {
            match self.directory.role_by_id(id).await? {
                Some(role) => roles.push(role),
                None => tracing::debug!(role_id = %id, "skipping unknown role"),
            }
        }
        Ok(roles)
    }

    /// The combined binary mask of the user's current realm roles.
    ///
    /// `None` when no assigned role carries a mask.
    pub async fn roles_binary(&self, user_id: Uuid) -> Result<Option<String>> {
        let roles = self.directory.realm_roles_of_user(user_id).await?;
        let mut rights = BinaryRights::new();
        for role in &roles {
            if let Some(mask) = role.binary_mask().and_then(BinaryRights::parse) {
                rights.union(&mask);
            }
        }
        Ok(rights.encode())
    }

    /// Recomputes the cached `binaryRights` attribute from the current
    /// role set; an empty result removes the attribute.
    pub async fn refresh_binary_rights(&self, user_id: Uuid) -> Result<()> {
        let mut user = self
            .directory
            .user_by_id(user_id)
            .await?
            .ok_or_else(|| Error::IdentityNotFound(user_id.to_string()))?;
        match self.roles_binary(user_id).await? {
            Some(mask) => user.attributes.set_single(names::BINARY_RIGHTS, mask),
            None => {
                user.attributes.remove(names::BINARY_RIGHTS);
            }
        }
        self.directory.update_user(&user).await?;
        Ok(())
    }

    /// Decodes a cached mask back into the role ids it covers.
    pub async fn decode_binary_rights(&self, mask: &str) -> Result<Vec<String>> {
        let Some(combined) = BinaryRights::parse(mask) else {
            return Ok(Vec::new());
        };
        let roles = self.directory.realm_roles().await?;
        Ok(roles
            .into_iter()
            .filter(|role| {
                role.binary_mask()
                    .and_then(BinaryRights::parse)
                    .is_some_and(|m| combined.intersects(&m))
            })
            .map(|role| role.id)
            .collect())
    }

    /// Ids of the realm roles currently assigned to the user.
    pub async fn identity_roles(&self, user_id: Uuid) -> Result<Vec<String>> {
        Ok(self
            .directory
            .realm_roles_of_user(user_id)
            .await?
            .into_iter()
            .map(|role| role.id)
            .collect())
    }

    /// Whether the role is currently assigned to the user.
    pub async fn is_active_role(&self, user_id: Uuid, role_id: &str) -> Result<bool> {
        Ok(self
            .directory
            .realm_roles_of_user(user_id)
            .await?
            .iter()
            .any(|role| role.id == role_id))
    }

    /// Applies a role-set mutation and refreshes the bitmask cache.
    ///
    /// UPDATE replaces the assigned set with `role_ids` (removals
    /// restricted to `scope` when given), ADD unions, DELETE subtracts.
    /// Unknown role ids in the input are skipped.
    pub async fn update_roles(
        &self,
        user_id: Uuid,
        role_ids: &[String],
        mode: UpdateMode,
        scope: Option<&[Role]>,
    ) -> Result<()> {
        if self.directory.user_by_id(user_id).await?.is_none() {
            return Err(Error::IdentityNotFound(user_id.to_string()));
        }

        match mode {
            UpdateMode::Update => {
                let current = match scope {
                    Some(roles) => roles.to_vec(),
                    None => self.directory.realm_roles_of_user(user_id).await?,
                };
                let stale: Vec<Role> = current
                    .into_iter()
                    .filter(|role| !role_ids.contains(&role.id))
                    .collect();
                if !stale.is_empty() {
                    self.directory.remove_realm_roles(user_id, &stale).await?;
                }
                let wanted = self.resolve_roles(role_ids).await?;
                if !wanted.is_empty() {
                    self.directory.add_realm_roles(user_id, &wanted).await?;
                }
            }
            UpdateMode::Add => {
                let wanted = self.resolve_roles(role_ids).await?;
                if !wanted.is_empty() {
                    self.directory.add_realm_roles(user_id, &wanted).await?;
                }
            }
            UpdateMode::Delete => {
                let unwanted = self.resolve_roles(role_ids).await?;
                if !unwanted.is_empty() {
                    self.directory
                        .remove_realm_roles(user_id, &unwanted)
                        .await?;
                }
            }
        }

        self.refresh_binary_rights(user_id).await
    }
}
