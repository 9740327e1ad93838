//! Role directory provider trait.

use async_trait::async_trait;
use sso_model::Role;
use uuid::Uuid;

use crate::error::DirectoryResult;

/// Provider for realm-level role operations on the remote directory.
#[async_trait]
pub trait RoleDirectory: Send + Sync {
    /// Lists all realm-level roles.
    async fn realm_roles(&self) -> DirectoryResult<Vec<Role>>;

    /// Reads a realm role by id. Absent roles are `None`.
    async fn role_by_id(&self, role_id: &str) -> DirectoryResult<Option<Role>>;

    /// Realm-level roles currently assigned to the user.
    async fn realm_roles_of_user(&self, user_id: Uuid) -> DirectoryResult<Vec<Role>>;

    /// Assigns realm roles to the user (idempotent per role).
    async fn add_realm_roles(&self, user_id: Uuid, roles: &[Role]) -> DirectoryResult<()>;

    /// Removes realm roles from the user (absent assignments are ignored).
    async fn remove_realm_roles(&self, user_id: Uuid, roles: &[Role]) -> DirectoryResult<()>;
}
