//! Group directory provider trait.

use async_trait::async_trait;
use sso_model::{Group, User};
use uuid::Uuid;

use crate::error::DirectoryResult;

/// Provider for group operations on the remote directory.
///
/// Implementations must be thread-safe and support concurrent callers.
#[async_trait]
pub trait GroupDirectory: Send + Sync {
    /// Resolves a group by its full path. Absent groups are `None`.
    async fn group_by_path(&self, path: &str) -> DirectoryResult<Option<Group>>;

    /// Creates a top-level group, returning the assigned id.
    ///
    /// ## Errors
    ///
    /// Returns `DirectoryError::Conflict` when the path is already taken.
    async fn create_group(&self, group: &Group) -> DirectoryResult<Uuid>;

    /// Creates a subgroup under `parent`, returning the assigned id.
    ///
    /// ## Errors
    ///
    /// Returns `DirectoryError::Conflict` when the computed path is taken
    /// and `DirectoryError::NotFound` when the parent is gone.
    async fn create_subgroup(&self, parent: Uuid, group: &Group) -> DirectoryResult<Uuid>;

    /// Lists the direct subgroups of `parent`.
    async fn subgroups(&self, parent: Uuid) -> DirectoryResult<Vec<Group>>;

    /// Deletes a group.
    ///
    /// ## Errors
    ///
    /// Returns `DirectoryError::NotFound` when the group doesn't exist.
    async fn delete_group(&self, id: Uuid) -> DirectoryResult<()>;

    /// Lists the user members of a group.
    async fn group_members(&self, id: Uuid) -> DirectoryResult<Vec<User>>;

    /// Adds a user to a group's membership (idempotent).
    async fn add_group_member(&self, id: Uuid, user_id: Uuid) -> DirectoryResult<()>;

    /// Ids of groups whose attribute `name` has a value equal to `value`.
    ///
    /// This is the store's only native query: a single attribute-equality
    /// predicate. Compound filters must be composed by the caller.
    async fn find_group_ids_by_attribute(
        &self,
        name: &str,
        value: &str,
    ) -> DirectoryResult<Vec<Uuid>>;
}
