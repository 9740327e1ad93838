//! User directory provider trait.

use async_trait::async_trait;
use sso_model::{ClientRedirect, RequiredAction, User};
use uuid::Uuid;

use crate::error::DirectoryResult;

/// Provider for user operations on the remote directory.
///
/// Implementations must be thread-safe and support concurrent callers.
/// There is no cross-operation atomicity: uniqueness beyond the native
/// username constraint is the caller's check-then-act responsibility.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Creates a user, returning the id extracted from the creation
    /// response.
    ///
    /// ## Errors
    ///
    /// Returns `DirectoryError::Conflict` when the username is taken and
    /// `DirectoryError::Unexpected` for any response outside the modeled
    /// status set.
    async fn create_user(&self, user: &User) -> DirectoryResult<Uuid>;

    /// Reads a user by id. Absent users are `None`, never an error.
    async fn user_by_id(&self, id: Uuid) -> DirectoryResult<Option<User>>;

    /// Replaces the stored user with `user` (its id must be set).
    ///
    /// ## Errors
    ///
    /// Returns `DirectoryError::InvalidData` when the store rejects the
    /// update, `DirectoryError::Conflict` on a username collision and
    /// `DirectoryError::NotFound` when the user is gone.
    async fn update_user(&self, user: &User) -> DirectoryResult<()>;

    /// Deletes a user by id.
    ///
    /// ## Errors
    ///
    /// Returns `DirectoryError::NotFound` when the user doesn't exist.
    async fn delete_user(&self, id: Uuid) -> DirectoryResult<()>;

    /// Ids of users whose attribute (or native field) `name` equals
    /// `value`.
    ///
    /// The native fields `username` and `email` are matched
    /// case-insensitively; attribute values are matched exactly. This is
    /// the store's only native query shape.
    async fn find_user_ids_by_attribute(
        &self,
        name: &str,
        value: &str,
    ) -> DirectoryResult<Vec<Uuid>>;

    /// Whether any credential is stored for the user.
    ///
    /// Absent users report `false` rather than an error.
    async fn has_credentials(&self, id: Uuid) -> DirectoryResult<bool>;

    /// Resets the user's password credential.
    ///
    /// ## Errors
    ///
    /// Returns `DirectoryError::InvalidData` when the password fails the
    /// store's policy.
    async fn reset_password(&self, id: Uuid, password: &str, temporary: bool)
        -> DirectoryResult<()>;

    /// Sends the required-actions notification email for the given actions.
    async fn execute_actions_email(
        &self,
        id: Uuid,
        actions: &[RequiredAction],
        redirect: Option<&ClientRedirect>,
    ) -> DirectoryResult<()>;

    /// Starts an impersonated session for the user.
    async fn impersonate(&self, id: Uuid) -> DirectoryResult<()>;

    /// Terminates all of the user's sessions.
    async fn logout(&self, id: Uuid) -> DirectoryResult<()>;

    /// Whether the brute-force detector currently locks the user out.
    async fn is_brute_force_locked(&self, id: Uuid) -> DirectoryResult<bool>;
}
