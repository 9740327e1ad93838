//! In-memory directory implementation.
//!
//! Backs service tests and local development with the same contract the
//! remote store exposes: native username uniqueness, single-predicate
//! attribute queries, a password policy, and recorded side effects
//! (action emails, impersonations, logouts) that tests can assert on.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use sso_model::{ClientRedirect, Group, RequiredAction, Role, User};
use uuid::Uuid;

use crate::error::{DirectoryError, DirectoryResult};
use crate::group::GroupDirectory;
use crate::role::RoleDirectory;
use crate::user::UserDirectory;

/// Minimum password length accepted by the in-memory password policy.
pub const MIN_PASSWORD_LEN: usize = 8;

/// A required-actions email recorded by the in-memory directory.
#[derive(Debug, Clone)]
pub struct ActionEmail {
    /// Target user.
    pub user_id: Uuid,
    /// Dispatched action names.
    pub actions: Vec<String>,
    /// Optional client redirect attached to the email.
    pub redirect: Option<ClientRedirect>,
}

#[derive(Debug, Clone)]
struct StoredGroup {
    group: Group,
    parent: Option<Uuid>,
    members: Vec<Uuid>,
}

#[derive(Debug, Default)]
struct State {
    groups: HashMap<Uuid, StoredGroup>,
    users: HashMap<Uuid, User>,
    passwords: HashMap<Uuid, String>,
    roles: Vec<Role>,
    user_roles: HashMap<Uuid, Vec<String>>,
    brute_force_locked: HashSet<Uuid>,
    action_emails: Vec<ActionEmail>,
    impersonations: Vec<Uuid>,
    logouts: Vec<Uuid>,
}

/// Thread-safe in-memory directory.
#[derive(Debug, Default)]
pub struct MemoryDirectory {
    state: RwLock<State>,
}

impl MemoryDirectory {
    /// Creates an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a realm role, replacing any role with the same id.
    pub fn define_role(&self, role: Role) {
        let mut state = self.state.write();
        state.roles.retain(|r| r.id != role.id);
        state.roles.push(role);
    }

    /// Sets the brute-force lockout flag for a user.
    pub fn set_brute_force_locked(&self, user_id: Uuid, locked: bool) {
        let mut state = self.state.write();
        if locked {
            state.brute_force_locked.insert(user_id);
        } else {
            state.brute_force_locked.remove(&user_id);
        }
    }

    /// Required-action emails dispatched so far, in order.
    #[must_use]
    pub fn action_emails(&self) -> Vec<ActionEmail> {
        self.state.read().action_emails.clone()
    }

    /// Users impersonated so far, in order.
    #[must_use]
    pub fn impersonations(&self) -> Vec<Uuid> {
        self.state.read().impersonations.clone()
    }

    /// Users logged out so far, in order.
    #[must_use]
    pub fn logouts(&self) -> Vec<Uuid> {
        self.state.read().logouts.clone()
    }

    fn group_path(state: &State, stored: &StoredGroup) -> String {
        match stored.group.path.clone() {
            Some(path) => path,
            None => match stored.parent.and_then(|p| state.groups.get(&p)) {
                Some(parent) => format!("{}/{}", Self::group_path(state, parent), stored.group.name),
                None => format!("/{}", stored.group.name),
            },
        }
    }

    fn path_taken(state: &State, path: &str) -> bool {
        state
            .groups
            .values()
            .any(|g| Self::group_path(state, g) == path)
    }
}

#[async_trait]
impl GroupDirectory for MemoryDirectory {
    async fn group_by_path(&self, path: &str) -> DirectoryResult<Option<Group>> {
        let state = self.state.read();
        Ok(state
            .groups
            .values()
            .find(|g| Self::group_path(&state, g) == path)
            .map(|g| g.group.clone()))
    }

    async fn create_group(&self, group: &Group) -> DirectoryResult<Uuid> {
        let mut state = self.state.write();
        let path = format!("/{}", group.name);
        if Self::path_taken(&state, &path) {
            return Err(DirectoryError::conflict("group", path));
        }
        let id = Uuid::now_v7();
        let mut stored = group.clone();
        stored.id = Some(id);
        stored.path = Some(path);
        state.groups.insert(
            id,
            StoredGroup {
                group: stored,
                parent: None,
                members: Vec::new(),
            },
        );
        Ok(id)
    }

    async fn create_subgroup(&self, parent: Uuid, group: &Group) -> DirectoryResult<Uuid> {
        let mut state = self.state.write();
        let parent_path = match state.groups.get(&parent) {
            Some(stored) => Self::group_path(&state, stored),
            None => return Err(DirectoryError::not_found("group", parent.to_string())),
        };
        let path = format!("{parent_path}/{}", group.name);
        if Self::path_taken(&state, &path) {
            return Err(DirectoryError::conflict("group", path));
        }
        let id = Uuid::now_v7();
        let mut stored = group.clone();
        stored.id = Some(id);
        stored.path = Some(path);
        state.groups.insert(
            id,
            StoredGroup {
                group: stored,
                parent: Some(parent),
                members: Vec::new(),
            },
        );
        Ok(id)
    }

    async fn subgroups(&self, parent: Uuid) -> DirectoryResult<Vec<Group>> {
        let state = self.state.read();
        let mut groups: Vec<Group> = state
            .groups
            .values()
            .filter(|g| g.parent == Some(parent))
            .map(|g| g.group.clone())
            .collect();
        groups.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(groups)
    }

    async fn delete_group(&self, id: Uuid) -> DirectoryResult<()> {
        let mut state = self.state.write();
        if state.groups.remove(&id).is_none() {
            return Err(DirectoryError::not_found("group", id.to_string()));
        }
        Ok(())
    }

    async fn group_members(&self, id: Uuid) -> DirectoryResult<Vec<User>> {
        let state = self.state.read();
        let stored = state
            .groups
            .get(&id)
            .ok_or_else(|| DirectoryError::not_found("group", id.to_string()))?;
        Ok(stored
            .members
            .iter()
            .filter_map(|m| state.users.get(m).cloned())
            .collect())
    }

    async fn add_group_member(&self, id: Uuid, user_id: Uuid) -> DirectoryResult<()> {
        let mut state = self.state.write();
        if !state.users.contains_key(&user_id) {
            return Err(DirectoryError::not_found("user", user_id.to_string()));
        }
        let stored = state
            .groups
            .get_mut(&id)
            .ok_or_else(|| DirectoryError::not_found("group", id.to_string()))?;
        if !stored.members.contains(&user_id) {
            stored.members.push(user_id);
        }
        Ok(())
    }

    async fn find_group_ids_by_attribute(
        &self,
        name: &str,
        value: &str,
    ) -> DirectoryResult<Vec<Uuid>> {
        let state = self.state.read();
        let mut ids: Vec<Uuid> = state
            .groups
            .values()
            .filter(|g| g.group.attributes.contains(name, value))
            .filter_map(|g| g.group.id)
            .collect();
        ids.sort();
        Ok(ids)
    }
}

#[async_trait]
impl UserDirectory for MemoryDirectory {
    async fn create_user(&self, user: &User) -> DirectoryResult<Uuid> {
        let mut state = self.state.write();
        if state
            .users
            .values()
            .any(|u| u.username.eq_ignore_ascii_case(&user.username))
        {
            return Err(DirectoryError::conflict("user", user.username.clone()));
        }
        let id = Uuid::now_v7();
        let mut stored = user.clone();
        stored.id = Some(id);
        stored.created_at = Some(Utc::now());
        state.users.insert(id, stored);
        Ok(id)
    }

    async fn user_by_id(&self, id: Uuid) -> DirectoryResult<Option<User>> {
        Ok(self.state.read().users.get(&id).cloned())
    }

    async fn update_user(&self, user: &User) -> DirectoryResult<()> {
        let id = user
            .id
            .ok_or_else(|| DirectoryError::InvalidData("user id missing".to_string()))?;
        let mut state = self.state.write();
        if !state.users.contains_key(&id) {
            return Err(DirectoryError::not_found("user", id.to_string()));
        }
        if state
            .users
            .values()
            .any(|u| u.id != Some(id) && u.username.eq_ignore_ascii_case(&user.username))
        {
            return Err(DirectoryError::conflict("user", user.username.clone()));
        }
        state.users.insert(id, user.clone());
        Ok(())
    }

    async fn delete_user(&self, id: Uuid) -> DirectoryResult<()> {
        let mut state = self.state.write();
        if state.users.remove(&id).is_none() {
            return Err(DirectoryError::not_found("user", id.to_string()));
        }
        state.passwords.remove(&id);
        state.user_roles.remove(&id);
        for group in state.groups.values_mut() {
            group.members.retain(|m| *m != id);
        }
        Ok(())
    }

    async fn find_user_ids_by_attribute(
        &self,
        name: &str,
        value: &str,
    ) -> DirectoryResult<Vec<Uuid>> {
        let state = self.state.read();
        let matches = |user: &User| match name {
            "username" => user.username.eq_ignore_ascii_case(value),
            "email" => user
                .email
                .as_deref()
                .is_some_and(|e| e.eq_ignore_ascii_case(value)),
            _ => user.attributes.contains(name, value),
        };
        let mut ids: Vec<Uuid> = state
            .users
            .values()
            .filter(|u| matches(u))
            .filter_map(|u| u.id)
            .collect();
        ids.sort();
        Ok(ids)
    }

    async fn has_credentials(&self, id: Uuid) -> DirectoryResult<bool> {
        Ok(self.state.read().passwords.contains_key(&id))
    }

    async fn reset_password(
        &self,
        id: Uuid,
        password: &str,
        _temporary: bool,
    ) -> DirectoryResult<()> {
        let mut state = self.state.write();
        if !state.users.contains_key(&id) {
            return Err(DirectoryError::not_found("user", id.to_string()));
        }
        if password.len() < MIN_PASSWORD_LEN {
            return Err(DirectoryError::InvalidData(
                "password does not satisfy the password policy".to_string(),
            ));
        }
        state.passwords.insert(id, password.to_string());
        Ok(())
    }

    async fn execute_actions_email(
        &self,
        id: Uuid,
        actions: &[RequiredAction],
        redirect: Option<&ClientRedirect>,
    ) -> DirectoryResult<()> {
        let mut state = self.state.write();
        if !state.users.contains_key(&id) {
            return Err(DirectoryError::not_found("user", id.to_string()));
        }
        state.action_emails.push(ActionEmail {
            user_id: id,
            actions: actions.iter().map(|a| a.as_str().to_string()).collect(),
            redirect: redirect.cloned(),
        });
        Ok(())
    }

    async fn impersonate(&self, id: Uuid) -> DirectoryResult<()> {
        let mut state = self.state.write();
        if !state.users.contains_key(&id) {
            return Err(DirectoryError::not_found("user", id.to_string()));
        }
        state.impersonations.push(id);
        Ok(())
    }

    async fn logout(&self, id: Uuid) -> DirectoryResult<()> {
        let mut state = self.state.write();
        if !state.users.contains_key(&id) {
            return Err(DirectoryError::not_found("user", id.to_string()));
        }
        state.logouts.push(id);
        Ok(())
    }

    async fn is_brute_force_locked(&self, id: Uuid) -> DirectoryResult<bool> {
        Ok(self.state.read().brute_force_locked.contains(&id))
    }
}

#[async_trait]
impl RoleDirectory for MemoryDirectory {
    async fn realm_roles(&self) -> DirectoryResult<Vec<Role>> {
        Ok(self.state.read().roles.clone())
    }

    async fn role_by_id(&self, role_id: &str) -> DirectoryResult<Option<Role>> {
        Ok(self
            .state
            .read()
            .roles
            .iter()
            .find(|r| r.id == role_id)
            .cloned())
    }

    async fn realm_roles_of_user(&self, user_id: Uuid) -> DirectoryResult<Vec<Role>> {
        let state = self.state.read();
        if !state.users.contains_key(&user_id) {
            return Err(DirectoryError::not_found("user", user_id.to_string()));
        }
        let assigned = state.user_roles.get(&user_id).cloned().unwrap_or_default();
        Ok(state
            .roles
            .iter()
            .filter(|r| assigned.contains(&r.id))
            .cloned()
            .collect())
    }

    async fn add_realm_roles(&self, user_id: Uuid, roles: &[Role]) -> DirectoryResult<()> {
        let mut state = self.state.write();
        if !state.users.contains_key(&user_id) {
            return Err(DirectoryError::not_found("user", user_id.to_string()));
        }
        let assigned = state.user_roles.entry(user_id).or_default();
        for role in roles {
            if !assigned.contains(&role.id) {
                assigned.push(role.id.clone());
            }
        }
        Ok(())
    }

    async fn remove_realm_roles(&self, user_id: Uuid, roles: &[Role]) -> DirectoryResult<()> {
        let mut state = self.state.write();
        if !state.users.contains_key(&user_id) {
            return Err(DirectoryError::not_found("user", user_id.to_string()));
        }
        if let Some(assigned) = state.user_roles.get_mut(&user_id) {
            assigned.retain(|id| !roles.iter().any(|r| r.id == *id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use sso_model::attribute::names;

    use super::*;

    #[tokio::test]
    async fn username_uniqueness_is_native() {
        let directory = MemoryDirectory::new();
        directory.create_user(&User::new("jdoe")).await.unwrap();

        let err = directory.create_user(&User::new("JDoe")).await.unwrap_err();
        assert!(err.is_conflict());
    }

    #[tokio::test]
    async fn attribute_query_is_exact_and_field_query_ignores_case() {
        let directory = MemoryDirectory::new();
        let user = User::new("jdoe")
            .with_email("jdoe@example.com")
            .with_attribute(names::CONTACT_NUMBER, "C1");
        let id = directory.create_user(&user).await.unwrap();

        let by_attr = directory
            .find_user_ids_by_attribute(names::CONTACT_NUMBER, "C1")
            .await
            .unwrap();
        assert_eq!(by_attr, vec![id]);

        let by_attr_case = directory
            .find_user_ids_by_attribute(names::CONTACT_NUMBER, "c1")
            .await
            .unwrap();
        assert!(by_attr_case.is_empty());

        let by_email = directory
            .find_user_ids_by_attribute("email", "JDOE@example.com")
            .await
            .unwrap();
        assert_eq!(by_email, vec![id]);
    }

    #[tokio::test]
    async fn subgroup_paths_conflict() {
        let directory = MemoryDirectory::new();
        let parent = directory.create_group(&Group::new("Accounts")).await.unwrap();
        directory
            .create_subgroup(parent, &Group::new("ACME"))
            .await
            .unwrap();

        let err = directory
            .create_subgroup(parent, &Group::new("ACME"))
            .await
            .unwrap_err();
        assert!(err.is_conflict());

        let found = directory.group_by_path("/Accounts/ACME").await.unwrap();
        assert!(found.is_some());
    }

    #[tokio::test]
    async fn password_policy_is_enforced() {
        let directory = MemoryDirectory::new();
        let id = directory.create_user(&User::new("jdoe")).await.unwrap();

        let err = directory.reset_password(id, "short", false).await.unwrap_err();
        assert!(matches!(err, DirectoryError::InvalidData(_)));
        assert!(!directory.has_credentials(id).await.unwrap());

        directory.reset_password(id, "longenough", false).await.unwrap();
        assert!(directory.has_credentials(id).await.unwrap());
    }

    #[tokio::test]
    async fn role_assignment_round_trip() {
        let directory = MemoryDirectory::new();
        let id = directory.create_user(&User::new("jdoe")).await.unwrap();
        directory.define_role(Role::new("ROLE_A").with_binary_mask("1"));
        directory.define_role(Role::new("ROLE_B").with_binary_mask("10"));

        let role_a = directory.role_by_id("ROLE_A").await.unwrap().unwrap();
        directory.add_realm_roles(id, &[role_a.clone()]).await.unwrap();
        directory.add_realm_roles(id, &[role_a.clone()]).await.unwrap();

        let assigned = directory.realm_roles_of_user(id).await.unwrap();
        assert_eq!(assigned.len(), 1);

        directory.remove_realm_roles(id, &[role_a]).await.unwrap();
        assert!(directory.realm_roles_of_user(id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn deleting_a_user_clears_memberships() {
        let directory = MemoryDirectory::new();
        let parent = directory.create_group(&Group::new("Accounts")).await.unwrap();
        let group = directory
            .create_subgroup(parent, &Group::new("ACME"))
            .await
            .unwrap();
        let id = directory.create_user(&User::new("jdoe")).await.unwrap();
        directory.add_group_member(group, id).await.unwrap();

        directory.delete_user(id).await.unwrap();
        assert!(directory.group_members(group).await.unwrap().is_empty());
        assert!(directory.user_by_id(id).await.unwrap().is_none());
    }
}
