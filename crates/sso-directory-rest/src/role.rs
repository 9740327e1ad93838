//! Role operations over the admin API.

use async_trait::async_trait;
use reqwest::Method;
use sso_directory::{DirectoryResult, RoleDirectory};
use sso_model::Role;
use uuid::Uuid;

use crate::client::RestDirectory;

#[async_trait]
impl RoleDirectory for RestDirectory {
    async fn realm_roles(&self) -> DirectoryResult<Vec<Role>> {
        let builder = self.request(Method::GET, "roles");
        self.fetch_json(builder, "role", "realm").await
    }

    async fn role_by_id(&self, role_id: &str) -> DirectoryResult<Option<Role>> {
        let builder = self.request_segments(Method::GET, "roles", &[role_id])?;
        self.fetch_json_opt(builder, "role", role_id).await
    }

    async fn realm_roles_of_user(&self, user_id: Uuid) -> DirectoryResult<Vec<Role>> {
        let builder = self.request(Method::GET, &format!("users/{user_id}/role-mappings/realm"));
        self.fetch_json(builder, "user", &user_id.to_string()).await
    }

    async fn add_realm_roles(&self, user_id: Uuid, roles: &[Role]) -> DirectoryResult<()> {
        let builder = self
            .request(Method::POST, &format!("users/{user_id}/role-mappings/realm"))
            .json(&roles);
        self.send_ok(builder, "user", &user_id.to_string()).await
    }

    async fn remove_realm_roles(&self, user_id: Uuid, roles: &[Role]) -> DirectoryResult<()> {
        let builder = self
            .request(Method::DELETE, &format!("users/{user_id}/role-mappings/realm"))
            .json(&roles);
        self.send_ok(builder, "user", &user_id.to_string()).await
    }
}
