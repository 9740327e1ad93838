//! Group operations over the admin API.

use async_trait::async_trait;
use reqwest::Method;
use sso_directory::{DirectoryResult, GroupDirectory};
use sso_model::{Group, User};
use uuid::Uuid;

use crate::client::RestDirectory;

#[async_trait]
impl GroupDirectory for RestDirectory {
    async fn group_by_path(&self, path: &str) -> DirectoryResult<Option<Group>> {
        let segments: Vec<&str> = path
            .trim_start_matches('/')
            .split('/')
            .filter(|s| !s.is_empty())
            .collect();
        let builder = self.request_segments(Method::GET, "group-by-path", &segments)?;
        self.fetch_json_opt(builder, "group", path).await
    }

    async fn create_group(&self, group: &Group) -> DirectoryResult<Uuid> {
        let builder = self.request(Method::POST, "groups").json(group);
        self.send_created(builder, "group", &group.name).await
    }

    async fn create_subgroup(&self, parent: Uuid, group: &Group) -> DirectoryResult<Uuid> {
        let builder = self
            .request(Method::POST, &format!("groups/{parent}/children"))
            .json(group);
        self.send_created(builder, "group", &group.name).await
    }

    async fn subgroups(&self, parent: Uuid) -> DirectoryResult<Vec<Group>> {
        let builder = self.request(Method::GET, &format!("groups/{parent}/children"));
        self.fetch_json(builder, "group", &parent.to_string()).await
    }

    async fn delete_group(&self, id: Uuid) -> DirectoryResult<()> {
        let builder = self.request(Method::DELETE, &format!("groups/{id}"));
        self.send_ok(builder, "group", &id.to_string()).await
    }

    async fn group_members(&self, id: Uuid) -> DirectoryResult<Vec<User>> {
        let builder = self.request(Method::GET, &format!("groups/{id}/members"));
        self.fetch_json(builder, "group", &id.to_string()).await
    }

    async fn add_group_member(&self, id: Uuid, user_id: Uuid) -> DirectoryResult<()> {
        // Membership is written on the user side of the API.
        let builder = self.request(Method::PUT, &format!("users/{user_id}/groups/{id}"));
        self.send_ok(builder, "group", &id.to_string()).await
    }

    async fn find_group_ids_by_attribute(
        &self,
        name: &str,
        value: &str,
    ) -> DirectoryResult<Vec<Uuid>> {
        let predicate = format!("{name}:{value}");
        let builder = self
            .request(Method::GET, "groups")
            .query(&[("q", predicate.as_str())]);
        let groups: Vec<Group> = self.fetch_json(builder, "group", value).await?;
        Ok(groups.into_iter().filter_map(|g| g.id).collect())
    }
}
