//! User operations over the admin API.

use async_trait::async_trait;
use reqwest::Method;
use serde::Serialize;
use serde_json::Value;
use sso_directory::{DirectoryError, DirectoryResult, UserDirectory};
use sso_model::{ClientRedirect, RequiredAction, User};
use uuid::Uuid;

use crate::client::RestDirectory;

#[derive(Serialize)]
struct PasswordPayload<'a> {
    #[serde(rename = "type")]
    credential_type: &'static str,
    value: &'a str,
    temporary: bool,
}

#[async_trait]
impl UserDirectory for RestDirectory {
    async fn create_user(&self, user: &User) -> DirectoryResult<Uuid> {
        let builder = self.request(Method::POST, "users").json(user);
        self.send_created(builder, "user", &user.username).await
    }

    async fn user_by_id(&self, id: Uuid) -> DirectoryResult<Option<User>> {
        let builder = self.request(Method::GET, &format!("users/{id}"));
        self.fetch_json_opt(builder, "user", &id.to_string()).await
    }

    async fn update_user(&self, user: &User) -> DirectoryResult<()> {
        let id = user
            .id
            .ok_or_else(|| DirectoryError::InvalidData("user id missing".to_string()))?;
        let builder = self.request(Method::PUT, &format!("users/{id}")).json(user);
        self.send_ok(builder, "user", &user.username).await
    }

    async fn delete_user(&self, id: Uuid) -> DirectoryResult<()> {
        let builder = self.request(Method::DELETE, &format!("users/{id}"));
        self.send_ok(builder, "user", &id.to_string()).await
    }

    async fn find_user_ids_by_attribute(
        &self,
        name: &str,
        value: &str,
    ) -> DirectoryResult<Vec<Uuid>> {
        // Native fields use their dedicated exact-match query parameters;
        // everything else goes through the single attribute predicate.
        let builder = match name {
            "username" | "email" => self
                .request(Method::GET, "users")
                .query(&[(name, value), ("exact", "true")]),
            _ => {
                let predicate = format!("{name}:{value}");
                self.request(Method::GET, "users")
                    .query(&[("q", predicate.as_str())])
            }
        };
        let users: Vec<User> = self.fetch_json(builder, "user", value).await?;
        Ok(users.into_iter().filter_map(|u| u.id).collect())
    }

    async fn has_credentials(&self, id: Uuid) -> DirectoryResult<bool> {
        let builder = self.request(Method::GET, &format!("users/{id}/credentials"));
        let credentials: Option<Vec<Value>> =
            self.fetch_json_opt(builder, "user", &id.to_string()).await?;
        Ok(credentials.is_some_and(|c| !c.is_empty()))
    }

    async fn reset_password(
        &self,
        id: Uuid,
        password: &str,
        temporary: bool,
    ) -> DirectoryResult<()> {
        let payload = PasswordPayload {
            credential_type: "password",
            value: password,
            temporary,
        };
        let builder = self
            .request(Method::PUT, &format!("users/{id}/reset-password"))
            .json(&payload);
        self.send_ok(builder, "user", &id.to_string()).await
    }

    async fn execute_actions_email(
        &self,
        id: Uuid,
        actions: &[RequiredAction],
        redirect: Option<&ClientRedirect>,
    ) -> DirectoryResult<()> {
        let actions: Vec<&str> = actions.iter().map(|a| a.as_str()).collect();
        let mut builder = self
            .request(Method::PUT, &format!("users/{id}/execute-actions-email"))
            .json(&actions);
        if let Some(redirect) = redirect {
            builder = builder.query(&[
                ("client_id", redirect.client_id.as_str()),
                ("redirect_uri", redirect.redirect_uri.as_str()),
            ]);
        }
        self.send_ok(builder, "user", &id.to_string()).await
    }

    async fn impersonate(&self, id: Uuid) -> DirectoryResult<()> {
        let builder = self.request(Method::POST, &format!("users/{id}/impersonation"));
        self.send_ok(builder, "user", &id.to_string()).await
    }

    async fn logout(&self, id: Uuid) -> DirectoryResult<()> {
        let builder = self.request(Method::POST, &format!("users/{id}/logout"));
        self.send_ok(builder, "user", &id.to_string()).await
    }

    async fn is_brute_force_locked(&self, id: Uuid) -> DirectoryResult<bool> {
        let builder = self.request(
            Method::GET,
            &format!("attack-detection/brute-force/users/{id}"),
        );
        let status: Value = self.fetch_json(builder, "user", &id.to_string()).await?;
        Ok(status
            .get("disabled")
            .and_then(Value::as_bool)
            .unwrap_or(false))
    }
}
