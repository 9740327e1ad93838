//! Remote directory connection configuration.

use serde::{Deserialize, Serialize};

/// Connection configuration for the remote directory's admin API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestConfig {
    /// Base URL of the directory server (no trailing slash).
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Realm all operations are scoped to.
    #[serde(default = "default_realm")]
    pub realm: String,
    /// Bearer token attached to every request.
    pub token: Option<String>,
    /// Connection timeout in milliseconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_ms: u64,
    /// Per-request timeout in milliseconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_ms: u64,
}

impl Default for RestConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            realm: default_realm(),
            token: None,
            connect_timeout_ms: default_connect_timeout(),
            request_timeout_ms: default_request_timeout(),
        }
    }
}

impl RestConfig {
    /// Creates a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the base URL, trimming any trailing slash.
    #[must_use]
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Sets the realm.
    #[must_use]
    pub fn realm(mut self, realm: impl Into<String>) -> Self {
        self.realm = realm.into();
        self
    }

    /// Sets the bearer token.
    #[must_use]
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Sets the connection timeout.
    #[must_use]
    pub const fn connect_timeout_ms(mut self, timeout: u64) -> Self {
        self.connect_timeout_ms = timeout;
        self
    }

    /// Sets the per-request timeout.
    #[must_use]
    pub const fn request_timeout_ms(mut self, timeout: u64) -> Self {
        self.request_timeout_ms = timeout;
        self
    }

    /// Builds an admin API URL under the configured realm.
    #[must_use]
    pub fn admin_url(&self, path: &str) -> String {
        format!(
            "{}/admin/realms/{}/{}",
            self.base_url,
            self.realm,
            path.trim_start_matches('/')
        )
    }
}

fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_realm() -> String {
    "master".to_string()
}

const fn default_connect_timeout() -> u64 {
    5000
}

const fn default_request_timeout() -> u64 {
    15000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = RestConfig::default();
        assert_eq!(config.base_url, "http://localhost:8080");
        assert_eq!(config.realm, "master");
        assert!(config.token.is_none());
    }

    #[test]
    fn admin_url_joins_realm_and_path() {
        let config = RestConfig::new()
            .base_url("https://sso.example.com/")
            .realm("fleet");

        assert_eq!(
            config.admin_url("users"),
            "https://sso.example.com/admin/realms/fleet/users"
        );
        assert_eq!(
            config.admin_url("/groups/abc/children"),
            "https://sso.example.com/admin/realms/fleet/groups/abc/children"
        );
    }
}
