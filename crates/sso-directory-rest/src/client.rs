//! HTTP client for the remote directory admin API.

use std::time::Duration;

use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use sso_directory::{DirectoryError, DirectoryResult};
use url::Url;
use uuid::Uuid;

use crate::config::RestConfig;
use crate::error::{fail, from_reqwest};

/// Remote directory reached through its admin REST API.
///
/// One logical operation issues one or more sequential requests; there is
/// no internal retry, and a failed request surfaces immediately. Timeouts
/// are enforced at this transport boundary per [`RestConfig`].
pub struct RestDirectory {
    config: RestConfig,
    http: reqwest::Client,
}

impl RestDirectory {
    /// Creates a client from the given configuration.
    ///
    /// ## Errors
    ///
    /// Returns `DirectoryError::Connection` when the underlying HTTP client
    /// cannot be constructed.
    pub fn new(config: RestConfig) -> DirectoryResult<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_millis(config.connect_timeout_ms))
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()
            .map_err(from_reqwest)?;
        Ok(Self { config, http })
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &RestConfig {
        &self.config
    }

    /// Verifies the realm is reachable with the configured credentials.
    pub async fn test_connection(&self) -> DirectoryResult<()> {
        let url = format!(
            "{}/admin/realms/{}",
            self.config.base_url, self.config.realm
        );
        let response = self
            .authorized(self.http.request(Method::GET, url))
            .send()
            .await
            .map_err(from_reqwest)?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(fail(response, "realm", &self.config.realm).await)
        }
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.config.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Builds a request against a fixed admin path.
    pub(crate) fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.authorized(self.http.request(method, self.config.admin_url(path)))
    }

    /// Builds a request against an admin path extended with caller-supplied
    /// segments, percent-encoding each segment.
    pub(crate) fn request_segments(
        &self,
        method: Method,
        base_path: &str,
        segments: &[&str],
    ) -> DirectoryResult<RequestBuilder> {
        let mut url = Url::parse(&self.config.admin_url(base_path))
            .map_err(|e| DirectoryError::Connection(e.to_string()))?;
        {
            let mut parts = url
                .path_segments_mut()
                .map_err(|()| DirectoryError::Connection("base URL cannot be a base".to_string()))?;
            for segment in segments {
                parts.push(segment);
            }
        }
        Ok(self.authorized(self.http.request(method, url)))
    }

    /// Sends a request and decodes the JSON body.
    pub(crate) async fn fetch_json<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
        entity: &'static str,
        key: &str,
    ) -> DirectoryResult<T> {
        let response = builder.send().await.map_err(from_reqwest)?;
        if !response.status().is_success() {
            return Err(fail(response, entity, key).await);
        }
        response
            .json()
            .await
            .map_err(|e| DirectoryError::InvalidData(format!("malformed response body: {e}")))
    }

    /// Sends a request and decodes the JSON body, mapping 404 to `None`.
    pub(crate) async fn fetch_json_opt<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
        entity: &'static str,
        key: &str,
    ) -> DirectoryResult<Option<T>> {
        let response = builder.send().await.map_err(from_reqwest)?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(fail(response, entity, key).await);
        }
        response
            .json()
            .await
            .map(Some)
            .map_err(|e| DirectoryError::InvalidData(format!("malformed response body: {e}")))
    }

    /// Sends a request expecting any success status, discarding the body.
    pub(crate) async fn send_ok(
        &self,
        builder: RequestBuilder,
        entity: &'static str,
        key: &str,
    ) -> DirectoryResult<()> {
        let response = builder.send().await.map_err(from_reqwest)?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(fail(response, entity, key).await)
        }
    }

    /// Sends a creation request and extracts the assigned id from the
    /// `Location` header of the 201 response.
    pub(crate) async fn send_created(
        &self,
        builder: RequestBuilder,
        entity: &'static str,
        key: &str,
    ) -> DirectoryResult<Uuid> {
        let response = builder.send().await.map_err(from_reqwest)?;
        if response.status() != StatusCode::CREATED {
            return Err(fail(response, entity, key).await);
        }
        let location = response
            .headers()
            .get(reqwest::header::LOCATION)
            .and_then(|v| v.to_str().ok());
        created_id_from_location(location).ok_or_else(|| {
            DirectoryError::InvalidData("creation response carries no usable location".to_string())
        })
    }
}

/// Extracts the created entity id from a location reference.
///
/// The store answers a successful create with a location whose final path
/// segment is the assigned id.
#[must_use]
pub(crate) fn created_id_from_location(location: Option<&str>) -> Option<Uuid> {
    let location = location?;
    let tail = location.trim_end_matches('/').rsplit('/').next()?;
    Uuid::parse_str(tail).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn created_id_is_last_path_segment() {
        let id = Uuid::now_v7();
        let location = format!("https://sso.example.com/admin/realms/fleet/users/{id}");

        assert_eq!(created_id_from_location(Some(&location)), Some(id));
        assert_eq!(
            created_id_from_location(Some(&format!("{location}/"))),
            Some(id)
        );
    }

    #[test]
    fn unusable_locations_are_rejected() {
        assert_eq!(created_id_from_location(None), None);
        assert_eq!(
            created_id_from_location(Some("https://sso.example.com/users/not-a-uuid")),
            None
        );
    }
}
