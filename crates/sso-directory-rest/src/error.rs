//! Response-to-error mapping for the admin API.

use reqwest::{Response, StatusCode};
use sso_directory::DirectoryError;

/// Maps a transport failure to a directory error.
pub(crate) fn from_reqwest(err: reqwest::Error) -> DirectoryError {
    DirectoryError::Connection(err.to_string())
}

/// Maps a non-success response to the modeled status set.
///
/// 404 is absence, 409 a uniqueness conflict, 400 a rejected payload;
/// anything else is unexpected and fatal.
pub(crate) async fn fail(response: Response, entity: &'static str, key: &str) -> DirectoryError {
    let status = response.status();
    match status {
        StatusCode::NOT_FOUND => DirectoryError::not_found(entity, key),
        StatusCode::CONFLICT => DirectoryError::conflict(entity, key),
        StatusCode::BAD_REQUEST => {
            let body = response.text().await.unwrap_or_default();
            DirectoryError::InvalidData(body)
        }
        _ => {
            tracing::warn!(status = status.as_u16(), entity, key, "unexpected directory response");
            DirectoryError::unexpected(status.as_u16())
        }
    }
}
