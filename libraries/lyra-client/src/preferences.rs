//! Favorite and dislike records on the catalog service.

use crate::error::{ClientError, Result};
use lyra_core::{PreferenceKind, TrackId};
use reqwest::{Client, Method};
use tracing::debug;

/// Preferences client for the catalog service.
///
/// Every call carries the bearer credential.
pub struct PreferencesClient<'a> {
    http: &'a Client,
    base_url: &'a str,
    access_token: &'a str,
}

impl<'a> PreferencesClient<'a> {
    pub(crate) fn new(http: &'a Client, base_url: &'a str, access_token: &'a str) -> Self {
        Self {
            http,
            base_url,
            access_token,
        }
    }

    /// Create the record of `kind` for a track.
    pub async fn add(&self, kind: PreferenceKind, track_id: TrackId) -> Result<()> {
        self.send(Method::POST, kind, track_id).await
    }

    /// Delete the record of `kind` for a track.
    pub async fn remove(&self, kind: PreferenceKind, track_id: TrackId) -> Result<()> {
        self.send(Method::DELETE, kind, track_id).await
    }

    async fn send(&self, method: Method, kind: PreferenceKind, track_id: TrackId) -> Result<()> {
        let collection = match kind {
            PreferenceKind::Favorite => "favorites",
            PreferenceKind::Dislike => "dislikes",
        };
        let url = format!("{}/{}/{}", self.base_url, collection, track_id);
        debug!(url = %url, method = %method, track_id = %track_id, "Updating preference");

        let response = self
            .http
            .request(method, &url)
            .bearer_auth(self.access_token)
            .send()
            .await
            .map_err(ClientError::from_send)?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(ClientError::from_response(response, "Track", track_id.to_string()).await)
        }
    }
}
