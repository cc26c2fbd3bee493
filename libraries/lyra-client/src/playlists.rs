//! Playlist operations.

use crate::error::{ClientError, Result};
use crate::types::{CreatePlaylistRequest, Playlist};
use lyra_core::TrackId;
use reqwest::Client;
use tracing::debug;

/// Playlists client for the catalog service.
pub struct PlaylistsClient<'a> {
    http: &'a Client,
    base_url: &'a str,
    access_token: &'a str,
}

impl<'a> PlaylistsClient<'a> {
    pub(crate) fn new(http: &'a Client, base_url: &'a str, access_token: &'a str) -> Self {
        Self {
            http,
            base_url,
            access_token,
        }
    }

    /// List the caller's playlists.
    pub async fn list(&self) -> Result<Vec<Playlist>> {
        let url = format!("{}/playlists", self.base_url);
        debug!(url = %url, "Fetching playlists");

        let response = self
            .http
            .get(&url)
            .bearer_auth(self.access_token)
            .send()
            .await
            .map_err(ClientError::from_send)?;

        if response.status().is_success() {
            let playlists: Vec<Playlist> = response.json().await.map_err(|e| {
                ClientError::ParseError(format!("Failed to parse playlists: {}", e))
            })?;

            debug!(count = playlists.len(), "Fetched playlists");
            Ok(playlists)
        } else {
            Err(ClientError::from_response(response, "Playlists", url).await)
        }
    }

    /// Get a single playlist with its tracks.
    pub async fn get(&self, playlist_id: i64) -> Result<Playlist> {
        let url = format!("{}/playlists/{}", self.base_url, playlist_id);
        debug!(url = %url, playlist_id, "Fetching playlist");

        let response = self
            .http
            .get(&url)
            .bearer_auth(self.access_token)
            .send()
            .await
            .map_err(ClientError::from_send)?;

        if response.status().is_success() {
            response.json().await.map_err(|e| {
                ClientError::ParseError(format!("Failed to parse playlist: {}", e))
            })
        } else {
            Err(ClientError::from_response(response, "Playlist", playlist_id.to_string()).await)
        }
    }

    /// Create an empty playlist.
    pub async fn create(&self, name: &str) -> Result<Playlist> {
        let url = format!("{}/playlists", self.base_url);
        debug!(url = %url, name, "Creating playlist");

        let response = self
            .http
            .post(&url)
            .bearer_auth(self.access_token)
            .json(&CreatePlaylistRequest {
                name: name.to_string(),
            })
            .send()
            .await
            .map_err(ClientError::from_send)?;

        if response.status().is_success() {
            response.json().await.map_err(|e| {
                ClientError::ParseError(format!("Failed to parse created playlist: {}", e))
            })
        } else {
            Err(ClientError::from_response(response, "Playlist", name).await)
        }
    }

    /// Append a track to a playlist.
    pub async fn add_track(&self, playlist_id: i64, track_id: TrackId) -> Result<()> {
        let url = format!("{}/playlists/{}/tracks/{}", self.base_url, playlist_id, track_id);
        debug!(url = %url, "Adding track to playlist");

        let response = self
            .http
            .post(&url)
            .bearer_auth(self.access_token)
            .send()
            .await
            .map_err(ClientError::from_send)?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(ClientError::from_response(response, "Playlist", playlist_id.to_string()).await)
        }
    }

    /// Remove a track from a playlist.
    pub async fn remove_track(&self, playlist_id: i64, track_id: TrackId) -> Result<()> {
        let url = format!("{}/playlists/{}/tracks/{}", self.base_url, playlist_id, track_id);
        debug!(url = %url, "Removing track from playlist");

        let response = self
            .http
            .delete(&url)
            .bearer_auth(self.access_token)
            .send()
            .await
            .map_err(ClientError::from_send)?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(ClientError::from_response(response, "Playlist", playlist_id.to_string()).await)
        }
    }
}
