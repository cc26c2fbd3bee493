//! Service trait implementations backed by the HTTP client.

use crate::client::LyraClient;
use async_trait::async_trait;
use lyra_core::{PreferenceKind, PreferenceService, Result, Track, TrackId, TrackQuery, TrackRepository};

impl LyraClient {
    async fn update_preference(&self, kind: PreferenceKind, id: TrackId, add: bool) -> Result<()> {
        let handle = self.preferences().await?;
        let client = handle.client();
        if add {
            client.add(kind, id).await?;
        } else {
            client.remove(kind, id).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl TrackRepository for LyraClient {
    async fn fetch_list(&self, query: &TrackQuery) -> Result<Vec<Track>> {
        let handle = self.tracks().await;
        Ok(handle.client().list(query).await?)
    }

    async fn fetch_detail(&self, id: TrackId) -> Result<Track> {
        let handle = self.tracks().await;
        Ok(handle.client().get(id).await?)
    }

    async fn set_credential(&self, token: Option<String>) {
        self.set_access_token(token).await;
    }
}

#[async_trait]
impl PreferenceService for LyraClient {
    async fn add_favorite(&self, id: TrackId) -> Result<()> {
        self.update_preference(PreferenceKind::Favorite, id, true).await
    }

    async fn remove_favorite(&self, id: TrackId) -> Result<()> {
        self.update_preference(PreferenceKind::Favorite, id, false).await
    }

    async fn add_dislike(&self, id: TrackId) -> Result<()> {
        self.update_preference(PreferenceKind::Dislike, id, true).await
    }

    async fn remove_dislike(&self, id: TrackId) -> Result<()> {
        self.update_preference(PreferenceKind::Dislike, id, false).await
    }
}
