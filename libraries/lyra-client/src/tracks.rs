//! Track listing and detail operations.

use crate::client::authorize;
use crate::error::{ClientError, Result};
use crate::types::{TrackDto, TrackListResponse};
use lyra_core::{Track, TrackId, TrackQuery};
use reqwest::Client;
use tracing::debug;

/// Tracks client for the catalog service.
pub struct TracksClient<'a> {
    http: &'a Client,
    base_url: &'a str,
    access_token: Option<&'a str>,
}

impl<'a> TracksClient<'a> {
    pub(crate) fn new(http: &'a Client, base_url: &'a str, access_token: Option<&'a str>) -> Self {
        Self {
            http,
            base_url,
            access_token,
        }
    }

    /// Fetch one page of the track listing.
    ///
    /// A body without an `items` array is a parse error, never an empty page.
    pub async fn list_page(&self, query: &TrackQuery) -> Result<TrackListResponse> {
        let url = format!("{}/tracks", self.base_url);

        let mut params: Vec<(&str, String)> = Vec::new();
        if let Some(genre) = &query.genre {
            params.push(("genre", genre.clone()));
        }
        if let Some(artist) = &query.artist {
            params.push(("artist", artist.clone()));
        }
        if let Some(search) = &query.search {
            params.push(("search", search.clone()));
        }
        if let Some(page) = query.page {
            params.push(("page", page.to_string()));
        }
        if let Some(size) = query.size {
            params.push(("size", size.to_string()));
        }

        debug!(url = %url, params = ?params, "Fetching track list");

        let response = authorize(self.http.get(&url).query(&params), self.access_token)
            .send()
            .await
            .map_err(ClientError::from_send)?;

        let status = response.status();

        if status.is_success() {
            let page: TrackListResponse = response.json().await.map_err(|e| {
                ClientError::ParseError(format!("Failed to parse track list: {}", e))
            })?;

            debug!(
                items = page.items.len(),
                total = ?page.total,
                "Fetched track list"
            );

            Ok(page)
        } else {
            Err(ClientError::from_response(response, "Track list", url).await)
        }
    }

    /// Fetch the track listing as domain tracks.
    pub async fn list(&self, query: &TrackQuery) -> Result<Vec<Track>> {
        self.list_page(query)
            .await?
            .items
            .into_iter()
            .map(Track::try_from)
            .collect()
    }

    /// Get a single track by ID.
    pub async fn get(&self, track_id: TrackId) -> Result<Track> {
        let url = format!("{}/tracks/{}", self.base_url, track_id);
        debug!(url = %url, track_id = %track_id, "Fetching track");

        let response = authorize(self.http.get(&url), self.access_token)
            .send()
            .await
            .map_err(ClientError::from_send)?;

        let status = response.status();

        if status.is_success() {
            let dto: TrackDto = response.json().await.map_err(|e| {
                ClientError::ParseError(format!("Failed to parse track response: {}", e))
            })?;

            if dto.id != track_id.as_i64() {
                return Err(ClientError::ParseError(format!(
                    "Requested track {} but received {}",
                    track_id, dto.id
                )));
            }

            Track::try_from(dto)
        } else {
            Err(ClientError::from_response(response, "Track", track_id.to_string()).await)
        }
    }
}
