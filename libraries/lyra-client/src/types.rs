//! Types for catalog service requests and responses.

use crate::error::ClientError;
use lyra_core::{PreferenceState, Track, TrackId, TrackStats};
use serde::{Deserialize, Serialize};

/// Configuration for connecting to the catalog service.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the service (e.g., "https://music.example.com/api")
    pub url: String,
    /// Bearer credential (if a session exists)
    pub access_token: Option<String>,
}

impl ClientConfig {
    /// Create a new config with just the URL.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            access_token: None,
        }
    }

    /// Create a config with an existing credential.
    pub fn with_token(url: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            access_token: Some(access_token.into()),
        }
    }
}

// =============================================================================
// Track Types
// =============================================================================

/// Track record as sent by the service.
///
/// List items and detail records share this shape; the counters and
/// preference flags are only present on detail records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackDto {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub artist: String,
    #[serde(default)]
    pub genre: Option<String>,
    /// Duration in seconds
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub cover_path: Option<String>,
    pub audio_path: String,
    #[serde(default)]
    pub favorites_count: Option<u64>,
    #[serde(default)]
    pub dislikes_count: Option<u64>,
    #[serde(default)]
    pub reviews_count: Option<u64>,
    /// `null` for anonymous callers
    #[serde(default)]
    pub is_favorited: Option<bool>,
    /// `null` for anonymous callers
    #[serde(default)]
    pub is_disliked: Option<bool>,
}

impl TryFrom<TrackDto> for Track {
    type Error = ClientError;

    fn try_from(dto: TrackDto) -> Result<Self, Self::Error> {
        let preference = PreferenceState::from_flags(
            dto.is_favorited.unwrap_or(false),
            dto.is_disliked.unwrap_or(false),
        )
        .ok_or_else(|| {
            ClientError::ParseError(format!(
                "Track {} is reported as both favorited and disliked",
                dto.id
            ))
        })?;

        let stats = if dto.favorites_count.is_some()
            || dto.dislikes_count.is_some()
            || dto.reviews_count.is_some()
        {
            Some(TrackStats {
                favorites_count: dto.favorites_count.unwrap_or(0),
                dislikes_count: dto.dislikes_count.unwrap_or(0),
                reviews_count: dto.reviews_count.unwrap_or(0),
            })
        } else {
            None
        };

        Ok(Track {
            id: TrackId::new(dto.id),
            title: dto.title,
            artist: dto.artist,
            genre: dto.genre,
            cover_path: dto.cover_path,
            audio_path: dto.audio_path,
            duration_secs: dto.duration,
            preference,
            stats,
        })
    }
}

/// Paginated track listing.
///
/// Only `items` is required; the pagination fields are informational.
#[derive(Debug, Deserialize)]
pub struct TrackListResponse {
    pub items: Vec<TrackDto>,
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub size: Option<u32>,
    #[serde(default)]
    pub pages: Option<u32>,
}

// =============================================================================
// Playlist Types
// =============================================================================

/// Playlist as sent by the service.
#[derive(Debug, Clone, Deserialize)]
pub struct Playlist {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub tracks: Vec<TrackDto>,
}

/// Request body for playlist creation.
#[derive(Debug, Serialize)]
pub struct CreatePlaylistRequest {
    pub name: String,
}
