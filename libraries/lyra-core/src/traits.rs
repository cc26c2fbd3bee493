/// Service traits for Lyra
///
/// These are the seams between the playback core and its collaborators. The
/// HTTP client in `lyra-client` implements the remote ones, `lyra-storage`
/// implements the session store, and tests substitute in-memory fakes.
use crate::error::Result;
use crate::types::{Track, TrackId, TrackQuery};
use async_trait::async_trait;

/// Gateway for track data from the remote catalog
#[async_trait]
pub trait TrackRepository: Send + Sync {
    /// Fetch the track listing matching `query`
    ///
    /// A response that does not match the expected shape is an error, never
    /// an empty list.
    async fn fetch_list(&self, query: &TrackQuery) -> Result<Vec<Track>>;

    /// Fetch the current detail record of one track
    async fn fetch_detail(&self, id: TrackId) -> Result<Track>;

    /// Attach or clear the bearer credential used for subsequent calls
    async fn set_credential(&self, token: Option<String>);
}

/// Server-owned favorite/dislike records (authenticated mode)
#[async_trait]
pub trait PreferenceService: Send + Sync {
    async fn add_favorite(&self, id: TrackId) -> Result<()>;

    async fn remove_favorite(&self, id: TrackId) -> Result<()>;

    async fn add_dislike(&self, id: TrackId) -> Result<()>;

    async fn remove_dislike(&self, id: TrackId) -> Result<()>;
}

/// Key/value store that survives process restarts
///
/// Values are JSON so callers can persist ids, lists, or small records
/// without a schema per key.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Get a value; `Ok(None)` when the key was never set
    async fn get(&self, key: &str) -> Result<Option<serde_json::Value>>;

    /// Insert or replace a value
    async fn set(&self, key: &str, value: &serde_json::Value) -> Result<()>;

    /// Remove a value; returns whether it existed
    async fn remove(&self, key: &str) -> Result<bool>;
}
