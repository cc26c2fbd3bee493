//! Lyra Catalog Client
//!
//! HTTP client library for the Lyra catalog service.
//!
//! # Features
//!
//! - **Tracks**: Filtered listings and single-track detail records
//! - **Preferences**: Favorite/dislike records for the signed-in user
//! - **Playlists**: List, create, and edit playlists
//!
//! `LyraClient` also implements the `TrackRepository` and
//! `PreferenceService` traits from `lyra-core`, so it can be handed directly
//! to the playback controller.
//!
//! # Example
//!
//! ```ignore
//! use lyra_client::{ClientConfig, LyraClient};
//! use lyra_core::{TrackId, TrackRepository};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = LyraClient::new(ClientConfig::with_token(
//!         "https://music.example.com/api",
//!         "token",
//!     ))?;
//!
//!     let track = client.fetch_detail(TrackId::new(5)).await?;
//!     println!("{} by {}", track.title, track.artist);
//!
//!     Ok(())
//! }
//! ```

mod client;
mod error;
mod playlists;
mod preferences;
mod repository;
mod tracks;
mod types;

// Re-export main types
pub use client::{LyraClient, PlaylistsClientHandle, PreferencesClientHandle, TracksClientHandle};
pub use error::{ClientError, Result};
pub use types::{ClientConfig, CreatePlaylistRequest, Playlist, TrackDto, TrackListResponse};

// Re-export sub-clients for direct use if needed
pub use playlists::PlaylistsClient;
pub use preferences::PreferencesClient;
pub use tracks::TracksClient;
