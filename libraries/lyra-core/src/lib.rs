//! Lyra Core
//!
//! Core types, service traits, and error handling shared by every Lyra crate.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Domain Types**: `Track`, `TrackId`, `PreferenceState`, `Session`
//! - **Service Traits**: `TrackRepository`, `PreferenceService`, `SessionStore`
//! - **Error Handling**: Unified `LyraError`, `ErrorKind` and `Result` types
//!
//! Implementations live in the other crates: `lyra-client` talks to the
//! catalog service, `lyra-storage` persists session values, and
//! `lyra-playback` composes both behind the playback controller.
//!
//! # Example
//!
//! ```rust
//! use lyra_core::types::{PreferenceKind, PreferenceState, Track, TrackId};
//!
//! let mut track = Track::new(TrackId::new(5), "Blue in Green", "/media/tracks/5.mp3");
//! assert!(!track.is_favorite());
//!
//! track.preference = track.preference.toggled(PreferenceKind::Favorite);
//! assert_eq!(track.preference, PreferenceState::Favorited);
//! ```

#![forbid(unsafe_code)]

pub mod error;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use error::{ErrorKind, LyraError, Result};
pub use traits::{PreferenceService, SessionStore, TrackRepository};
pub use types::{
    PreferenceKind, PreferenceState, Role, Session, Track, TrackId, TrackQuery, TrackStats,
};
