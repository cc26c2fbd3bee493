//! Error types for playback control

use lyra_core::{ErrorKind, LyraError, TrackId};
use lyra_sync::SyncError;
use thiserror::Error;

/// Playback errors
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// The media resource could not be bound or started
    #[error("Transport error: {0}")]
    Transport(String),

    /// Track is not in the catalog
    #[error("Unknown track: {0}")]
    UnknownTrack(TrackId),

    /// No track is currently selected
    #[error("No track selected")]
    NoTrackSelected,

    /// Repository or session store failure
    #[error(transparent)]
    Core(#[from] LyraError),

    /// Preference change failure
    #[error(transparent)]
    Sync(#[from] SyncError),
}

impl PlaybackError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Transport(_) => ErrorKind::TransportFailure,
            Self::UnknownTrack(_) => ErrorKind::NotFound,
            Self::NoTrackSelected => ErrorKind::InvalidInput,
            Self::Core(e) => e.kind(),
            Self::Sync(e) => e.kind(),
        }
    }
}

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlaybackError>;
