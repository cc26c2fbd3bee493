//! Core types for playback control

use lyra_core::{ErrorKind, Track};
use lyra_sync::PreferenceMode;
use serde::{Deserialize, Serialize};

/// Playback state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaybackState {
    /// No track bound
    #[default]
    Idle,

    /// Resource bound, waiting for metadata
    Loading,

    /// Currently playing
    Playing,

    /// Paused or ready to play
    Paused,

    /// Resource exhausted and nothing followed
    Ended,

    /// Resource failed to load or play; auto-advance is halted
    Error,
}

impl PlaybackState {
    pub fn is_playing(self) -> bool {
        self == Self::Playing
    }
}

/// Configuration for the playback controller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackConfig {
    /// Initial volume (0.0-1.0, default: 0.8)
    pub volume: f32,

    /// Restart the current track when it ends (default: false)
    pub repeat: bool,

    /// Pick the next track at random (default: false)
    pub shuffle: bool,

    /// Keep preferences in the session store when signed out (default: true)
    pub allow_anonymous_preferences: bool,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            volume: 0.8,
            repeat: false,
            shuffle: false,
            allow_anonymous_preferences: true,
        }
    }
}

/// Recoverable error recorded for display
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorInfo {
    pub kind: ErrorKind,
    pub message: String,
}

/// Point-in-time view of the controller for display components
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackSnapshot {
    /// Current track with its preference overlaid
    pub current: Option<Track>,
    pub state: PlaybackState,
    /// Whether playback was requested; may differ from `state` while a
    /// request is pending or after a rejection
    pub wants_playing: bool,
    pub position_secs: f64,
    pub duration_secs: Option<f64>,
    pub volume: f32,
    pub repeat: bool,
    pub shuffle: bool,
    pub genre: Option<String>,
    pub artist: Option<String>,
    pub search: Option<String>,
    pub preference_mode: PreferenceMode,
    pub last_error: Option<ErrorInfo>,
}
