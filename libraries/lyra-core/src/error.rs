/// Core error types for Lyra
use crate::types::TrackId;
use thiserror::Error;

/// Result type alias using `LyraError`
pub type Result<T> = std::result::Result<T, LyraError>;

/// Broad classification of a failure, used by display components to decide
/// how to surface it (retry banner, login prompt, playback error, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A fetch or toggle request failed in transit or on the server
    NetworkFailure,
    /// The action needs a session and none exists
    AuthRequired,
    /// The service answered with an unexpected shape
    MalformedResponse,
    /// The media resource failed to load or play
    TransportFailure,
    /// The persistent session store failed
    Storage,
    /// The requested entity does not exist
    NotFound,
    /// The caller passed something unusable
    InvalidInput,
}

impl ErrorKind {
    /// Whether retrying the same call may succeed.
    pub fn is_retryable(self) -> bool {
        matches!(self, Self::NetworkFailure | Self::Storage)
    }
}

/// Core error type for Lyra
#[derive(Error, Debug)]
pub enum LyraError {
    /// Fetch/toggle request failed
    #[error("Network error: {0}")]
    Network(String),

    /// Action requires an authenticated session
    #[error("Authentication required")]
    AuthRequired,

    /// Response body did not have the expected shape
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Media resource could not be loaded or played
    #[error("Transport error: {0}")]
    Transport(String),

    /// Session store errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// Track not found
    #[error("Track not found: {0}")]
    TrackNotFound(TrackId),

    /// Entity not found
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Serialization errors
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}

impl LyraError {
    /// Create a network error
    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(msg.into())
    }

    /// Create a malformed response error
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedResponse(msg.into())
    }

    /// Create a transport error
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Create a storage error
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// Create a not found error
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Network(_) => ErrorKind::NetworkFailure,
            Self::AuthRequired => ErrorKind::AuthRequired,
            Self::MalformedResponse(_) | Self::Serialization(_) => ErrorKind::MalformedResponse,
            Self::Transport(_) => ErrorKind::TransportFailure,
            Self::Storage(_) => ErrorKind::Storage,
            Self::TrackNotFound(_) | Self::NotFound { .. } => ErrorKind::NotFound,
            Self::InvalidInput(_) => ErrorKind::InvalidInput,
        }
    }
}
