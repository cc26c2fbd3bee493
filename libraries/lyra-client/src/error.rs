//! Error types for the Lyra catalog client.

use lyra_core::LyraError;
use thiserror::Error;

/// Errors that can occur when talking to the catalog service.
#[derive(Error, Debug)]
pub enum ClientError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Server returned an error response
    #[error("Server error ({status}): {message}")]
    ServerError { status: u16, message: String },

    /// Authentication required but no token available, or the token was refused
    #[error("Authentication required")]
    AuthRequired,

    /// Invalid server URL
    #[error("Invalid server URL: {0}")]
    InvalidUrl(String),

    /// Failed to parse server response
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// Server is offline or unreachable
    #[error("Server unreachable: {0}")]
    ServerUnreachable(String),

    /// Requested entity does not exist
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;

impl ClientError {
    /// Classify a send failure.
    pub(crate) fn from_send(err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() {
            Self::ServerUnreachable(err.to_string())
        } else {
            Self::Request(err)
        }
    }

    /// Build the error for a non-success status.
    pub(crate) async fn from_response(
        response: reqwest::Response,
        entity: &'static str,
        id: impl Into<String>,
    ) -> Self {
        let status = response.status().as_u16();
        match status {
            401 | 403 => {
                tracing::warn!(status, "Catalog service refused credentials");
                Self::AuthRequired
            }
            404 => Self::NotFound {
                entity,
                id: id.into(),
            },
            _ => Self::ServerError {
                status,
                message: response.text().await.unwrap_or_default(),
            },
        }
    }
}

impl From<ClientError> for LyraError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::AuthRequired => LyraError::AuthRequired,
            ClientError::ParseError(msg) => LyraError::MalformedResponse(msg),
            ClientError::NotFound { entity, id } => LyraError::not_found(entity, id),
            ClientError::InvalidUrl(msg) => LyraError::InvalidInput(msg),
            ClientError::Request(e) if e.is_decode() => LyraError::malformed(e.to_string()),
            other => LyraError::network(other.to_string()),
        }
    }
}
