use lyra_core::{ErrorKind, LyraError};
use thiserror::Error;

/// Errors that can occur while changing preferences
#[derive(Error, Debug)]
pub enum SyncError {
    /// Toggles need a session and anonymous preferences are disabled
    #[error("Preferences are unavailable without a session")]
    Disabled,

    /// The remote service or the session store rejected the change
    #[error(transparent)]
    Core(#[from] LyraError),
}

impl SyncError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Disabled => ErrorKind::AuthRequired,
            Self::Core(e) => e.kind(),
        }
    }
}

impl From<SyncError> for LyraError {
    fn from(err: SyncError) -> Self {
        match err {
            SyncError::Disabled => LyraError::AuthRequired,
            SyncError::Core(e) => e,
        }
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;
