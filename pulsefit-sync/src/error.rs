/// Error types for the relationship synchronizer
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Viewer identity is not resolved")]
    UnresolvedViewer,

    #[error("A user cannot follow themselves")]
    SelfFollow,

    #[error("Cache error: {0}")]
    Cache(#[from] pulsefit_cache::CacheError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Remote store rejected the mutation (status {status:?}): {message}")]
    Remote {
        status: Option<u16>,
        message: String,
    },

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for synchronizer operations
pub type SyncResult<T> = Result<T, SyncError>;
