//! Error types for mapper-content

/// Result type for mapper-content operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while persisting change records
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Fs(#[from] mapper_fs::Error),
}
