//! Error types for mapper-core

/// Result type for mapper-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in mapper-core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Configuration values that cannot be used for a run
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    // Transparent wrappers for underlying crate errors
    /// Filesystem error from mapper-fs
    #[error(transparent)]
    Fs(#[from] mapper_fs::Error),

    /// Block kind error from mapper-blocks
    #[error(transparent)]
    Blocks(#[from] mapper_blocks::Error),

    /// Change record error from mapper-content
    #[error(transparent)]
    Content(#[from] mapper_content::Error),

    /// Transform setup error from mapper-transform
    #[error(transparent)]
    Transform(#[from] mapper_transform::Error),
}

impl Error {
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }
}
