//! Error types for mapper-blocks

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Unknown statement kind: {name} (expected select, insert, update or delete)")]
    UnknownKind { name: String },
}
