//! Filesystem helpers for mapper-migrate
//!
//! Provides normalized path handling, atomic text I/O, format-agnostic
//! configuration loading and discovery of mapper documents.

pub mod config;
pub mod constants;
pub mod discover;
pub mod error;
pub mod io;
pub mod path;

pub use config::{ConfigStore, Format};
pub use constants::MapperPath;
pub use discover::find_mapper_files;
pub use error::{Error, Result};
pub use path::NormalizedPath;
