//! Statement transforms for mapper-migrate
//!
//! A [`Transformer`] turns one statement from a source dialect into a target
//! dialect. [`TransformAdapter`] wraps any transformer so that a failed call
//! never escapes: the result is either converted text or the original body
//! with the failure reason attached.

pub mod adapter;
pub mod chat;
pub mod dialect;
pub mod error;
pub mod transformer;

pub use adapter::{FAILURE_MARKER, TransformAdapter, TransformResult, clean_response};
pub use chat::{ChatCompletionsTransformer, ChatSettings};
pub use dialect::Dialect;
pub use error::{Error, Result};
pub use transformer::Transformer;
