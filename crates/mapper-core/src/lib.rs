//! Core conversion layer for mapper-migrate
//!
//! Ties the lower crates together:
//!
//! ```text
//!                   mapper-cli
//!                        |
//!                   mapper-core
//!                        |
//!     +-------------+----+-----------+----------------+
//!     |             |                |                |
//! mapper-fs  mapper-blocks  mapper-content  mapper-transform
//! ```
//!
//! - [`DocumentConverter`] rewrites the statements of one document
//! - [`ConversionEngine`] runs a converter over a directory tree and writes
//!   converted documents, per-block diffs and the error log
//! - [`ConversionConfig`] carries the settings for a run
//!
//! # Example
//!
//! ```
//! use mapper_core::DocumentConverter;
//! use mapper_transform::{Dialect, Result, TransformAdapter};
//!
//! let upper = |sql: &str, _: &Dialect, _: &Dialect| -> Result<String> { Ok(sql.to_uppercase()) };
//! let adapter = TransformAdapter::new(&upper, "oracle".parse()?, "postgresql".parse()?);
//! let converter = DocumentConverter::new(adapter);
//!
//! let outcome = converter.convert("<select id=\"a\">select 1</select>");
//! assert!(outcome.changed);
//! assert_eq!(outcome.text, "<select id=\"a\">SELECT 1</select>");
//! # Ok::<(), mapper_transform::Error>(())
//! ```

pub mod config;
pub mod convert;
pub mod engine;
pub mod error;

pub use config::{ConversionConfig, TransformSection};
pub use convert::{ConversionOutcome, DocumentConverter};
pub use engine::{
    ConversionEngine, ConversionOptions, ConversionReport, DocumentFailure, DocumentReport,
};
pub use error::{Error, Result};
