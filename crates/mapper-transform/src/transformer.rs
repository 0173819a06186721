//! The transform seam

use crate::{Dialect, Result};

/// Converts one statement from `source` to `target`.
///
/// Implementations may fail in any way; callers go through
/// [`TransformAdapter`](crate::TransformAdapter), which contains failures.
pub trait Transformer {
    fn transform(&self, sql: &str, source: &Dialect, target: &Dialect) -> Result<String>;
}

impl<F> Transformer for F
where
    F: Fn(&str, &Dialect, &Dialect) -> Result<String>,
{
    fn transform(&self, sql: &str, source: &Dialect, target: &Dialect) -> Result<String> {
        self(sql, source, target)
    }
}
