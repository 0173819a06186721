//! Well-known names inside a conversion output tree.

use std::path::Path;

/// Standard entries written next to converted mapper documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapperPath {
    /// The `__diffs__` directory holding one diff artifact per changed block
    DiffsDir,
    /// The `conversion_errors.log` file listing document-level failures
    ErrorLog,
}

impl MapperPath {
    /// Get the string representation of the path.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DiffsDir => "__diffs__",
            Self::ErrorLog => "conversion_errors.log",
        }
    }
}

impl AsRef<Path> for MapperPath {
    fn as_ref(&self) -> &Path {
        Path::new(self.as_str())
    }
}

impl AsRef<str> for MapperPath {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl std::fmt::Display for MapperPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
