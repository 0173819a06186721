//! Command implementations for the mapper CLI

pub mod convert;
pub mod init;
pub mod scan;

pub use convert::run_convert;
pub use init::{InitOptions, run_init};
pub use scan::run_scan;

use std::path::Path;

/// Resolve a path given on the command line against the working directory.
pub(crate) fn resolve(cwd: &Path, path: &Path) -> std::path::PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    }
}
