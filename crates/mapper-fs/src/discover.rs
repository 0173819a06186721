//! Discovery of mapper documents under an input root.

use crate::{Error, NormalizedPath, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Extension of mapper documents.
const MAPPER_EXTENSION: &str = "xml";

/// Recursively collect every `*.xml` file under `root`, sorted by path.
///
/// Hidden directories (leading `.`) are not entered, and neither is any
/// directory listed in `exclude` (typically the output directory when it is
/// nested inside the input tree).
pub fn find_mapper_files(
    root: &NormalizedPath,
    exclude: &[NormalizedPath],
) -> Result<Vec<NormalizedPath>> {
    let excluded: Vec<PathBuf> = exclude
        .iter()
        .filter_map(|p| dunce::canonicalize(p.to_native()).ok())
        .collect();

    let mut found = Vec::new();
    walk(&root.to_native(), &excluded, &mut found)?;
    found.sort();

    tracing::debug!(root = %root, count = found.len(), "discovered mapper documents");
    Ok(found)
}

fn walk(dir: &Path, excluded: &[PathBuf], found: &mut Vec<NormalizedPath>) -> Result<()> {
    let entries = fs::read_dir(dir).map_err(|e| Error::io(dir, e))?;

    for entry in entries {
        let entry = entry.map_err(|e| Error::io(dir, e))?;
        let path = entry.path();
        let file_type = entry.file_type().map_err(|e| Error::io(&path, e))?;

        if file_type.is_dir() {
            let hidden = entry.file_name().to_string_lossy().starts_with('.');
            if hidden || is_excluded(&path, excluded) {
                tracing::trace!(path = %path.display(), "skipping directory");
                continue;
            }
            walk(&path, excluded, found)?;
        } else if file_type.is_file() {
            let normalized = NormalizedPath::new(&path);
            if normalized.has_extension(MAPPER_EXTENSION) {
                found.push(normalized);
            }
        }
    }

    Ok(())
}

fn is_excluded(path: &Path, excluded: &[PathBuf]) -> bool {
    if excluded.is_empty() {
        return false;
    }
    dunce::canonicalize(path)
        .map(|canonical| excluded.iter().any(|e| *e == canonical))
        .unwrap_or(false)
}
