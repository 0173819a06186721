//! Text I/O for mapper documents and conversion artifacts
//!
//! Documents are read as raw bytes and decoded strictly, so a file in a
//! legacy encoding is reported instead of being silently altered. Every
//! write goes through a locked temp file beside the target that is renamed
//! into place; a reader never sees half a converted mapper.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use fs2::FileExt;

use crate::{Error, NormalizedPath, Result};

/// Temp file that is removed again unless it was moved into place.
struct PendingFile {
    temp: PathBuf,
    file: File,
    persisted: bool,
}

impl PendingFile {
    fn create(target: &Path) -> Result<Self> {
        let name = target
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let temp = target.with_file_name(format!(".{name}.{}.tmp", std::process::id()));
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&temp)
            .map_err(|e| Error::io(&temp, e))?;
        Ok(Self {
            temp,
            file,
            persisted: false,
        })
    }

    fn fill(&mut self, target: &Path, content: &[u8]) -> Result<()> {
        self.file.lock_exclusive().map_err(|_| Error::LockFailed {
            path: target.to_path_buf(),
        })?;
        self.file
            .write_all(content)
            .and_then(|_| self.file.sync_all())
            .map_err(|e| Error::io(&self.temp, e))?;
        FileExt::unlock(&self.file).map_err(|_| Error::LockFailed {
            path: target.to_path_buf(),
        })
    }

    fn persist(mut self, target: &Path) -> Result<()> {
        fs::rename(&self.temp, target).map_err(|e| Error::io(target, e))?;
        self.persisted = true;
        Ok(())
    }
}

impl Drop for PendingFile {
    fn drop(&mut self) {
        if !self.persisted {
            let _ = fs::remove_file(&self.temp);
        }
    }
}

/// Replace `path` with `content`, creating missing parent directories.
///
/// Nested artifact paths such as `__diffs__/order/OrderMapper.xml.2.diff`
/// need no preparation by the caller.
pub fn write_atomic(path: &NormalizedPath, content: &[u8]) -> Result<()> {
    let target = path.to_native();
    if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }

    let mut pending = PendingFile::create(&target)?;
    pending.fill(&target, content)?;
    pending.persist(&target)?;

    tracing::trace!(path = %path, bytes = content.len(), "wrote file");
    Ok(())
}

/// Read a document as UTF-8 text, byte for byte.
///
/// Line endings and a byte-order mark are kept as they are. Content that is
/// not UTF-8 is an [`Error::InvalidUtf8`] naming the first bad offset.
pub fn read_text(path: &NormalizedPath) -> Result<String> {
    let native = path.to_native();
    let bytes = fs::read(&native).map_err(|e| Error::io(&native, e))?;
    String::from_utf8(bytes).map_err(|e| Error::InvalidUtf8 {
        path: native,
        offset: e.utf8_error().valid_up_to(),
    })
}

/// Write text atomically.
pub fn write_text(path: &NormalizedPath, content: &str) -> Result<()> {
    write_atomic(path, content.as_bytes())
}
