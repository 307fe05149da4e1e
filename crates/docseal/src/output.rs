//! All-or-nothing output files.

use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::{Result, StampError};

/// Write `bytes` to `path` through a temporary file in the same directory.
///
/// The destination only ever holds the complete new content. On failure the
/// temporary file is removed and the destination is left as it was.
pub fn persist_atomically(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut file = NamedTempFile::new_in(dir)?;
    file.write_all(bytes)?;
    file.as_file().sync_all()?;
    file.persist(path).map_err(|e| StampError::Io(e.error))?;

    debug!(path = %path.display(), len = bytes.len(), "output written");
    Ok(())
}
