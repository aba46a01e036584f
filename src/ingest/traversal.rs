//! Discovery of ingestion candidates under the corpus root.

use super::error::IngestError;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Recursively list every regular file below `root`.
///
/// Directories and symlinks are not candidates. The first error reported by
/// the walk (unreadable directory, vanished entry, loop) aborts discovery.
pub fn discover_files(root: &Path) -> Result<Vec<PathBuf>, IngestError> {
    let mut files = Vec::new();

    for entry in WalkDir::new(root) {
        let entry = entry.map_err(|source| IngestError::Traversal {
            root: root.to_path_buf(),
            source,
        })?;

        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }

    log::debug!("discovered {} files under {}", files.len(), root.display());
    Ok(files)
}
