//! Crash-safe file replacement.

use crate::{IoError, IoResult};
use std::fs;
use std::io::Write;
use std::path::Path;

/// Replaces `path` with `bytes` by writing a sibling temp file and renaming
/// it over the target.
///
/// Readers see either the old file or the new one, never a partial write.
/// If anything fails the temp file is removed and the target is untouched.
/// Permissions of an existing target are carried over.
pub fn write_bytes_atomic(path: &Path, bytes: &[u8]) -> IoResult<()> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let mut tmp = tempfile::Builder::new()
        .prefix(".csf-")
        .suffix(".tmp")
        .tempfile_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;

    if let Ok(meta) = fs::metadata(path) {
        fs::set_permissions(tmp.path(), meta.permissions())?;
    }

    tmp.persist(path).map_err(|e| IoError::Io(e.error))?;
    tracing::trace!(path = %path.display(), size = bytes.len(), "replaced file");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replaces_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("image.png");
        fs::write(&path, b"old").unwrap();

        write_bytes_atomic(&path, b"new contents").unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"new contents");

        // No temp files left behind.
        let leftovers: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(leftovers.len(), 1);
    }

    #[test]
    fn test_missing_directory_fails_cleanly() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("image.png");
        assert!(write_bytes_atomic(&path, b"data").is_err());
        assert!(!path.exists());
    }
}
