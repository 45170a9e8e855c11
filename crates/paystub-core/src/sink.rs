//! Filesystem-backed statement store.

use std::path::{Path, PathBuf};

use crate::error::AppError;
use crate::traits::StatementStore;

/// Writes statements into one destination directory.
///
/// The directory is append-only with respect to a run: a file that exists
/// is proof of a prior successful download and is never rewritten.
#[derive(Debug, Clone)]
pub struct DirStore {
    dir: PathBuf,
}

impl DirStore {
    /// Fails unless `dir` is an existing directory, so a typo'd path
    /// surfaces before any network traffic.
    pub fn new(dir: impl AsRef<Path>) -> Result<Self, AppError> {
        let dir = dir.as_ref().to_path_buf();
        if !dir.is_dir() {
            return Err(AppError::FilesystemError(format!(
                "{} is not a directory",
                dir.display()
            )));
        }
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl StatementStore for DirStore {
    fn contains(&self, file_name: &str) -> bool {
        self.dir.join(file_name).exists()
    }

    fn write(&self, file_name: &str, bytes: &[u8]) -> Result<PathBuf, AppError> {
        let path = self.dir.join(file_name);
        std::fs::write(&path, bytes)
            .map_err(|e| AppError::FilesystemError(format!("{}: {e}", path.display())))?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_missing_directory() {
        let err = DirStore::new("/definitely/not/a/real/dir").unwrap_err();
        assert!(matches!(err, AppError::FilesystemError(_)));
    }

    #[test]
    fn writes_and_detects_files() {
        let tmp = tempfile::tempdir().unwrap();
        let store = DirStore::new(tmp.path()).unwrap();

        assert!(!store.contains("2020-01-05.pdf"));
        let path = store.write("2020-01-05.pdf", b"%PDF-1.4").unwrap();
        assert_eq!(path, tmp.path().join("2020-01-05.pdf"));
        assert!(store.contains("2020-01-05.pdf"));
        assert_eq!(std::fs::read(&path).unwrap(), b"%PDF-1.4");
    }

    #[test]
    fn write_into_unwritable_path_is_filesystem_error() {
        let tmp = tempfile::tempdir().unwrap();
        let store = DirStore::new(tmp.path()).unwrap();
        // a path component that is a file, not a directory
        std::fs::write(tmp.path().join("blocker"), b"").unwrap();
        let err = store.write("blocker/x.pdf", b"data").unwrap_err();
        assert!(matches!(err, AppError::FilesystemError(_)));
    }
}
