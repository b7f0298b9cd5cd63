use std::fs;
use std::io;
use std::path::Path;

use crate::shared::error::ExtractError;
use crate::video::domain::output_folder::OutputFolder;

/// Clears an output folder on the local filesystem.
pub struct FsOutputFolder;

impl FsOutputFolder {
    pub fn new() -> Self {
        Self
    }
}

impl Default for FsOutputFolder {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputFolder for FsOutputFolder {
    fn reset(&self, path: &Path) -> Result<(), ExtractError> {
        let folder_error = |source: io::Error| ExtractError::OutputFolder {
            path: path.to_path_buf(),
            source,
        };

        if path.is_file() {
            return Err(folder_error(io::Error::new(
                io::ErrorKind::AlreadyExists,
                "path exists and is not a directory",
            )));
        }
        if path.exists() {
            fs::remove_dir_all(path).map_err(folder_error)?;
        }
        fs::create_dir_all(path).map_err(folder_error)?;
        log::debug!("Cleared output folder {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_creates_missing_folder() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("frames");
        FsOutputFolder::new().reset(&out).unwrap();
        assert!(out.is_dir());
    }

    #[test]
    fn test_reset_removes_previous_contents() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("frames");
        fs::create_dir_all(out.join("sub")).unwrap();
        fs::write(out.join("1.png"), b"stale").unwrap();
        fs::write(out.join("sub").join("keep.txt"), b"stale").unwrap();

        FsOutputFolder::new().reset(&out).unwrap();

        assert!(out.is_dir());
        assert_eq!(fs::read_dir(&out).unwrap().count(), 0);
    }

    #[test]
    fn test_reset_refuses_regular_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("frames");
        fs::write(&file, b"not a folder").unwrap();

        let err = FsOutputFolder::new().reset(&file).unwrap_err();
        assert!(matches!(err, ExtractError::OutputFolder { .. }));
        assert!(file.is_file());
    }
}
