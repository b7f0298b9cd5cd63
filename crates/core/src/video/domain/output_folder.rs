use std::path::{Path, PathBuf};

use crate::shared::constants::OUTPUT_EXTENSION;
use crate::shared::error::ExtractError;

/// Destination folder that is owned by a single extraction run.
pub trait OutputFolder {
    /// Removes everything under `path` and leaves an empty folder behind.
    fn reset(&self, path: &Path) -> Result<(), ExtractError>;
}

/// Path of the `counter`-th saved frame (1-based).
pub fn frame_path(folder: &Path, counter: usize) -> PathBuf {
    folder.join(format!("{counter}.{OUTPUT_EXTENSION}"))
}
