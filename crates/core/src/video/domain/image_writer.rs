use std::path::Path;

use crate::shared::error::ExtractError;
use crate::shared::frame::Frame;

/// Writes a single frame to an image file.
pub trait ImageWriter {
    fn write(&self, path: &Path, frame: &Frame) -> Result<(), ExtractError>;
}
