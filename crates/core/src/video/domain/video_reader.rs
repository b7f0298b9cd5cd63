use std::path::Path;

use crate::shared::error::ExtractError;
use crate::shared::frame::Frame;
use crate::shared::video_metadata::VideoMetadata;

/// Sequentially reads frames from a video source.
///
/// Implementations handle I/O details (codec, container format, etc.)
/// while the extraction loop works with the abstract `Frame` and
/// `VideoMetadata` types.
pub trait VideoReader {
    /// Opens a video file and returns its metadata.
    ///
    /// Fails with [`ExtractError::VideoOpen`] when the source cannot be decoded.
    fn open(&mut self, path: &Path) -> Result<VideoMetadata, ExtractError>;

    /// Returns an iterator over frames in decode order.
    ///
    /// An `Err` item is a single unreadable frame; iteration may continue.
    fn frames(&mut self) -> Box<dyn Iterator<Item = Result<Frame, ExtractError>> + '_>;

    /// Releases any resources held by the reader.
    fn close(&mut self);
}
