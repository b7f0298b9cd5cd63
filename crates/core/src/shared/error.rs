use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("cannot open the video file {path}: {reason}")]
    VideoOpen { path: PathBuf, reason: String },
    #[error("cannot read frame {index}: {reason}")]
    FrameRead { index: usize, reason: String },
    #[error("invalid extraction settings: {0}")]
    Configuration(String),
    #[error("failed to prepare output folder {path}: {source}")]
    OutputFolder {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write frame to {path}: {reason}")]
    ImageWrite { path: PathBuf, reason: String },
}

impl ExtractError {
    /// Whether the extraction loop may log this error and move on.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, ExtractError::FrameRead { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_frame_read_is_recoverable() {
        let read = ExtractError::FrameRead {
            index: 3,
            reason: "corrupt packet".to_string(),
        };
        assert!(read.is_recoverable());
        assert!(!ExtractError::Configuration("bad".to_string()).is_recoverable());
        assert!(!ExtractError::VideoOpen {
            path: PathBuf::from("missing.mp4"),
            reason: "not found".to_string(),
        }
        .is_recoverable());
    }

    #[test]
    fn test_messages_name_the_offending_item() {
        let err = ExtractError::FrameRead {
            index: 42,
            reason: "eof".to_string(),
        };
        assert_eq!(err.to_string(), "cannot read frame 42: eof");

        let err = ExtractError::VideoOpen {
            path: PathBuf::from("/tmp/in.mp4"),
            reason: "No such file".to_string(),
        };
        assert!(err.to_string().contains("/tmp/in.mp4"));
    }

    #[test]
    fn test_output_folder_keeps_io_source() {
        use std::error::Error;

        let err = ExtractError::OutputFolder {
            path: PathBuf::from("out"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(err.source().is_some());
    }
}
