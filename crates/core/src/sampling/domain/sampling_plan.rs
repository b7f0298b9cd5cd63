use crate::shared::error::ExtractError;

/// Derived sampling values for one extraction run.
///
/// Keeps every `interval`-th logical index so the number of outputs tracks
/// `frames_to_extract` rather than the length of the video.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SamplingPlan {
    frame_count: usize,
    frames_to_extract: usize,
    interval: usize,
}

impl SamplingPlan {
    /// Builds the plan, rejecting configurations whose interval would be zero.
    pub fn new(frame_count: usize, frames_to_extract: usize) -> Result<Self, ExtractError> {
        if frames_to_extract == 0 {
            return Err(ExtractError::Configuration(
                "frames to extract must be at least 1".to_string(),
            ));
        }
        if frame_count == 0 {
            return Err(ExtractError::Configuration(
                "video reports no frames".to_string(),
            ));
        }
        let interval = frame_count / frames_to_extract;
        if interval == 0 {
            return Err(ExtractError::Configuration(format!(
                "cannot extract {frames_to_extract} frames from a video with only {frame_count}"
            )));
        }
        Ok(Self {
            frame_count,
            frames_to_extract,
            interval,
        })
    }

    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    pub fn frames_to_extract(&self) -> usize {
        self.frames_to_extract
    }

    pub fn interval(&self) -> usize {
        self.interval
    }

    /// Whether the frame at logical index `i` is kept.
    pub fn should_save(&self, i: usize) -> bool {
        i != 0 && i % self.interval == 0
    }

    /// Number of files a forward run produces when every frame decodes.
    ///
    /// A reverse run never reaches index `frame_count` and saves one fewer
    /// whenever `interval` divides it.
    pub fn expected_outputs(&self) -> usize {
        self.frame_count / self.interval
    }
}
