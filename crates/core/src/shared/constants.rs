/// Extension (and therefore format) of every extracted frame.
pub const OUTPUT_EXTENSION: &str = "png";

/// Default number of frames the CLI extracts.
pub const DEFAULT_FRAMES_TO_EXTRACT: usize = 10;

/// Emit a progress line every N decoded frames.
pub const PROGRESS_THROTTLE_FRAMES: usize = 25;
