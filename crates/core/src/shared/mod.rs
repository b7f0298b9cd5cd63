pub mod constants;
pub mod direction;
pub mod error;
pub mod frame;
pub mod video_metadata;
