pub mod image_writer;
pub mod output_folder;
pub mod video_reader;
