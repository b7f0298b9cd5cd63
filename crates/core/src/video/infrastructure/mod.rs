pub mod ffmpeg_reader;
pub mod fs_output_folder;
pub mod image_file_writer;
