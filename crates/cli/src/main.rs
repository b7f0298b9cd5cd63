use std::path::PathBuf;
use std::process;

use clap::Parser;

use frame_extract_core::pipeline::extract_frames_use_case::{
    request, ExtractFramesUseCase, ExtractionRequest,
};
use frame_extract_core::pipeline::extraction_logger::StdoutExtractionLogger;
use frame_extract_core::shared::constants::{DEFAULT_FRAMES_TO_EXTRACT, PROGRESS_THROTTLE_FRAMES};
use frame_extract_core::shared::direction::Direction;
use frame_extract_core::video::infrastructure::ffmpeg_reader::FfmpegReader;
use frame_extract_core::video::infrastructure::fs_output_folder::FsOutputFolder;
use frame_extract_core::video::infrastructure::image_file_writer::ImageFileWriter;

/// Extract evenly-spaced frames from a video into a folder of PNG files.
#[derive(Parser, Debug)]
#[command(name = "extract-frames")]
struct Cli {
    /// Input video file.
    input: PathBuf,

    /// Output folder (cleared before extraction).
    output: PathBuf,

    /// Number of frames to extract.
    #[arg(long, short = 'n', default_value_t = DEFAULT_FRAMES_TO_EXTRACT)]
    frames: usize,

    /// Travel direction: forward or reverse (reverse mirrors every frame).
    #[arg(long, short = 'd', default_value = "forward")]
    direction: String,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let request = validate(cli)?;

    let mut use_case = ExtractFramesUseCase::new(
        Box::new(FfmpegReader::new()),
        Box::new(ImageFileWriter::new()),
        Box::new(FsOutputFolder::new()),
        Box::new(StdoutExtractionLogger::new(PROGRESS_THROTTLE_FRAMES)),
    );
    let summary = use_case.execute(&request)?;

    if !summary.unreadable.is_empty() {
        log::warn!(
            "{} frames could not be read: {:?}",
            summary.unreadable.len(),
            summary.unreadable
        );
    }
    log::info!("Output written to {}", request.output_folder.display());
    Ok(())
}

fn validate(cli: Cli) -> Result<ExtractionRequest, Box<dyn std::error::Error>> {
    if !cli.input.exists() {
        return Err(format!("Input file not found: {}", cli.input.display()).into());
    }
    if cli.frames == 0 {
        return Err("Frames to extract must be a positive integer, got 0".into());
    }
    if cli.output.is_file() {
        return Err(format!(
            "Output folder is an existing file: {}",
            cli.output.display()
        )
        .into());
    }
    let direction: Direction = cli.direction.parse()?;

    Ok(request(cli.frames, direction, &cli.input, &cli.output))
}
