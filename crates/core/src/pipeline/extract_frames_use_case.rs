use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::pipeline::extraction_logger::ExtractionLogger;
use crate::sampling::domain::sampling_plan::SamplingPlan;
use crate::sampling::domain::traversal::Traversal;
use crate::shared::direction::Direction;
use crate::shared::error::ExtractError;
use crate::shared::video_metadata::VideoMetadata;
use crate::video::domain::image_writer::ImageWriter;
use crate::video::domain::output_folder::{frame_path, OutputFolder};
use crate::video::domain::video_reader::VideoReader;

/// Parameters of one extraction run.
#[derive(Clone, Debug, PartialEq)]
pub struct ExtractionRequest {
    pub frames_to_extract: usize,
    pub direction: Direction,
    pub input_path: PathBuf,
    pub output_folder: PathBuf,
}

/// Outcome of a completed run.
#[derive(Clone, Debug, PartialEq)]
pub struct ExtractionSummary {
    pub plan: SamplingPlan,
    /// Saved files in the order they were written.
    pub saved: Vec<PathBuf>,
    /// Logical indices whose frame could not be read, in processing order.
    pub unreadable: Vec<usize>,
}

/// Evenly-spaced frame extraction: clear → open → plan → read → sample → [flip] → write.
///
/// Frames are always decoded front to back. For [`Direction::Reverse`] the
/// logical indices count down from one below the frame count and every saved
/// frame is mirrored. Output files are numbered `1..=K` in save order.
pub struct ExtractFramesUseCase {
    reader: Box<dyn VideoReader>,
    image_writer: Box<dyn ImageWriter>,
    output_folder: Box<dyn OutputFolder>,
    logger: Box<dyn ExtractionLogger>,
}

impl ExtractFramesUseCase {
    pub fn new(
        reader: Box<dyn VideoReader>,
        image_writer: Box<dyn ImageWriter>,
        output_folder: Box<dyn OutputFolder>,
        logger: Box<dyn ExtractionLogger>,
    ) -> Self {
        Self {
            reader,
            image_writer,
            output_folder,
            logger,
        }
    }

    /// Runs one extraction.
    ///
    /// The output folder is cleared before the input is opened, so a failed
    /// open leaves it empty.
    pub fn execute(
        &mut self,
        request: &ExtractionRequest,
    ) -> Result<ExtractionSummary, ExtractError> {
        self.output_folder.reset(&request.output_folder)?;
        let metadata = self.reader.open(&request.input_path)?;

        let result = self.extract(&metadata, request);
        self.reader.close();
        let summary = result?;

        self.logger.info(&format!(
            "Extracted {} frames (interval {}) to {}",
            summary.saved.len(),
            summary.plan.interval(),
            request.output_folder.display()
        ));
        self.logger.summary();
        Ok(summary)
    }

    fn extract(
        &mut self,
        metadata: &VideoMetadata,
        request: &ExtractionRequest,
    ) -> Result<ExtractionSummary, ExtractError> {
        let plan = SamplingPlan::new(metadata.total_frames, request.frames_to_extract)?;
        let traversal = Traversal::new(request.direction, plan.frame_count());
        let total = plan.frame_count();

        self.logger.info(&format!(
            "Sampling {} of {total} frames, every {} ({})",
            plan.frames_to_extract(),
            plan.interval(),
            request.direction
        ));

        let mut saved = Vec::with_capacity(plan.expected_outputs());
        let mut unreadable = Vec::new();
        let mut frames = self.reader.frames();

        for (decoded, i) in traversal.indices(total).enumerate() {
            let started = Instant::now();
            let next = frames.next();
            self.logger.timing("decode", elapsed_ms(started));
            self.logger.progress(decoded + 1, total);

            let mut frame = match next {
                Some(Ok(frame)) => frame,
                Some(Err(e)) if e.is_recoverable() => {
                    log::warn!("Cannot read frame {i} ({e})");
                    unreadable.push(i);
                    continue;
                }
                Some(Err(e)) => return Err(e),
                None => {
                    log::warn!("Cannot read frame {i} (end of stream)");
                    unreadable.push(i);
                    continue;
                }
            };

            if !plan.should_save(i) {
                continue;
            }

            if traversal.flip() {
                let started = Instant::now();
                frame.flip_horizontal();
                self.logger.timing("flip", elapsed_ms(started));
            }

            let path = frame_path(&request.output_folder, saved.len() + 1);
            let started = Instant::now();
            self.image_writer.write(&path, &frame)?;
            self.logger.timing("save", elapsed_ms(started));
            log::debug!("Saved frame {i} to {}", path.display());
            saved.push(path);
        }

        Ok(ExtractionSummary {
            plan,
            saved,
            unreadable,
        })
    }
}

/// Builds an [`ExtractionRequest`] from borrowed paths.
pub fn request(
    frames_to_extract: usize,
    direction: Direction,
    input_path: &Path,
    output_folder: &Path,
) -> ExtractionRequest {
    ExtractionRequest {
        frames_to_extract,
        direction,
        input_path: input_path.to_path_buf(),
        output_folder: output_folder.to_path_buf(),
    }
}

fn elapsed_ms(started: Instant) -> f64 {
    started.elapsed().as_secs_f64() * 1000.0
}
