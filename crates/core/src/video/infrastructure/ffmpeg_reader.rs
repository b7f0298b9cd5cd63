use std::path::Path;

use ffmpeg_next::format::context::Input;
use ffmpeg_next::software::scaling;

use crate::shared::error::ExtractError;
use crate::shared::frame::Frame;
use crate::shared::video_metadata::VideoMetadata;
use crate::video::domain::video_reader::VideoReader;

/// Container durations are reported in `AV_TIME_BASE` units.
const AV_TIME_BASE: f64 = 1_000_000.0;

/// Decodes video frames via ffmpeg-next (libavformat + libavcodec).
///
/// Converts each decoded frame to RGB24 and wraps it in a [`Frame`].
pub struct FfmpegReader {
    input_ctx: Option<Input>,
    decoder: Option<ffmpeg_next::decoder::Video>,
    scaler: Option<scaling::Context>,
    video_stream_index: usize,
}

impl FfmpegReader {
    pub fn new() -> Self {
        Self {
            input_ctx: None,
            decoder: None,
            scaler: None,
            video_stream_index: 0,
        }
    }
}

impl Default for FfmpegReader {
    fn default() -> Self {
        Self::new()
    }
}

impl VideoReader for FfmpegReader {
    fn open(&mut self, path: &Path) -> Result<VideoMetadata, ExtractError> {
        let open_error = |reason: String| ExtractError::VideoOpen {
            path: path.to_path_buf(),
            reason,
        };

        ffmpeg_next::init().map_err(|e| open_error(e.to_string()))?;
        let ictx = ffmpeg_next::format::input(path).map_err(|e| open_error(e.to_string()))?;

        let stream = ictx
            .streams()
            .best(ffmpeg_next::media::Type::Video)
            .ok_or_else(|| open_error("no video stream found".to_string()))?;

        let video_stream_index = stream.index();
        let codec_ctx = ffmpeg_next::codec::context::Context::from_parameters(stream.parameters())
            .map_err(|e| open_error(e.to_string()))?;
        let decoder = codec_ctx
            .decoder()
            .video()
            .map_err(|e| open_error(e.to_string()))?;

        let width = decoder.width();
        let height = decoder.height();
        let scaler = scaling::Context::get(
            decoder.format(),
            width,
            height,
            ffmpeg_next::format::Pixel::RGB24,
            width,
            height,
            scaling::Flags::BILINEAR,
        )
        .map_err(|e| open_error(e.to_string()))?;

        let fps = rational_to_f64(stream.rate());
        let time_base = rational_to_f64(stream.time_base());
        let stream_secs = (stream.duration() > 0).then(|| stream.duration() as f64 * time_base);
        let container_secs = (ictx.duration() > 0).then(|| ictx.duration() as f64 / AV_TIME_BASE);
        let total_frames = estimate_frame_count(stream.frames(), stream_secs, container_secs, fps);

        let metadata = VideoMetadata {
            width,
            height,
            fps,
            total_frames,
            codec: decoder
                .codec()
                .map(|c| c.name().to_string())
                .unwrap_or_default(),
            source_path: Some(path.to_path_buf()),
        };
        log::debug!(
            "Opened {}: {}x{} {} @ {:.2} fps, {} frames",
            path.display(),
            width,
            height,
            metadata.codec,
            fps,
            total_frames
        );

        self.video_stream_index = video_stream_index;
        self.input_ctx = Some(ictx);
        self.decoder = Some(decoder);
        self.scaler = Some(scaler);

        Ok(metadata)
    }

    fn frames(&mut self) -> Box<dyn Iterator<Item = Result<Frame, ExtractError>> + '_> {
        let (Some(ictx), Some(decoder), Some(scaler)) = (
            self.input_ctx.as_mut(),
            self.decoder.as_mut(),
            self.scaler.as_mut(),
        ) else {
            return Box::new(std::iter::once(Err(ExtractError::FrameRead {
                index: 0,
                reason: "FfmpegReader: not opened".to_string(),
            })));
        };

        let width = decoder.width();
        let height = decoder.height();

        Box::new(FfmpegFrameIter {
            ictx,
            decoder,
            scaler,
            width,
            height,
            video_stream_index: self.video_stream_index,
            frame_index: 0,
            flushing: false,
            done: false,
        })
    }

    fn close(&mut self) {
        self.scaler = None;
        self.decoder = None;
        self.input_ctx = None;
    }
}

/// Lazy iterator that decodes one frame per step.
struct FfmpegFrameIter<'a> {
    ictx: &'a mut Input,
    decoder: &'a mut ffmpeg_next::decoder::Video,
    scaler: &'a mut scaling::Context,
    width: u32,
    height: u32,
    video_stream_index: usize,
    frame_index: usize,
    flushing: bool,
    done: bool,
}

impl FfmpegFrameIter<'_> {
    fn try_receive(&mut self) -> Option<Result<Frame, ExtractError>> {
        let mut decoded = ffmpeg_next::util::frame::video::Video::empty();
        self.decoder.receive_frame(&mut decoded).ok()?;

        let mut rgb_frame = ffmpeg_next::util::frame::video::Video::empty();
        if let Err(e) = self.scaler.run(&decoded, &mut rgb_frame) {
            return Some(Err(failed_read(&mut self.frame_index, e.to_string())));
        }

        let index = self.frame_index;
        self.frame_index += 1;

        let pixels = extract_rgb_pixels(&rgb_frame, self.width, self.height);
        Some(Ok(Frame::new(pixels, self.width, self.height, 3, index)))
    }
}

impl Iterator for FfmpegFrameIter<'_> {
    type Item = Result<Frame, ExtractError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        if let Some(result) = self.try_receive() {
            return Some(result);
        }

        if self.flushing {
            self.done = true;
            return None;
        }

        loop {
            let Some((stream, packet)) = self.ictx.packets().next() else {
                let _ = self.decoder.send_eof();
                self.flushing = true;
                if let Some(result) = self.try_receive() {
                    return Some(result);
                }
                self.done = true;
                return None;
            };

            if stream.index() != self.video_stream_index {
                continue;
            }

            if let Err(e) = self.decoder.send_packet(&packet) {
                return Some(Err(failed_read(&mut self.frame_index, e.to_string())));
            }

            if let Some(result) = self.try_receive() {
                return Some(result);
            }
        }
    }
}

/// A failed read still consumes one frame position.
fn failed_read(frame_index: &mut usize, reason: String) -> ExtractError {
    let index = *frame_index;
    *frame_index += 1;
    ExtractError::FrameRead { index, reason }
}

fn rational_to_f64(r: ffmpeg_next::Rational) -> f64 {
    if r.denominator() != 0 {
        r.numerator() as f64 / r.denominator() as f64
    } else {
        0.0
    }
}

/// Frame count from the stream header, or estimated from duration and rate.
///
/// Some containers (e.g. Matroska, raw streams) leave `nb_frames` at 0.
fn estimate_frame_count(
    nb_frames: i64,
    stream_secs: Option<f64>,
    container_secs: Option<f64>,
    fps: f64,
) -> usize {
    if nb_frames > 0 {
        return nb_frames as usize;
    }
    if fps <= 0.0 {
        return 0;
    }
    stream_secs
        .or(container_secs)
        .map(|secs| (secs * fps).round().max(0.0) as usize)
        .unwrap_or(0)
}

/// Copies pixel data from an ffmpeg frame into a contiguous RGB buffer.
///
/// ffmpeg frames may have padding bytes at the end of each row (stride > width*3).
fn extract_rgb_pixels(
    rgb_frame: &ffmpeg_next::util::frame::video::Video,
    width: u32,
    height: u32,
) -> Vec<u8> {
    let stride = rgb_frame.stride(0);
    let data = rgb_frame.data(0);
    let w = width as usize;
    let h = height as usize;

    let mut pixels = Vec::with_capacity(w * h * 3);
    for row in 0..h {
        let row_start = row * stride;
        pixels.extend_from_slice(&data[row_start..row_start + w * 3]);
    }
    pixels
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::path::PathBuf;

    use ffmpeg_next::{encoder, format, Packet, Rational};

    /// Encodes `num_frames` flat grey MPEG-4 frames; frame `i` has value `i * 40 % 256`.
    pub(crate) fn create_test_video(path: &Path, num_frames: usize, width: u32, height: u32) {
        const FPS: i32 = 30;
        ffmpeg_next::init().unwrap();

        let mut octx = format::output(path).unwrap();
        let global_header = octx.format().flags().contains(format::Flags::GLOBAL_HEADER);

        let codec = encoder::find(ffmpeg_next::codec::Id::MPEG4).unwrap();
        let mut ost = octx.add_stream(Some(codec)).unwrap();
        let mut encoder_ctx = ffmpeg_next::codec::context::Context::new_with_codec(codec)
            .encoder()
            .video()
            .unwrap();
        encoder_ctx.set_width(width);
        encoder_ctx.set_height(height);
        encoder_ctx.set_format(format::Pixel::YUV420P);
        encoder_ctx.set_time_base(Rational(1, FPS));
        encoder_ctx.set_frame_rate(Some(Rational(FPS, 1)));
        if global_header {
            encoder_ctx.set_flags(ffmpeg_next::codec::Flags::GLOBAL_HEADER);
        }
        let mut encoder = encoder_ctx
            .open_with(ffmpeg_next::Dictionary::new())
            .unwrap();
        ost.set_parameters(&encoder);
        octx.write_header().unwrap();
        let ost_time_base = octx.stream(0).unwrap().time_base();

        let mut to_yuv = scaling::Context::get(
            format::Pixel::RGB24,
            width,
            height,
            format::Pixel::YUV420P,
            width,
            height,
            scaling::Flags::BILINEAR,
        )
        .unwrap();

        for i in 0..num_frames {
            let mut rgb = ffmpeg_next::util::frame::video::Video::new(
                format::Pixel::RGB24,
                width,
                height,
            );
            let value = ((i * 40) % 256) as u8;
            rgb.data_mut(0).fill(value);

            let mut yuv = ffmpeg_next::util::frame::video::Video::empty();
            to_yuv.run(&rgb, &mut yuv).unwrap();
            yuv.set_pts(Some(i as i64));
            encoder.send_frame(&yuv).unwrap();

            let mut encoded = Packet::empty();
            while encoder.receive_packet(&mut encoded).is_ok() {
                encoded.set_stream(0);
                encoded.rescale_ts(Rational(1, FPS), ost_time_base);
                encoded.write_interleaved(&mut octx).unwrap();
            }
        }

        encoder.send_eof().unwrap();
        let mut encoded = Packet::empty();
        while encoder.receive_packet(&mut encoded).is_ok() {
            encoded.set_stream(0);
            encoded.rescale_ts(Rational(1, FPS), ost_time_base);
            encoded.write_interleaved(&mut octx).unwrap();
        }
        octx.write_trailer().unwrap();
    }

    fn test_video_path(dir: &Path) -> PathBuf {
        dir.join("test.mp4")
    }

    #[test]
    fn test_open_returns_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let path = test_video_path(dir.path());
        create_test_video(&path, 5, 160, 120);

        let mut reader = FfmpegReader::new();
        let meta = reader.open(&path).unwrap();
        assert_eq!(meta.width, 160);
        assert_eq!(meta.height, 120);
        assert!(meta.fps > 0.0);
        assert_eq!(meta.total_frames, 5);
        assert_eq!(meta.source_path, Some(path));
    }

    #[test]
    fn test_open_nonexistent_is_video_open_error() {
        let mut reader = FfmpegReader::new();
        let err = reader.open(Path::new("/nonexistent/test.mp4")).unwrap_err();
        assert!(matches!(err, ExtractError::VideoOpen { .. }));
    }

    #[test]
    fn test_open_non_video_is_video_open_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.mp4");
        std::fs::write(&path, b"definitely not a video").unwrap();

        let mut reader = FfmpegReader::new();
        assert!(matches!(
            reader.open(&path),
            Err(ExtractError::VideoOpen { .. })
        ));
    }

    #[test]
    fn test_frames_yields_correct_count_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = test_video_path(dir.path());
        create_test_video(&path, 5, 160, 120);

        let mut reader = FfmpegReader::new();
        reader.open(&path).unwrap();

        let frames: Vec<Frame> = reader.frames().map(|f| f.unwrap()).collect();
        assert_eq!(frames.len(), 5);
        for (i, frame) in frames.iter().enumerate() {
            assert_eq!(frame.index(), i);
            assert_eq!(frame.channels(), 3);
            assert_eq!(frame.data().len(), 160 * 120 * 3);
        }
    }

    #[test]
    fn test_frames_without_open_returns_error() {
        let mut reader = FfmpegReader::new();
        let result = reader.frames().next().unwrap();
        assert!(matches!(result, Err(ExtractError::FrameRead { .. })));
    }

    #[test]
    fn test_close_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = test_video_path(dir.path());
        create_test_video(&path, 1, 160, 120);

        let mut reader = FfmpegReader::new();
        reader.open(&path).unwrap();
        reader.close();
        reader.close();
        assert!(reader.frames().next().unwrap().is_err());
    }

    #[test]
    fn test_failed_read_consumes_a_position() {
        let mut frame_index = 3;
        let err = failed_read(&mut frame_index, "Invalid data".to_string());
        assert_eq!(frame_index, 4);
        assert!(err.is_recoverable());
        assert!(matches!(err, ExtractError::FrameRead { index: 3, .. }));

        failed_read(&mut frame_index, "Invalid data".to_string());
        assert_eq!(frame_index, 5);
    }

    #[test]
    fn test_estimate_prefers_header_count() {
        assert_eq!(estimate_frame_count(120, Some(10.0), None, 30.0), 120);
    }

    #[test]
    fn test_estimate_from_stream_duration() {
        assert_eq!(estimate_frame_count(0, Some(2.0), Some(3.0), 25.0), 50);
    }

    #[test]
    fn test_estimate_falls_back_to_container_duration() {
        assert_eq!(estimate_frame_count(0, None, Some(4.0), 30.0), 120);
    }

    #[test]
    fn test_estimate_unknown_is_zero() {
        assert_eq!(estimate_frame_count(0, None, None, 30.0), 0);
        assert_eq!(estimate_frame_count(0, Some(4.0), None, 0.0), 0);
    }
}
