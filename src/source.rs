//! Video source handle.
//!
//! [`VideoSource`] owns an FFmpeg demuxer, a video decoder and a scaler for
//! one file. It keeps a decode cursor so that reading ascending, closely
//! spaced frame indices decodes forward instead of seeking for every frame.
//!
//! A source is never shared between threads: parallel extraction opens one
//! source per worker task.

use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    path::{Path, PathBuf},
    time::Duration,
};

use ffmpeg_next::{
    Rational,
    codec::{context::Context as CodecContext, decoder::Video as VideoDecoder},
    format::{Pixel, context::Input},
    frame::Video as VideoFrame,
    media::Type,
    software::scaling::{Context as ScalingContext, Flags as ScalingFlags},
};
use image::RgbImage;

use crate::{
    configuration::Resolution, error::FramedumpError, metadata::VideoMetadata, utilities,
    validation,
};

/// Targets at most this many frames past the cursor are reached by decoding
/// forward rather than seeking.
const SEEK_GAP_THRESHOLD: u64 = 30;

/// An open, decodable video stream.
///
/// The FFmpeg contexts are released when the source is dropped, on every
/// exit path.
///
/// # Example
///
/// ```no_run
/// use framedump::VideoSource;
///
/// let mut source = VideoSource::open("input.mp4")?;
/// let frame = source.read_frame(100)?;
/// frame.save("frame_100.png")?;
/// # Ok::<(), framedump::FramedumpError>(())
/// ```
pub struct VideoSource {
    input_context: Input,
    decoder: VideoDecoder,
    scaler: Option<ScalingContext>,
    output_size: Option<Resolution>,
    time_base: Rational,
    /// Stream start time in time-base units, subtracted from every PTS.
    start_pts: i64,
    metadata: VideoMetadata,
    path: PathBuf,
    /// Index of the last frame the decoder produced.
    position: Option<u64>,
    end_of_stream: bool,
}

impl Debug for VideoSource {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("VideoSource")
            .field("path", &self.path)
            .field("metadata", &self.metadata)
            .field("output_size", &self.output_size)
            .field("position", &self.position)
            .field("end_of_stream", &self.end_of_stream)
            .finish_non_exhaustive()
    }
}

impl VideoSource {
    /// Open a video file.
    ///
    /// Initialises FFmpeg (idempotent), opens the container, selects the best
    /// video stream and reads its metadata.
    ///
    /// # Errors
    ///
    /// - [`FramedumpError::FileOpen`] if the file cannot be opened, its codec
    ///   cannot be decoded, or its metadata is unusable (zero frame rate or
    ///   dimensions).
    /// - [`FramedumpError::NoVideoStream`] if the container has no video.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, FramedumpError> {
        let path = path.as_ref().to_path_buf();
        let open_error = |reason: String| FramedumpError::FileOpen {
            path: path.clone(),
            reason,
        };

        log::debug!("Opening video source: {}", path.display());

        ffmpeg_next::init()
            .map_err(|error| open_error(format!("FFmpeg initialisation failed: {error}")))?;

        let input_context =
            ffmpeg_next::format::input(&path).map_err(|error| open_error(error.to_string()))?;

        let stream = input_context
            .streams()
            .best(Type::Video)
            .ok_or(FramedumpError::NoVideoStream)?;
        let stream_index = stream.index();
        let time_base = stream.time_base();
        let start_pts = match stream.start_time() {
            ffmpeg_next::ffi::AV_NOPTS_VALUE => 0,
            start => start.max(0),
        };

        let decoder_context = CodecContext::from_parameters(stream.parameters())
            .map_err(|error| open_error(format!("Failed to read codec parameters: {error}")))?;
        let decoder = decoder_context
            .decoder()
            .video()
            .map_err(|error| open_error(format!("Failed to create video decoder: {error}")))?;

        let frame_rate = stream.avg_frame_rate();
        let frames_per_second = if frame_rate.numerator() > 0 && frame_rate.denominator() > 0 {
            f64::from(frame_rate)
        } else {
            let rate = stream.rate();
            if rate.numerator() > 0 && rate.denominator() > 0 {
                f64::from(rate)
            } else {
                0.0
            }
        };

        // Prefer the stream's own length, fall back to the container's.
        let stream_duration = stream.duration();
        let container_seconds = if stream_duration > 0 {
            utilities::pts_to_seconds(stream_duration, time_base)
        } else if input_context.duration() > 0 {
            input_context.duration() as f64 / f64::from(ffmpeg_next::ffi::AV_TIME_BASE)
        } else {
            0.0
        };

        let frame_count = match stream.frames() {
            count if count > 0 => count as u64,
            _ => (container_seconds * frames_per_second).floor().max(0.0) as u64,
        };

        let duration = utilities::frame_number_to_duration(frame_count, frames_per_second);

        let codec = decoder
            .codec()
            .map(|codec| codec.name().to_string())
            .unwrap_or_else(|| "unknown".to_string());

        let metadata = VideoMetadata {
            width: decoder.width(),
            height: decoder.height(),
            frames_per_second,
            frame_count,
            duration,
            codec,
            format: input_context.format().name().to_string(),
            stream_index,
        };

        let report = validation::validate_source(&metadata);
        for warning in &report.warnings {
            log::warn!("{}: {warning}", path.display());
        }
        if !report.is_valid() {
            return Err(open_error(report.errors.join("; ")));
        }

        log::info!(
            "Opened video source: {} (format={}, {}x{}, {:.3} fps, {} frames, {:.2}s, codec={})",
            path.display(),
            metadata.format,
            metadata.width,
            metadata.height,
            metadata.frames_per_second,
            metadata.frame_count,
            metadata.duration.as_secs_f64(),
            metadata.codec,
        );

        Ok(Self {
            input_context,
            decoder,
            scaler: None,
            output_size: None,
            time_base,
            start_pts,
            metadata,
            path,
            position: None,
            end_of_stream: false,
        })
    }

    /// Open a file and return its metadata, releasing the handle
    /// immediately.
    pub fn probe<P: AsRef<Path>>(path: P) -> Result<VideoMetadata, FramedumpError> {
        Ok(Self::open(path)?.metadata.clone())
    }

    /// Cached metadata of the sampled stream.
    pub fn metadata(&self) -> &VideoMetadata {
        &self.metadata
    }

    /// Path this source was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Scale decoded frames to exactly this size (`None` keeps the source
    /// size). Aspect ratio is not preserved.
    pub fn set_output_size(&mut self, size: Option<Resolution>) {
        if self.output_size != size {
            self.output_size = size;
            self.scaler = None;
        }
    }

    /// Dimensions of the images returned by [`read_frame`](Self::read_frame).
    pub fn output_dimensions(&self) -> (u32, u32) {
        match self.output_size {
            Some(size) => (size.width, size.height),
            None => (self.metadata.width, self.metadata.height),
        }
    }

    /// Seek to `frame_number` and decode it as an RGB image.
    ///
    /// If the exact frame has no presentation timestamp of its own (for
    /// example after a variable-frame-rate gap) the next decodable frame is
    /// returned.
    ///
    /// # Errors
    ///
    /// Every failure is reported as [`FramedumpError::FrameRead`]: the index
    /// lies past the end of the stream, the seek failed, or the data could
    /// not be decoded. The handle stays usable; the next read seeks afresh.
    pub fn read_frame(&mut self, frame_number: u64) -> Result<RgbImage, FramedumpError> {
        match self.decode_frame(frame_number) {
            Ok(image) => Ok(image),
            Err(error) => {
                self.position = None;
                Err(match error {
                    FramedumpError::FrameRead { .. } => error,
                    other => FramedumpError::FrameRead {
                        frame_number,
                        reason: other.to_string(),
                    },
                })
            }
        }
    }

    /// Presentation offset of a frame index.
    pub fn frame_timestamp(&self, frame_number: u64) -> Duration {
        self.metadata.frame_timestamp(frame_number)
    }

    fn decode_frame(&mut self, frame_number: u64) -> Result<RgbImage, FramedumpError> {
        let total_frames = self.metadata.frame_count;
        if total_frames > 0 && frame_number >= total_frames {
            return Err(FramedumpError::FrameRead {
                frame_number,
                reason: format!("past the end of the stream ({total_frames} frames)"),
            });
        }

        if self.needs_seek(frame_number) {
            self.seek_to(frame_number)?;
        }

        let mut decoded_frame = VideoFrame::empty();
        loop {
            while self.decoder.receive_frame(&mut decoded_frame).is_ok() {
                let current_frame_number = self.frame_number_of(&decoded_frame);
                self.position = Some(current_frame_number);

                if current_frame_number >= frame_number {
                    return self.convert_frame(&decoded_frame);
                }
            }

            if self.end_of_stream {
                return Err(FramedumpError::FrameRead {
                    frame_number,
                    reason: "end of stream reached before the frame was decoded".to_string(),
                });
            }

            self.feed_decoder()?;
        }
    }

    fn needs_seek(&self, frame_number: u64) -> bool {
        match self.position {
            Some(position) if !self.end_of_stream && frame_number > position => {
                frame_number - position > SEEK_GAP_THRESHOLD
            }
            _ => true,
        }
    }

    fn seek_to(&mut self, frame_number: u64) -> Result<(), FramedumpError> {
        let start_offset = (utilities::pts_to_seconds(self.start_pts, self.time_base)
            * 1_000_000.0) as i64;
        let target = utilities::frame_number_to_seek_timestamp(
            frame_number,
            self.metadata.frames_per_second,
        ) + start_offset;

        log::debug!("Seeking {} to frame {frame_number}", self.path.display());

        self.input_context.seek(target, ..target)?;
        self.decoder.flush();
        self.position = None;
        self.end_of_stream = false;
        Ok(())
    }

    /// Send the next packet of the video stream to the decoder, or signal
    /// end of stream once the demuxer is exhausted.
    fn feed_decoder(&mut self) -> Result<(), FramedumpError> {
        let stream_index = self.metadata.stream_index;
        loop {
            match self.input_context.packets().next() {
                Some((stream, packet)) => {
                    if stream.index() != stream_index {
                        continue;
                    }
                    self.decoder.send_packet(&packet)?;
                    return Ok(());
                }
                None => {
                    self.decoder.send_eof()?;
                    self.end_of_stream = true;
                    return Ok(());
                }
            }
        }
    }

    fn frame_number_of(&self, decoded_frame: &VideoFrame) -> u64 {
        let pts = decoded_frame
            .timestamp()
            .or_else(|| decoded_frame.pts())
            .unwrap_or(self.start_pts);
        utilities::pts_to_frame_number(
            pts - self.start_pts,
            self.time_base,
            self.metadata.frames_per_second,
        )
    }

    fn convert_frame(&mut self, decoded_frame: &VideoFrame) -> Result<RgbImage, FramedumpError> {
        let (width, height) = self.output_dimensions();

        let stale = self.scaler.as_ref().is_none_or(|scaler| {
            let input = scaler.input();
            input.format != decoded_frame.format()
                || input.width != decoded_frame.width()
                || input.height != decoded_frame.height()
        });
        if stale {
            self.scaler = Some(ScalingContext::get(
                decoded_frame.format(),
                decoded_frame.width(),
                decoded_frame.height(),
                Pixel::RGB24,
                width,
                height,
                ScalingFlags::BILINEAR,
            )?);
        }

        let mut rgb_frame = VideoFrame::empty();
        if let Some(scaler) = self.scaler.as_mut() {
            scaler.run(decoded_frame, &mut rgb_frame)?;
        }

        let buffer = utilities::frame_to_rgb_buffer(&rgb_frame, width, height);
        RgbImage::from_raw(width, height, buffer).ok_or_else(|| {
            FramedumpError::FfmpegError(
                "Failed to construct RGB image from decoded frame data".to_string(),
            )
        })
    }
}

impl Drop for VideoSource {
    fn drop(&mut self) {
        log::debug!("Released video source: {}", self.path.display());
    }
}
