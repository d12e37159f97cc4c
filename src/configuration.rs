//! Extraction request configuration.
//!
//! [`ExtractionRequest`] is an immutable-by-convention builder describing a
//! single extraction run: which video to read, where to write, which frames
//! to sample and how to encode them.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//!
//! use framedump::{ExecutionMode, ExtractionRequest, OutputFormat, Resolution};
//!
//! let request = ExtractionRequest::new("input.mp4", "frames")
//!     .with_frame_interval(30)
//!     .with_output_format(OutputFormat::Png)
//!     .with_compression(true)
//!     .with_resize(Resolution::new(320, 240))
//!     .with_start_time(Duration::from_secs(2))
//!     .with_end_time(Duration::from_secs(4))
//!     .with_execution_mode(ExecutionMode::Parallel { threads: None });
//! ```

use std::{
    fmt::{Debug, Display, Formatter, Result as FmtResult},
    path::{Path, PathBuf},
    str::FromStr,
    sync::Arc,
    time::Duration,
};

use image::ImageFormat;

use crate::{
    error::FramedumpError,
    progress::{NoOpProgress, ProgressCallback},
};

/// Image format of the written frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OutputFormat {
    /// JPEG. This is the default.
    #[default]
    Jpg,
    /// Lossless PNG.
    Png,
    /// Uncompressed Windows bitmap.
    Bmp,
}

impl OutputFormat {
    /// All supported formats, in the order they are listed to users.
    pub const ALL: [OutputFormat; 3] = [OutputFormat::Jpg, OutputFormat::Png, OutputFormat::Bmp];

    /// File extension without the leading dot.
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Jpg => "jpg",
            OutputFormat::Png => "png",
            OutputFormat::Bmp => "bmp",
        }
    }

    /// Map to the corresponding `image` crate format.
    pub(crate) fn to_image_format(self) -> ImageFormat {
        match self {
            OutputFormat::Jpg => ImageFormat::Jpeg,
            OutputFormat::Png => ImageFormat::Png,
            OutputFormat::Bmp => ImageFormat::Bmp,
        }
    }
}

impl Display for OutputFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.extension())
    }
}

impl FromStr for OutputFormat {
    type Err = FramedumpError;

    /// Parse a format name. Case-insensitive, a leading dot is ignored and
    /// `jpeg` is accepted as an alias of `jpg`.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let cleaned = value.trim().trim_start_matches('.').to_ascii_lowercase();
        match cleaned.as_str() {
            "jpg" | "jpeg" => Ok(OutputFormat::Jpg),
            "png" => Ok(OutputFormat::Png),
            "bmp" => Ok(OutputFormat::Bmp),
            _ => Err(FramedumpError::UnsupportedFormat(value.to_string())),
        }
    }
}

/// Exact output dimensions for resized frames.
///
/// Frames are scaled to exactly `width` x `height`; the source aspect ratio
/// is not preserved and no letterboxing is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Resolution {
    /// Target width in pixels.
    pub width: u32,
    /// Target height in pixels.
    pub height: u32,
}

impl Resolution {
    /// Create a resolution. Zero dimensions are rejected when the request is
    /// validated.
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl Display for Resolution {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl FromStr for Resolution {
    type Err = FramedumpError;

    /// Parse `WIDTHxHEIGHT` (`x` or `X`, e.g. `640x480`).
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let invalid = || FramedumpError::InvalidResolution(value.to_string());
        let (width, height) = value
            .trim()
            .split_once(['x', 'X'])
            .ok_or_else(invalid)?;
        let width = width.trim().parse::<u32>().map_err(|_| invalid())?;
        let height = height.trim().parse::<u32>().map_err(|_| invalid())?;
        if width == 0 || height == 0 {
            return Err(invalid());
        }
        Ok(Self { width, height })
    }
}

/// How sampled frames are scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionMode {
    /// One source handle, frames processed in ascending index order. This is
    /// the default.
    #[default]
    Sequential,
    /// Frames fanned out over a rayon thread pool. Every task opens its own
    /// source handle, so no decoder state is shared between threads.
    ///
    /// `threads: None` uses rayon's default pool size (one thread per
    /// logical CPU). Requires the `rayon` feature; without it the request
    /// runs sequentially.
    Parallel {
        /// Worker thread count, or `None` for the rayon default.
        threads: Option<usize>,
    },
}

impl ExecutionMode {
    /// Returns `true` for [`ExecutionMode::Parallel`].
    pub fn is_parallel(self) -> bool {
        matches!(self, ExecutionMode::Parallel { .. })
    }
}

/// Description of one extraction run.
///
/// Defaults: every frame, JPEG, no compression, no resize, the whole video,
/// sequential execution, no progress callback.
#[derive(Clone)]
pub struct ExtractionRequest {
    pub(crate) source_path: PathBuf,
    pub(crate) output_dir: PathBuf,
    pub(crate) frame_interval: u64,
    pub(crate) output_format: OutputFormat,
    pub(crate) compress: bool,
    pub(crate) resize: Option<Resolution>,
    pub(crate) start_time: Duration,
    pub(crate) end_time: Option<Duration>,
    pub(crate) execution_mode: ExecutionMode,
    pub(crate) progress: Arc<dyn ProgressCallback>,
}

impl Debug for ExtractionRequest {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("ExtractionRequest")
            .field("source_path", &self.source_path)
            .field("output_dir", &self.output_dir)
            .field("frame_interval", &self.frame_interval)
            .field("output_format", &self.output_format)
            .field("compress", &self.compress)
            .field("resize", &self.resize)
            .field("start_time", &self.start_time)
            .field("end_time", &self.end_time)
            .field("execution_mode", &self.execution_mode)
            .finish_non_exhaustive()
    }
}

impl ExtractionRequest {
    /// Create a request that reads `source_path` and writes into
    /// `output_dir`, with default settings for everything else.
    pub fn new<S: AsRef<Path>, O: AsRef<Path>>(source_path: S, output_dir: O) -> Self {
        Self {
            source_path: source_path.as_ref().to_path_buf(),
            output_dir: output_dir.as_ref().to_path_buf(),
            frame_interval: 1,
            output_format: OutputFormat::default(),
            compress: false,
            resize: None,
            start_time: Duration::ZERO,
            end_time: None,
            execution_mode: ExecutionMode::default(),
            progress: Arc::new(NoOpProgress),
        }
    }

    /// Sample every `interval`-th frame. Zero is rejected at validation.
    #[must_use]
    pub fn with_frame_interval(mut self, interval: u64) -> Self {
        self.frame_interval = interval;
        self
    }

    /// Set the image format of written frames.
    #[must_use]
    pub fn with_output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = format;
        self
    }

    /// Enable format-specific recompression (JPEG quality 50, PNG best
    /// compression). Ignored for BMP.
    #[must_use]
    pub fn with_compression(mut self, compress: bool) -> Self {
        self.compress = compress;
        self
    }

    /// Scale every frame to exactly this resolution.
    #[must_use]
    pub fn with_resize(mut self, resolution: Resolution) -> Self {
        self.resize = Some(resolution);
        self
    }

    /// Start sampling at this offset from the beginning of the video.
    #[must_use]
    pub fn with_start_time(mut self, start: Duration) -> Self {
        self.start_time = start;
        self
    }

    /// Stop sampling at this offset (exclusive). Defaults to the video
    /// duration; later values are clamped to it.
    #[must_use]
    pub fn with_end_time(mut self, end: Duration) -> Self {
        self.end_time = Some(end);
        self
    }

    /// Choose sequential or parallel execution.
    #[must_use]
    pub fn with_execution_mode(mut self, mode: ExecutionMode) -> Self {
        self.execution_mode = mode;
        self
    }

    /// Shorthand for parallel execution on the default rayon pool.
    #[must_use]
    pub fn parallel(self) -> Self {
        self.with_execution_mode(ExecutionMode::Parallel { threads: None })
    }

    /// Attach a progress callback.
    #[must_use]
    pub fn with_progress(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress = callback;
        self
    }

    /// Path of the video to read.
    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    /// Directory frames are written to.
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Sampling stride.
    pub fn frame_interval(&self) -> u64 {
        self.frame_interval
    }

    /// Image format of written frames.
    pub fn output_format(&self) -> OutputFormat {
        self.output_format
    }

    /// Whether recompression is requested.
    pub fn compress(&self) -> bool {
        self.compress
    }

    /// Resize target, if any.
    pub fn resize(&self) -> Option<Resolution> {
        self.resize
    }

    /// Start of the sampled window.
    pub fn start_time(&self) -> Duration {
        self.start_time
    }

    /// End of the sampled window, if explicitly set.
    pub fn end_time(&self) -> Option<Duration> {
        self.end_time
    }

    /// Scheduling strategy.
    pub fn execution_mode(&self) -> ExecutionMode {
        self.execution_mode
    }

    /// Check the request for configuration errors.
    ///
    /// Runs before the video is opened, so a failing request has no side
    /// effects.
    ///
    /// # Errors
    ///
    /// - [`FramedumpError::InvalidInterval`] for a zero interval.
    /// - [`FramedumpError::InvalidResolution`] for a zero resize dimension.
    /// - [`FramedumpError::InvalidRange`] when the start lies after an
    ///   explicit end.
    pub fn validate(&self) -> Result<(), FramedumpError> {
        if self.frame_interval == 0 {
            return Err(FramedumpError::InvalidInterval);
        }

        if let Some(resolution) = self.resize
            && (resolution.width == 0 || resolution.height == 0)
        {
            return Err(FramedumpError::InvalidResolution(resolution.to_string()));
        }

        if let Some(end) = self.end_time
            && self.start_time > end
        {
            return Err(FramedumpError::InvalidRange {
                start: self.start_time.as_secs_f64(),
                end: end.as_secs_f64(),
            });
        }

        if let ExecutionMode::Parallel { threads: Some(0) } = self.execution_mode {
            log::warn!("Parallel thread count of 0 requested, using the rayon default");
        }

        Ok(())
    }
}

/// Parse a time value given as seconds (`75`, `2.5`), `MM:SS` or
/// `HH:MM:SS(.fff)`.
///
/// # Errors
///
/// Returns [`FramedumpError::InvalidTime`] for empty, negative, non-finite
/// or malformed values.
pub fn parse_time(value: &str) -> Result<Duration, FramedumpError> {
    let trimmed = value.trim();
    let invalid = || FramedumpError::InvalidTime(value.to_string());

    if trimmed.is_empty() {
        return Err(invalid());
    }

    if !trimmed.contains(':') {
        let seconds = trimmed.parse::<f64>().map_err(|_| invalid())?;
        return Duration::try_from_secs_f64(seconds).map_err(|_| invalid());
    }

    let parts: Vec<&str> = trimmed.split(':').collect();
    let (hours, minutes, seconds) = match parts.as_slice() {
        [minutes, seconds] => (0, minutes.parse::<u64>().map_err(|_| invalid())?, *seconds),
        [hours, minutes, seconds] => (
            hours.parse::<u64>().map_err(|_| invalid())?,
            minutes.parse::<u64>().map_err(|_| invalid())?,
            *seconds,
        ),
        _ => return Err(invalid()),
    };

    let seconds = seconds.parse::<f64>().map_err(|_| invalid())?;
    if !(0.0..60.0).contains(&seconds) || minutes >= 60 {
        return Err(invalid());
    }

    let whole = Duration::from_secs(hours * 3600 + minutes * 60);
    let fraction = Duration::try_from_secs_f64(seconds).map_err(|_| invalid())?;
    Ok(whole + fraction)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_format_parses_aliases() {
        assert_eq!("jpg".parse::<OutputFormat>().unwrap(), OutputFormat::Jpg);
        assert_eq!("JPEG".parse::<OutputFormat>().unwrap(), OutputFormat::Jpg);
        assert_eq!(".png".parse::<OutputFormat>().unwrap(), OutputFormat::Png);
        assert_eq!(" bmp ".parse::<OutputFormat>().unwrap(), OutputFormat::Bmp);
    }

    #[test]
    fn output_format_rejects_unknown() {
        let error = "tiff".parse::<OutputFormat>().unwrap_err();
        assert!(matches!(error, FramedumpError::UnsupportedFormat(ref name) if name == "tiff"));
        assert!(error.is_configuration_error());
    }

    #[test]
    fn resolution_parses() {
        assert_eq!("640x480".parse::<Resolution>().unwrap(), Resolution::new(640, 480));
        assert_eq!("32X24".parse::<Resolution>().unwrap(), Resolution::new(32, 24));
        assert!("640".parse::<Resolution>().is_err());
        assert!("0x480".parse::<Resolution>().is_err());
        assert!("axb".parse::<Resolution>().is_err());
    }

    #[test]
    fn parse_time_formats() {
        assert_eq!(parse_time("75").unwrap(), Duration::from_secs(75));
        assert_eq!(parse_time("2.5").unwrap(), Duration::from_millis(2500));
        assert_eq!(parse_time("01:15").unwrap(), Duration::from_secs(75));
        assert_eq!(parse_time("01:00:01.5").unwrap(), Duration::from_millis(3_601_500));
    }

    #[test]
    fn parse_time_rejects_garbage() {
        assert!(parse_time("").is_err());
        assert!(parse_time("-3").is_err());
        assert!(parse_time("NaN").is_err());
        assert!(parse_time("1:2:3:4").is_err());
        assert!(parse_time("00:75").is_err());
    }
}
