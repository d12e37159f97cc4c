//! Error types for the `framedump` crate.
//!
//! [`FramedumpError`] is returned by every fallible operation. Variants fall
//! into three groups:
//!
//! - configuration errors, raised before any file is touched;
//! - open errors, raised when the video source cannot be used;
//! - per-frame errors ([`FrameRead`](FramedumpError::FrameRead) and
//!   [`FrameWrite`](FramedumpError::FrameWrite)), which never abort a run and
//!   are collected into the [`ExtractionReport`](crate::ExtractionReport).

use std::{io::Error as IoError, path::PathBuf};

use ffmpeg_next::Error as FfmpegError;
use image::ImageError;
use thiserror::Error;

/// The unified error type for all `framedump` operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FramedumpError {
    /// The requested output image format is not one of jpg, png or bmp.
    #[error("Unsupported output format '{0}' (expected one of: jpg, png, bmp)")]
    UnsupportedFormat(String),

    /// A frame interval of zero was provided.
    #[error("Frame interval must be greater than zero")]
    InvalidInterval,

    /// The start time lies after the end time.
    #[error("Invalid range: start ({start:.3}s) must not exceed end ({end:.3}s)")]
    InvalidRange {
        /// Requested start time in seconds.
        start: f64,
        /// Requested (or resolved) end time in seconds.
        end: f64,
    },

    /// A time bound is negative, NaN or infinite.
    #[error("Invalid time value: {0}")]
    InvalidTime(String),

    /// A resize target has a zero dimension or could not be parsed.
    #[error("Invalid resolution: {0}")]
    InvalidResolution(String),

    /// The video file could not be opened.
    #[error("Failed to open video file at {path}: {reason}")]
    FileOpen {
        /// Path that was passed to [`crate::VideoSource::open`].
        path: PathBuf,
        /// Underlying reason the open failed.
        reason: String,
    },

    /// The file does not contain a video stream.
    #[error("No video stream found in file")]
    NoVideoStream,

    /// A sampled frame could not be decoded.
    #[error("Failed to read frame {frame_number}: {reason}")]
    FrameRead {
        /// Index of the frame that failed.
        frame_number: u64,
        /// Decoder-side reason.
        reason: String,
    },

    /// A decoded frame could not be encoded or written to disk.
    #[error("Failed to write frame {frame_number} to {path}: {reason}")]
    FrameWrite {
        /// Index of the frame that failed.
        frame_number: u64,
        /// Destination path.
        path: PathBuf,
        /// Encoder or filesystem reason.
        reason: String,
    },

    /// The worker thread pool for parallel extraction could not be built.
    #[error("Failed to build worker pool: {0}")]
    WorkerPool(String),

    /// An error originating from the FFmpeg libraries.
    #[error("FFmpeg error: {0}")]
    FfmpegError(String),

    /// An I/O error occurred while reading or writing files.
    #[error("I/O error: {0}")]
    IoError(#[from] IoError),

    /// An error from the `image` crate during frame conversion.
    #[error("Image processing error: {0}")]
    ImageError(#[from] ImageError),
}

impl FramedumpError {
    /// Returns `true` for errors that are isolated to a single frame.
    ///
    /// Such errors are recorded in the report; every other variant aborts
    /// the whole extraction.
    pub fn is_frame_error(&self) -> bool {
        matches!(
            self,
            FramedumpError::FrameRead { .. } | FramedumpError::FrameWrite { .. }
        )
    }

    /// Returns `true` for errors raised by request validation.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            FramedumpError::UnsupportedFormat(_)
                | FramedumpError::InvalidInterval
                | FramedumpError::InvalidRange { .. }
                | FramedumpError::InvalidTime(_)
                | FramedumpError::InvalidResolution(_)
        )
    }
}

impl From<FfmpegError> for FramedumpError {
    fn from(error: FfmpegError) -> Self {
        FramedumpError::FfmpegError(error.to_string())
    }
}
