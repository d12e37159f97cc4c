//! # framedump
//!
//! Sample still frames from a video at a fixed stride and write them to disk
//! as JPEG, PNG or BMP images, powered by FFmpeg via the
//! [`ffmpeg-next`](https://crates.io/crates/ffmpeg-next) crate.
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::time::Duration;
//!
//! use framedump::{ExtractionRequest, FrameExtractor, OutputFormat, Resolution};
//!
//! let request = ExtractionRequest::new("input.mp4", "frames")
//!     .with_frame_interval(10)
//!     .with_output_format(OutputFormat::Jpg)
//!     .with_compression(true)
//!     .with_resize(Resolution::new(640, 360))
//!     .with_start_time(Duration::from_secs(5))
//!     .parallel();
//!
//! let report = FrameExtractor::new(request).run()?;
//! println!("{report}");
//! # Ok::<(), framedump::FramedumpError>(())
//! ```
//!
//! Files are named `frame_<index>_<HH-MM-SS>.<ext>`, e.g.
//! `frame_0150_00-00-05.jpg`. Indices are zero-padded to at least four
//! digits, so sorting the names sorts the frames.
//!
//! ## Failure model
//!
//! Invalid configuration and unopenable files fail the whole call before
//! anything is written. A frame that cannot be decoded or written is logged,
//! skipped and listed in [`ExtractionReport::failures`]; the remaining
//! frames are still extracted.
//!
//! ## Optional Features
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `rayon` (default) | [`ExecutionMode::Parallel`] fans frames out over a rayon pool, one source handle per task |
//!
//! ## Requirements
//!
//! FFmpeg development libraries must be installed on your system.

pub mod configuration;
pub mod error;
pub mod export;
pub mod extractor;
pub mod ffmpeg;
pub mod metadata;
#[cfg(feature = "rayon")]
mod parallel;
pub mod progress;
pub mod report;
pub mod sampling;
pub mod source;
mod utilities;
pub mod validation;

pub use configuration::{ExecutionMode, ExtractionRequest, OutputFormat, Resolution, parse_time};
pub use error::FramedumpError;
pub use export::{ExtractedFile, frame_file_name, index_width};
pub use extractor::{FrameExtractor, extract_frames};
pub use ffmpeg::{FfmpegLogLevel, set_ffmpeg_log_level};
pub use metadata::VideoMetadata;
pub use progress::{ProgressCallback, ProgressInfo};
pub use report::{ExtractionReport, FrameFailure};
pub use sampling::SamplePlan;
pub use source::VideoSource;
pub use utilities::format_timestamp;
pub use validation::{ValidationReport, validate_source};
