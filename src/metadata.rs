//! Video stream metadata.
//!
//! [`VideoMetadata`] is read once when a [`VideoSource`](crate::VideoSource)
//! is opened and cached for the lifetime of the handle.

use std::time::Duration;

/// Metadata for the video stream being sampled.
///
/// # Example
///
/// ```no_run
/// use framedump::VideoSource;
///
/// let source = VideoSource::open("input.mp4")?;
/// let video = source.metadata();
/// println!(
///     "{}x{} @ {:.2} fps, {} frames ({:?})",
///     video.width, video.height, video.frames_per_second, video.frame_count, video.duration,
/// );
/// # Ok::<(), framedump::FramedumpError>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub struct VideoMetadata {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Frames per second (approximate for variable-frame-rate content).
    pub frames_per_second: f64,
    /// Total number of frames. Taken from the stream header when present,
    /// otherwise estimated from the container duration.
    pub frame_count: u64,
    /// Playback length derived from `frame_count / frames_per_second`.
    pub duration: Duration,
    /// Codec name (e.g. `"h264"`, `"vp9"`).
    pub codec: String,
    /// Container format name (e.g. `"mov,mp4,m4a,3gp,3g2,mj2"`).
    pub format: String,
    /// Index of the sampled stream within the container.
    pub stream_index: usize,
}

impl VideoMetadata {
    /// Convert a frame index to its presentation offset.
    pub fn frame_timestamp(&self, frame_number: u64) -> Duration {
        crate::utilities::frame_number_to_duration(frame_number, self.frames_per_second)
    }
}
