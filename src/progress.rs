//! Progress reporting.
//!
//! Attach a [`ProgressCallback`] to an
//! [`ExtractionRequest`](crate::ExtractionRequest) to observe how many of the
//! sampled frames have been handled. Callbacks are purely observational and
//! cannot influence the run.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use framedump::{ExtractionRequest, FrameExtractor, ProgressCallback, ProgressInfo};
//!
//! struct PrintProgress;
//!
//! impl ProgressCallback for PrintProgress {
//!     fn on_progress(&self, info: &ProgressInfo) {
//!         if let Some(pct) = info.percentage {
//!             println!("{pct:.1}% ({}/{})", info.current, info.total);
//!         }
//!     }
//! }
//!
//! let request = ExtractionRequest::new("input.mp4", "frames")
//!     .with_progress(Arc::new(PrintProgress));
//! let report = FrameExtractor::new(request).run()?;
//! # Ok::<(), framedump::FramedumpError>(())
//! ```

use std::sync::Arc;
use std::time::{Duration, Instant};

/// A snapshot of extraction progress.
#[derive(Debug, Clone)]
pub struct ProgressInfo {
    /// Sampled frames handled so far, written or failed.
    pub current: u64,
    /// Total number of sampled frames.
    pub total: u64,
    /// Completion percentage (0.0 to 100.0). `None` when nothing is sampled.
    pub percentage: Option<f32>,
    /// Wall-clock time since the run started.
    pub elapsed: Duration,
    /// Estimated time remaining, based on current throughput.
    pub estimated_remaining: Option<Duration>,
    /// Index of the frame that was just handled. `None` on the final report.
    pub current_frame: Option<u64>,
}

/// Receives progress updates during extraction.
///
/// Implementations must be [`Send`] and [`Sync`] because parallel runs call
/// them from rayon worker threads.
pub trait ProgressCallback: Send + Sync {
    /// Called after each sampled frame and once more when the run ends.
    fn on_progress(&self, info: &ProgressInfo);
}

/// Discards all progress notifications. The default callback.
pub(crate) struct NoOpProgress;

impl ProgressCallback for NoOpProgress {
    fn on_progress(&self, _info: &ProgressInfo) {}
}

/// Tracks timing and emits callbacks.
pub(crate) struct ProgressTracker {
    callback: Arc<dyn ProgressCallback>,
    total: u64,
    current: u64,
    start_time: Instant,
}

impl ProgressTracker {
    pub(crate) fn new(callback: Arc<dyn ProgressCallback>, total: u64) -> Self {
        Self {
            callback,
            total,
            current: 0,
            start_time: Instant::now(),
        }
    }

    /// Record one handled frame and notify the callback.
    pub(crate) fn advance(&mut self, frame_number: u64) {
        self.current += 1;
        self.report(Some(frame_number));
    }

    /// Emit the final report.
    pub(crate) fn finish(&self) {
        self.report(None);
    }

    fn report(&self, frame_number: Option<u64>) {
        let elapsed = self.start_time.elapsed();

        let percentage =
            (self.total > 0).then(|| (self.current as f32 / self.total as f32) * 100.0);

        let estimated_remaining = (self.current > 0).then(|| {
            let remaining = self.total.saturating_sub(self.current);
            elapsed.mul_f64(remaining as f64 / self.current as f64)
        });

        let info = ProgressInfo {
            current: self.current,
            total: self.total,
            percentage,
            elapsed,
            estimated_remaining,
            current_frame: frame_number,
        };

        self.callback.on_progress(&info);
    }
}
