//! Frame sampling.
//!
//! A [`SamplePlan`] turns a time window and a stride into the sequence of
//! frame indices an extraction run visits.

use std::{iter::StepBy, ops::Range, time::Duration};

use crate::{error::FramedumpError, metadata::VideoMetadata, utilities};

/// The frame indices sampled by one run: `start_frame..end_frame` stepping
/// by `interval`.
///
/// # Example
///
/// ```
/// use std::time::Duration;
///
/// use framedump::SamplePlan;
///
/// // 300 frames at 30 fps, window 2 s to 4 s, every frame.
/// let plan = SamplePlan::from_window(
///     30.0,
///     300,
///     Duration::from_secs(2),
///     Some(Duration::from_secs(4)),
///     1,
/// )?;
/// assert_eq!(plan.frame_numbers().collect::<Vec<_>>(), (60..120).collect::<Vec<_>>());
/// # Ok::<(), framedump::FramedumpError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplePlan {
    /// First sampled index.
    pub start_frame: u64,
    /// Exclusive upper bound.
    pub end_frame: u64,
    /// Stride between sampled indices.
    pub interval: u64,
}

impl SamplePlan {
    /// Build a plan from a time window over a video of `frame_count`
    /// frames.
    ///
    /// Bounds are converted to frame indices by flooring
    /// `seconds * frames_per_second`. `end` defaults to `frame_count` and is
    /// clamped to it.
    ///
    /// # Errors
    ///
    /// - [`FramedumpError::InvalidInterval`] for a zero interval.
    /// - [`FramedumpError::InvalidRange`] when `start` lies after the
    ///   resolved end.
    pub fn from_window(
        frames_per_second: f64,
        frame_count: u64,
        start: Duration,
        end: Option<Duration>,
        interval: u64,
    ) -> Result<Self, FramedumpError> {
        if interval == 0 {
            return Err(FramedumpError::InvalidInterval);
        }

        if let Some(end) = end
            && start > end
        {
            return Err(FramedumpError::InvalidRange {
                start: start.as_secs_f64(),
                end: end.as_secs_f64(),
            });
        }

        let end_frame = match end {
            Some(end) => {
                let end_frame = utilities::duration_to_frame_number(end, frames_per_second);
                if end_frame > frame_count {
                    log::warn!(
                        "End time {:.3}s exceeds video length ({frame_count} frames), clamping",
                        end.as_secs_f64(),
                    );
                    frame_count
                } else {
                    end_frame
                }
            }
            None => frame_count,
        };

        let start_frame = utilities::duration_to_frame_number(start, frames_per_second);
        if start_frame > end_frame {
            return Err(FramedumpError::InvalidRange {
                start: start.as_secs_f64(),
                end: utilities::frame_number_to_duration(end_frame, frames_per_second)
                    .as_secs_f64(),
            });
        }

        Ok(Self {
            start_frame,
            end_frame,
            interval,
        })
    }

    /// Build a plan for an opened video.
    pub fn for_video(
        metadata: &VideoMetadata,
        start: Duration,
        end: Option<Duration>,
        interval: u64,
    ) -> Result<Self, FramedumpError> {
        Self::from_window(
            metadata.frames_per_second,
            metadata.frame_count,
            start,
            end,
            interval,
        )
    }

    /// Iterate the sampled indices in ascending order.
    pub fn frame_numbers(&self) -> StepBy<Range<u64>> {
        (self.start_frame..self.end_frame).step_by(self.interval as usize)
    }

    /// Number of sampled indices.
    pub fn len(&self) -> u64 {
        if self.end_frame <= self.start_frame {
            return 0;
        }
        (self.end_frame - self.start_frame).div_ceil(self.interval)
    }

    /// Returns `true` when no index is sampled.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Largest sampled index, if any.
    pub fn last_frame(&self) -> Option<u64> {
        let count = self.len();
        (count > 0).then(|| self.start_frame + (count - 1) * self.interval)
    }
}
