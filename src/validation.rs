//! Video source validation.
//!
//! [`validate_source`] inspects the metadata of an opened video and returns
//! a [`ValidationReport`]. [`VideoSource::open`](crate::VideoSource::open)
//! refuses sources whose report contains errors and logs the warnings.
//!
//! # Example
//!
//! ```no_run
//! use framedump::{VideoSource, validate_source};
//!
//! let metadata = VideoSource::probe("input.mp4")?;
//! let report = validate_source(&metadata);
//! print!("{report}");
//! # Ok::<(), framedump::FramedumpError>(())
//! ```

use std::fmt::{Display, Formatter, Result as FmtResult};

use crate::metadata::VideoMetadata;

/// Frame rates above this are reported as suspicious.
const MAX_PLAUSIBLE_FRAME_RATE: f64 = 240.0;

/// Findings from inspecting a video source.
#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    /// Informational notices.
    pub info: Vec<String>,
    /// Issues that may affect which frames can be extracted.
    pub warnings: Vec<String>,
    /// Issues that make sampling impossible.
    pub errors: Vec<String>,
}

impl ValidationReport {
    /// Returns `true` if no errors were found.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Total number of entries (info + warnings + errors).
    pub fn issue_count(&self) -> usize {
        self.info.len() + self.warnings.len() + self.errors.len()
    }
}

impl Display for ValidationReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        for item in &self.info {
            writeln!(f, "[INFO] {item}")?;
        }
        for item in &self.warnings {
            writeln!(f, "[WARN] {item}")?;
        }
        for item in &self.errors {
            writeln!(f, "[ERROR] {item}")?;
        }
        if self.issue_count() == 0 {
            writeln!(f, "No issues found.")?;
        }
        Ok(())
    }
}

/// Check video metadata for problems that affect sampling.
pub fn validate_source(metadata: &VideoMetadata) -> ValidationReport {
    let mut report = ValidationReport::default();

    if metadata.width == 0 || metadata.height == 0 {
        report.errors.push(format!(
            "Invalid video dimensions: {}x{}",
            metadata.width, metadata.height,
        ));
    }

    if !metadata.frames_per_second.is_finite() || metadata.frames_per_second <= 0.0 {
        report
            .errors
            .push("Video frame rate is unknown; frame indices cannot be computed".to_string());
    } else if metadata.frames_per_second > MAX_PLAUSIBLE_FRAME_RATE {
        report.warnings.push(format!(
            "Unusually high frame rate ({:.1} fps); sampled timestamps may be inaccurate",
            metadata.frames_per_second,
        ));
    }

    if metadata.frame_count == 0 {
        report
            .warnings
            .push("Frame count is zero; no frames will be sampled".to_string());
    }

    report.info.push(format!(
        "Video: {} {}x{} @ {:.2} fps, {} frames, {:.2}s",
        metadata.codec,
        metadata.width,
        metadata.height,
        metadata.frames_per_second,
        metadata.frame_count,
        metadata.duration.as_secs_f64(),
    ));

    report
}
