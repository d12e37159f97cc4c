//! Extraction results.

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    time::Duration,
};

use serde_json::{Value, json};

use crate::{error::FramedumpError, export::ExtractedFile, sampling::SamplePlan};

/// A sampled frame that could not be read or written.
#[derive(Debug)]
pub struct FrameFailure {
    /// Index of the frame.
    pub frame_number: u64,
    /// Why it failed. Always a [`FramedumpError::FrameRead`] or
    /// [`FramedumpError::FrameWrite`].
    pub error: FramedumpError,
}

/// Outcome of one completed extraction run.
///
/// `files` and `failures` are both sorted by frame index regardless of the
/// order in which workers finished.
#[derive(Debug)]
pub struct ExtractionReport {
    /// The sampled index sequence.
    pub plan: SamplePlan,
    /// Frames written to disk.
    pub files: Vec<ExtractedFile>,
    /// Frames that were sampled but not written.
    pub failures: Vec<FrameFailure>,
    /// Wall-clock duration of the run.
    pub elapsed: Duration,
}

impl ExtractionReport {
    pub(crate) fn new(
        plan: SamplePlan,
        outcomes: Vec<Result<ExtractedFile, FrameFailure>>,
        elapsed: Duration,
    ) -> Self {
        let (mut files, mut failures): (Vec<_>, Vec<_>) = (Vec::new(), Vec::new());
        for outcome in outcomes {
            match outcome {
                Ok(file) => files.push(file),
                Err(failure) => failures.push(failure),
            }
        }
        files.sort_by_key(|file| file.frame_number);
        failures.sort_by_key(|failure| failure.frame_number);

        Self {
            plan,
            files,
            failures,
            elapsed,
        }
    }

    /// Number of sampled indices.
    pub fn requested(&self) -> u64 {
        self.plan.len()
    }

    /// Number of frames written.
    pub fn written(&self) -> usize {
        self.files.len()
    }

    /// Number of sampled frames that failed.
    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    /// Returns `true` when every sampled frame was written.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// Names of the written files, in index order.
    pub fn file_names(&self) -> Vec<&str> {
        self.files.iter().map(|file| file.file_name.as_str()).collect()
    }

    /// Machine-readable summary.
    pub fn to_json(&self) -> Value {
        json!({
            "requested": self.requested(),
            "written": self.written(),
            "failed": self.failed(),
            "start_frame": self.plan.start_frame,
            "end_frame": self.plan.end_frame,
            "interval": self.plan.interval,
            "elapsed_seconds": self.elapsed.as_secs_f64(),
            "files": self.files.iter().map(|file| json!({
                "frame_number": file.frame_number,
                "timestamp_seconds": file.timestamp.as_secs_f64(),
                "path": file.path.display().to_string(),
            })).collect::<Vec<_>>(),
            "failures": self.failures.iter().map(|failure| json!({
                "frame_number": failure.frame_number,
                "error": failure.error.to_string(),
            })).collect::<Vec<_>>(),
        })
    }
}

impl Display for ExtractionReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(
            f,
            "{} of {} sampled frame(s) written, {} failed ({:.2}s)",
            self.written(),
            self.requested(),
            self.failed(),
            self.elapsed.as_secs_f64(),
        )
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn file(frame_number: u64) -> ExtractedFile {
        ExtractedFile {
            frame_number,
            timestamp: Duration::ZERO,
            file_name: format!("frame_{frame_number:04}_00-00-00.jpg"),
            path: PathBuf::from(format!("out/frame_{frame_number:04}_00-00-00.jpg")),
        }
    }

    fn failure(frame_number: u64) -> FrameFailure {
        FrameFailure {
            frame_number,
            error: FramedumpError::FrameRead {
                frame_number,
                reason: "corrupt".to_string(),
            },
        }
    }

    #[test]
    fn outcomes_are_split_and_sorted() {
        let plan = SamplePlan {
            start_frame: 0,
            end_frame: 4,
            interval: 1,
        };
        let report = ExtractionReport::new(
            plan,
            vec![Ok(file(3)), Err(failure(2)), Ok(file(0)), Ok(file(1))],
            Duration::from_millis(1500),
        );

        assert_eq!(report.requested(), 4);
        assert_eq!(report.written(), 3);
        assert_eq!(report.failed(), 1);
        assert!(!report.is_complete());
        assert_eq!(
            report.file_names(),
            [
                "frame_0000_00-00-00.jpg",
                "frame_0001_00-00-00.jpg",
                "frame_0003_00-00-00.jpg",
            ],
        );
        assert_eq!(
            report.to_string(),
            "3 of 4 sampled frame(s) written, 1 failed (1.50s)"
        );

        let json = report.to_json();
        assert_eq!(json["written"], 3);
        assert_eq!(json["failures"][0]["frame_number"], 2);
    }
}
