//! The frame extraction loop.
//!
//! [`FrameExtractor`] validates an [`ExtractionRequest`], opens the video,
//! computes the [`SamplePlan`] and runs *extract one* for every sampled
//! index: read the frame, recompress it if asked, name it and write it.
//! Per-frame failures are recorded in the [`ExtractionReport`] and never
//! abort the run.
//!
//! # Example
//!
//! ```no_run
//! use framedump::{ExtractionRequest, FrameExtractor, OutputFormat};
//!
//! let request = ExtractionRequest::new("input.mp4", "frames")
//!     .with_frame_interval(30)
//!     .with_output_format(OutputFormat::Png);
//! let report = FrameExtractor::new(request).run()?;
//! println!("{report}");
//! for file in &report.files {
//!     println!("{}", file.path.display());
//! }
//! # Ok::<(), framedump::FramedumpError>(())
//! ```

use std::{
    fs,
    path::{Path, PathBuf},
    time::Instant,
};

use crate::{
    configuration::{ExecutionMode, ExtractionRequest, OutputFormat, Resolution},
    error::FramedumpError,
    export::{self, ExtractedFile},
    progress::ProgressTracker,
    report::{ExtractionReport, FrameFailure},
    sampling::SamplePlan,
    source::VideoSource,
};

pub(crate) type FrameOutcome = Result<ExtractedFile, FrameFailure>;

/// Runs extraction requests.
#[derive(Debug, Clone)]
pub struct FrameExtractor {
    request: ExtractionRequest,
}

impl FrameExtractor {
    /// Wrap a request.
    pub fn new(request: ExtractionRequest) -> Self {
        Self { request }
    }

    /// The wrapped request.
    pub fn request(&self) -> &ExtractionRequest {
        &self.request
    }

    /// Run the extraction.
    ///
    /// The output directory is created (with parents) once the video has
    /// been opened successfully. Every sampled index is attempted; the
    /// returned report lists the files written and the frames that failed.
    ///
    /// # Errors
    ///
    /// Only fail-fast conditions are returned as errors:
    ///
    /// - configuration errors from [`ExtractionRequest::validate`] and
    ///   [`SamplePlan::for_video`];
    /// - [`FramedumpError::FileOpen`] / [`FramedumpError::NoVideoStream`];
    /// - [`FramedumpError::IoError`] if the output directory cannot be
    ///   created;
    /// - [`FramedumpError::WorkerPool`] if a parallel pool cannot be built.
    pub fn run(&self) -> Result<ExtractionReport, FramedumpError> {
        let request = &self.request;
        request.validate()?;

        let started = Instant::now();
        let writer = FrameWriter::for_request(request);
        let mut source = writer.open_source(&request.source_path)?;

        let plan = SamplePlan::for_video(
            source.metadata(),
            request.start_time,
            request.end_time,
            request.frame_interval,
        )?;

        fs::create_dir_all(&request.output_dir)?;
        let writer = writer.with_index_width(export::index_width(plan.last_frame()));

        log::info!(
            "Extracting {} frame(s) from {} (frames {}..{} every {}, {:?}) into {}",
            plan.len(),
            request.source_path.display(),
            plan.start_frame,
            plan.end_frame,
            plan.interval,
            request.execution_mode,
            request.output_dir.display(),
        );

        let mut tracker = ProgressTracker::new(request.progress.clone(), plan.len());

        let outcomes = match request.execution_mode {
            ExecutionMode::Sequential => extract_sequential(&mut source, &plan, &writer, &mut tracker),
            #[cfg(feature = "rayon")]
            ExecutionMode::Parallel { threads } => {
                // Workers open their own handles.
                drop(source);
                crate::parallel::extract_parallel(
                    &request.source_path,
                    &plan,
                    &writer,
                    threads,
                    &mut tracker,
                )?
            }
            #[cfg(not(feature = "rayon"))]
            ExecutionMode::Parallel { .. } => {
                log::warn!("Parallel extraction requires the `rayon` feature, running sequentially");
                extract_sequential(&mut source, &plan, &writer, &mut tracker)
            }
        };

        tracker.finish();

        let report = ExtractionReport::new(plan, outcomes, started.elapsed());
        log::info!("Frame extraction completed: {report}");
        Ok(report)
    }
}

/// Convenience wrapper around [`FrameExtractor::run`].
pub fn extract_frames(request: ExtractionRequest) -> Result<ExtractionReport, FramedumpError> {
    FrameExtractor::new(request).run()
}

/// Per-run output settings shared by every worker.
#[derive(Debug, Clone)]
pub(crate) struct FrameWriter {
    output_dir: PathBuf,
    format: OutputFormat,
    compress: bool,
    resize: Option<Resolution>,
    index_width: usize,
}

impl FrameWriter {
    pub(crate) fn for_request(request: &ExtractionRequest) -> Self {
        Self {
            output_dir: request.output_dir.clone(),
            format: request.output_format,
            compress: request.compress,
            resize: request.resize,
            index_width: export::MIN_INDEX_WIDTH,
        }
    }

    fn with_index_width(mut self, index_width: usize) -> Self {
        self.index_width = index_width;
        self
    }

    /// Open a source configured for this run's output size.
    pub(crate) fn open_source(&self, path: &Path) -> Result<VideoSource, FramedumpError> {
        let mut source = VideoSource::open(path)?;
        source.set_output_size(self.resize);
        Ok(source)
    }

    /// Read, transform and write one frame.
    pub(crate) fn extract(&self, source: &mut VideoSource, frame_number: u64) -> FrameOutcome {
        let outcome = self.try_extract(source, frame_number);
        if let Err(error) = &outcome {
            log::warn!("Skipping frame {frame_number}: {error}");
        }
        outcome.map_err(|error| FrameFailure {
            frame_number,
            error,
        })
    }

    fn try_extract(
        &self,
        source: &mut VideoSource,
        frame_number: u64,
    ) -> Result<ExtractedFile, FramedumpError> {
        let image = source.read_frame(frame_number)?;

        let timestamp = source.frame_timestamp(frame_number);
        let file_name =
            export::frame_file_name(frame_number, timestamp, self.format, self.index_width);
        let path = self.output_dir.join(&file_name);
        let write_error = |reason: String| FramedumpError::FrameWrite {
            frame_number,
            path: path.clone(),
            reason,
        };

        let image = if self.compress {
            export::compress_frame(image, self.format)
                .map_err(|error| write_error(error.to_string()))?
        } else {
            image
        };

        export::write_frame(&image, &path, self.format, self.compress)
            .map_err(|error| write_error(error.to_string()))?;

        log::debug!("Wrote frame {frame_number} -> {}", path.display());

        Ok(ExtractedFile {
            frame_number,
            timestamp,
            file_name,
            path,
        })
    }
}

fn extract_sequential(
    source: &mut VideoSource,
    plan: &SamplePlan,
    writer: &FrameWriter,
    tracker: &mut ProgressTracker,
) -> Vec<FrameOutcome> {
    plan.frame_numbers()
        .map(|frame_number| {
            let outcome = writer.extract(source, frame_number);
            tracker.advance(frame_number);
            outcome
        })
        .collect()
}
