//! Parallel frame extraction.
//!
//! Sampled indices are split into contiguous chunks and distributed across
//! a rayon pool. Each chunk task opens its own [`VideoSource`], so no demuxer
//! or decoder state is ever shared between threads; within a chunk frames
//! are read in ascending order and benefit from forward decoding.
//!
//! The public API is [`ExecutionMode::Parallel`](crate::ExecutionMode) on
//! the request; this module contains only the implementation.

use std::{
    path::Path,
    sync::{Mutex, PoisonError},
};

use rayon::{ThreadPoolBuilder, iter::ParallelIterator, slice::ParallelSlice};

use crate::{
    error::FramedumpError,
    extractor::{FrameOutcome, FrameWriter},
    progress::ProgressTracker,
    report::FrameFailure,
    sampling::SamplePlan,
    source::VideoSource,
};

/// Chunks handed out per worker thread. More than one keeps threads busy
/// when some chunks decode slower than others.
const CHUNKS_PER_WORKER: usize = 2;

/// Extract every index of `plan` on a rayon pool.
///
/// `threads: None` (or `Some(0)`) runs on the global rayon pool; any other
/// value builds a dedicated pool of that size for this call. Outcomes are
/// returned in no particular order.
pub(crate) fn extract_parallel(
    path: &Path,
    plan: &SamplePlan,
    writer: &FrameWriter,
    threads: Option<usize>,
    tracker: &mut ProgressTracker,
) -> Result<Vec<FrameOutcome>, FramedumpError> {
    let frame_numbers: Vec<u64> = plan.frame_numbers().collect();
    if frame_numbers.is_empty() {
        return Ok(Vec::new());
    }

    let tracker = Mutex::new(tracker);
    let run = || {
        let chunk_size = chunk_size(frame_numbers.len(), rayon::current_num_threads());
        log::debug!(
            "Distributing {} frame(s) over {} worker(s) in chunks of {chunk_size}",
            frame_numbers.len(),
            rayon::current_num_threads(),
        );
        frame_numbers
            .par_chunks(chunk_size)
            .flat_map_iter(|chunk| extract_chunk(path, chunk, writer, &tracker))
            .collect::<Vec<_>>()
    };

    match threads {
        Some(count) if count > 0 => {
            let pool = ThreadPoolBuilder::new()
                .num_threads(count)
                .build()
                .map_err(|error| FramedumpError::WorkerPool(error.to_string()))?;
            Ok(pool.install(run))
        }
        _ => Ok(run()),
    }
}

/// Size of the contiguous chunks `total` indices are split into.
fn chunk_size(total: usize, workers: usize) -> usize {
    let chunks = workers.max(1) * CHUNKS_PER_WORKER;
    total.div_ceil(chunks).max(1)
}

/// Record one handled frame on the shared tracker.
///
/// A callback that panicked on another worker poisons the lock; the counters
/// themselves stay consistent, so later frames keep reporting.
fn advance_shared(tracker: &Mutex<&mut ProgressTracker>, frame_number: u64) {
    tracker
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .advance(frame_number);
}

/// Process one chunk on a freshly opened source.
fn extract_chunk(
    path: &Path,
    chunk: &[u64],
    writer: &FrameWriter,
    tracker: &Mutex<&mut ProgressTracker>,
) -> Vec<FrameOutcome> {
    let advance = |frame_number: u64| advance_shared(tracker, frame_number);

    let mut source: VideoSource = match writer.open_source(path) {
        Ok(source) => source,
        Err(error) => {
            log::warn!(
                "Worker could not open {}, skipping {} frame(s): {error}",
                path.display(),
                chunk.len(),
            );
            return chunk
                .iter()
                .map(|&frame_number| {
                    advance(frame_number);
                    Err(FrameFailure {
                        frame_number,
                        error: FramedumpError::FrameRead {
                            frame_number,
                            reason: format!("worker could not open the source: {error}"),
                        },
                    })
                })
                .collect();
        }
    };

    chunk
        .iter()
        .map(|&frame_number| {
            let outcome = writer.extract(&mut source, frame_number);
            advance(frame_number);
            outcome
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::progress::{ProgressCallback, ProgressInfo};

    struct Recorder(Mutex<Vec<u64>>);

    impl ProgressCallback for Recorder {
        fn on_progress(&self, info: &ProgressInfo) {
            if let Some(frame_number) = info.current_frame {
                self.0.lock().unwrap().push(frame_number);
            }
        }
    }

    #[test]
    fn progress_survives_a_poisoned_lock() {
        let recorder = Arc::new(Recorder(Mutex::new(Vec::new())));
        let mut tracker = ProgressTracker::new(recorder.clone(), 3);
        let shared = Mutex::new(&mut tracker);

        advance_shared(&shared, 0);
        std::thread::scope(|scope| {
            let poisoned = scope
                .spawn(|| {
                    let _guard = shared.lock().unwrap();
                    panic!("callback failure");
                })
                .join();
            assert!(poisoned.is_err());
        });
        assert!(shared.is_poisoned());

        advance_shared(&shared, 1);
        advance_shared(&shared, 2);
        assert_eq!(*recorder.0.lock().unwrap(), [0, 1, 2]);
    }

    #[test]
    fn chunks_cover_every_index() {
        assert_eq!(chunk_size(60, 8), 4);
        assert_eq!(chunk_size(1, 8), 1);
        assert_eq!(chunk_size(100, 1), 50);
        assert_eq!(chunk_size(7, 0), 4);
    }
}
