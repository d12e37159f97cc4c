//! Benchmarks for frame decoding and extraction.
//!
//! Run with: cargo bench
//!
//! Requires fixture files from `tests/fixtures/generate_fixtures.sh`.

use std::path::Path;

use criterion::Criterion;
use framedump::{
    ExtractionRequest, FfmpegLogLevel, FrameExtractor, OutputFormat, Resolution, VideoSource,
};

const SAMPLE_VIDEO: &str = "tests/fixtures/sample_video.mp4";

fn fixture_available() -> bool {
    framedump::set_ffmpeg_log_level(FfmpegLogLevel::Error);
    if Path::new(SAMPLE_VIDEO).exists() {
        return true;
    }
    eprintln!("Skipping benchmark: fixture not found");
    false
}

fn run_extraction(request: ExtractionRequest) {
    let report = FrameExtractor::new(request).run().unwrap();
    assert!(report.is_complete());
}

fn benchmark_frame_reads(criterion: &mut Criterion) {
    if !fixture_available() {
        return;
    }

    criterion.bench_function("read single frame (open + decode)", |bencher| {
        bencher.iter(|| {
            let mut source = VideoSource::open(SAMPLE_VIDEO).unwrap();
            let _frame = source.read_frame(0).unwrap();
        });
    });

    criterion.bench_function("read single frame (mid-video seek)", |bencher| {
        bencher.iter(|| {
            let mut source = VideoSource::open(SAMPLE_VIDEO).unwrap();
            let _frame = source.read_frame(150).unwrap();
        });
    });

    criterion.bench_function("read 10 consecutive frames", |bencher| {
        bencher.iter(|| {
            let mut source = VideoSource::open(SAMPLE_VIDEO).unwrap();
            for frame_number in 0..10 {
                let _frame = source.read_frame(frame_number).unwrap();
            }
        });
    });
}

fn benchmark_formats(criterion: &mut Criterion) {
    if !fixture_available() {
        return;
    }

    let mut group = criterion.benchmark_group("output format");
    group.sample_size(10);

    for format in OutputFormat::ALL {
        for compress in [false, true] {
            let label = format!("{format}{}", if compress { " compressed" } else { "" });
            group.bench_function(label, |bencher| {
                bencher.iter(|| {
                    let directory = tempfile::tempdir().unwrap();
                    run_extraction(
                        ExtractionRequest::new(SAMPLE_VIDEO, directory.path())
                            .with_frame_interval(30)
                            .with_output_format(format)
                            .with_compression(compress),
                    );
                });
            });
        }
    }

    group.finish();
}

#[cfg(feature = "rayon")]
fn benchmark_parallel(criterion: &mut Criterion) {
    use framedump::ExecutionMode;

    if !fixture_available() {
        return;
    }

    let mut group = criterion.benchmark_group("execution mode");
    group.sample_size(10);

    for (label, mode) in [
        ("sequential", ExecutionMode::Sequential),
        ("parallel", ExecutionMode::Parallel { threads: None }),
        ("parallel (2 threads)", ExecutionMode::Parallel { threads: Some(2) }),
    ] {
        group.bench_function(label, |bencher| {
            bencher.iter(|| {
                let directory = tempfile::tempdir().unwrap();
                run_extraction(
                    ExtractionRequest::new(SAMPLE_VIDEO, directory.path())
                        .with_frame_interval(3)
                        .with_resize(Resolution::new(320, 240))
                        .with_execution_mode(mode),
                );
            });
        });
    }

    group.finish();
}

#[cfg(not(feature = "rayon"))]
fn benchmark_parallel(_criterion: &mut Criterion) {}

criterion::criterion_group!(
    benches,
    benchmark_frame_reads,
    benchmark_formats,
    benchmark_parallel,
);
criterion::criterion_main!(benches);
