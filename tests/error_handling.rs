//! Error handling integration tests.
//!
//! Fail-fast errors must leave no trace on disk; the tests that need a real
//! video use fixtures from `tests/fixtures/generate_fixtures.sh`.

use std::path::Path;
use std::time::Duration;

use framedump::{
    ExtractionRequest, FrameExtractor, FramedumpError, OutputFormat, Resolution, VideoSource,
};

fn sample_video_path() -> &'static str {
    "tests/fixtures/sample_video.mp4"
}

#[test]
fn open_nonexistent_file() {
    let result = VideoSource::open("this_file_does_not_exist.mp4");
    let error = result.unwrap_err();
    assert!(matches!(error, FramedumpError::FileOpen { .. }));
    assert!(
        error.to_string().contains("Failed to open video file"),
        "Error message should mention file open failure: {error}",
    );
}

#[test]
fn open_invalid_file() {
    let temporary_directory = tempfile::tempdir().expect("Failed to create temp dir");
    let invalid_file_path = temporary_directory.path().join("invalid.mp4");
    std::fs::write(&invalid_file_path, b"this is not a video file")
        .expect("Failed to write invalid file");

    let result = VideoSource::open(&invalid_file_path);
    assert!(result.is_err(), "Expected error for invalid video file");
}

#[test]
fn unopenable_source_writes_nothing() {
    let temporary_directory = tempfile::tempdir().expect("Failed to create temp dir");
    let output_dir = temporary_directory.path().join("frames");

    let request = ExtractionRequest::new("this_file_does_not_exist.mp4", &output_dir);
    let error = FrameExtractor::new(request).run().unwrap_err();

    assert!(matches!(error, FramedumpError::FileOpen { .. }));
    assert!(!error.is_frame_error());
    assert!(!output_dir.exists(), "Output directory should not be created");
}

#[test]
fn unsupported_format_is_a_configuration_error() {
    let error = "gif".parse::<OutputFormat>().unwrap_err();
    assert!(error.is_configuration_error());
    assert!(error.to_string().contains("jpg, png, bmp"), "{error}");
}

#[test]
fn zero_interval_fails_before_opening() {
    let temporary_directory = tempfile::tempdir().expect("Failed to create temp dir");
    let output_dir = temporary_directory.path().join("frames");

    // The source does not exist either; validation must win.
    let request =
        ExtractionRequest::new("this_file_does_not_exist.mp4", &output_dir).with_frame_interval(0);
    let error = FrameExtractor::new(request).run().unwrap_err();

    assert!(matches!(error, FramedumpError::InvalidInterval));
    assert!(!output_dir.exists());
}

#[test]
fn inverted_window_is_rejected() {
    let request = ExtractionRequest::new("in.mp4", "frames")
        .with_start_time(Duration::from_secs(5))
        .with_end_time(Duration::from_secs(4));
    assert!(matches!(
        request.validate(),
        Err(FramedumpError::InvalidRange { .. })
    ));
}

#[test]
fn zero_resize_is_rejected() {
    let request = ExtractionRequest::new("in.mp4", "frames").with_resize(Resolution::new(0, 240));
    assert!(matches!(
        request.validate(),
        Err(FramedumpError::InvalidResolution(_))
    ));
}

#[test]
fn no_video_stream_error() {
    let path = "tests/fixtures/sample_audio_only.m4a";
    if !Path::new(path).exists() {
        return;
    }

    let error = VideoSource::open(path).unwrap_err();
    assert!(matches!(error, FramedumpError::NoVideoStream), "{error}");
}

#[test]
fn start_past_end_of_video_is_rejected() {
    let path = sample_video_path();
    if !Path::new(path).exists() {
        return;
    }

    let temporary_directory = tempfile::tempdir().expect("Failed to create temp dir");
    let output_dir = temporary_directory.path().join("frames");
    let request =
        ExtractionRequest::new(path, &output_dir).with_start_time(Duration::from_secs(3600));

    let error = FrameExtractor::new(request).run().unwrap_err();
    assert!(matches!(error, FramedumpError::InvalidRange { .. }), "{error}");
    assert!(!output_dir.exists());
}

#[test]
fn reading_past_the_end_is_a_frame_error() {
    let path = sample_video_path();
    if !Path::new(path).exists() {
        return;
    }

    let mut source = VideoSource::open(path).expect("Failed to open test video");
    let error = source.read_frame(999_999).unwrap_err();
    assert!(error.is_frame_error());
    assert!(
        matches!(error, FramedumpError::FrameRead { frame_number: 999_999, .. }),
        "{error}"
    );

    // The handle stays usable after a failed read.
    let frame = source.read_frame(0).expect("Failed to read frame 0");
    assert_eq!(frame.dimensions(), (640, 480));
}
