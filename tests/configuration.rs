//! Request building and validation through the public API. No fixtures needed.

use std::time::Duration;

use framedump::{
    ExecutionMode, ExtractionRequest, FramedumpError, OutputFormat, SamplePlan, frame_file_name,
    index_width,
};

#[test]
fn request_defaults() {
    let request = ExtractionRequest::new("in.mp4", "frames");
    assert_eq!(request.frame_interval(), 1);
    assert_eq!(request.output_format(), OutputFormat::Jpg);
    assert!(!request.compress());
    assert_eq!(request.resize(), None);
    assert_eq!(request.start_time(), Duration::ZERO);
    assert_eq!(request.end_time(), None);
    assert_eq!(request.execution_mode(), ExecutionMode::Sequential);
    assert!(request.validate().is_ok());
}

#[test]
fn parallel_shorthand_uses_default_pool() {
    let request = ExtractionRequest::new("in.mp4", "frames").parallel();
    assert_eq!(
        request.execution_mode(),
        ExecutionMode::Parallel { threads: None }
    );
    assert!(request.execution_mode().is_parallel());
}

#[test]
fn debug_output_omits_progress_callback() {
    let request = ExtractionRequest::new("in.mp4", "frames").with_frame_interval(3);
    let rendered = format!("{request:?}");
    assert!(rendered.contains("frame_interval: 3"), "{rendered}");
    assert!(!rendered.contains("progress"), "{rendered}");
}

#[test]
fn empty_window_is_valid() {
    let request = ExtractionRequest::new("in.mp4", "frames")
        .with_start_time(Duration::from_secs(4))
        .with_end_time(Duration::from_secs(4));
    assert!(request.validate().is_ok());

    let plan = SamplePlan::from_window(
        30.0,
        300,
        Duration::from_secs(4),
        Some(Duration::from_secs(4)),
        1,
    )
    .unwrap();
    assert!(plan.is_empty());
    assert_eq!(plan.last_frame(), None);
}

#[test]
fn window_plan_matches_file_names() {
    let plan = SamplePlan::from_window(
        30.0,
        300,
        Duration::from_secs(2),
        Some(Duration::from_secs(4)),
        1,
    )
    .unwrap();
    assert_eq!(plan.len(), 60);

    let width = index_width(plan.last_frame());
    assert_eq!(width, 4);
    assert_eq!(
        frame_file_name(60, Duration::from_secs(2), OutputFormat::Jpg, width),
        "frame_0060_00-00-02.jpg"
    );
}

#[test]
fn long_videos_widen_the_index() {
    assert_eq!(index_width(Some(123_456)), 6);
    assert_eq!(
        frame_file_name(42, Duration::from_secs(1), OutputFormat::Png, 6),
        "frame_000042_00-00-01.png"
    );
}

#[test]
fn zero_interval_plan_is_rejected() {
    let result = SamplePlan::from_window(30.0, 300, Duration::ZERO, None, 0);
    assert!(matches!(result, Err(FramedumpError::InvalidInterval)));
}
