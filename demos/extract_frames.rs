//! Sample frames from a video into a directory.
//!
//! Usage:
//!   cargo run --example extract_frames -- <input_file> [output_dir]

use std::error::Error;
use std::time::Duration;

use framedump::{ExtractionRequest, FrameExtractor, OutputFormat, VideoSource};

fn main() -> Result<(), Box<dyn Error>> {
    let input_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "input.mp4".to_string());
    let output_dir = std::env::args()
        .nth(2)
        .unwrap_or_else(|| "frames".to_string());

    println!("Opening {input_path}...");
    let metadata = VideoSource::probe(&input_path)?;
    println!(
        "Video: {}x{}, {:.2} fps, {} frames",
        metadata.width, metadata.height, metadata.frames_per_second, metadata.frame_count,
    );

    // One frame per second of video, as JPEG.
    let interval = metadata.frames_per_second.round().max(1.0) as u64;
    let request = ExtractionRequest::new(&input_path, &output_dir).with_frame_interval(interval);
    let report = FrameExtractor::new(request).run()?;
    println!("{report}");

    // The first two seconds at full rate, as lossless PNG.
    let request = ExtractionRequest::new(&input_path, format!("{output_dir}/intro"))
        .with_output_format(OutputFormat::Png)
        .with_end_time(Duration::from_secs(2));
    let report = FrameExtractor::new(request).run()?;
    for file in report.files.iter().take(3) {
        println!("  {}", file.path.display());
    }
    if report.written() > 3 {
        println!("  ... and {} more", report.written() - 3);
    }

    println!("Done!");
    Ok(())
}
