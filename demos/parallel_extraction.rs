//! Compare sequential and parallel extraction (feature = "rayon").
//!
//! Usage:
//!   cargo run --example parallel_extraction -- <input_file>

use std::error::Error;

use framedump::{ExecutionMode, ExtractionRequest, FrameExtractor, Resolution};

fn main() -> Result<(), Box<dyn Error>> {
    let input_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "input.mp4".to_string());

    let temporary = std::env::temp_dir().join("framedump-parallel-demo");

    for (label, mode) in [
        ("sequential", ExecutionMode::Sequential),
        ("parallel", ExecutionMode::Parallel { threads: None }),
    ] {
        let output_dir = temporary.join(label);
        let request = ExtractionRequest::new(&input_path, &output_dir)
            .with_frame_interval(5)
            .with_resize(Resolution::new(320, 180))
            .with_execution_mode(mode);

        println!("Extracting every 5th frame ({label})...");
        let report = FrameExtractor::new(request).run()?;
        println!(
            "  {} frames in {:.2?} ({:.1} fps)",
            report.written(),
            report.elapsed,
            report.written() as f64 / report.elapsed.as_secs_f64().max(f64::EPSILON),
        );
    }

    std::fs::remove_dir_all(&temporary)?;
    println!("Done!");
    Ok(())
}
