use std::{path::PathBuf, sync::Arc};

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use colored::Colorize;
use framedump::{
    ExecutionMode, ExtractionRequest, FfmpegLogLevel, FrameExtractor, OutputFormat,
    ProgressCallback, ProgressInfo, Resolution, VideoSource, parse_time, validate_source,
};
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::json;

const CLI_AFTER_HELP: &str = "Examples:\n  framedump extract input.mp4 --out frames --every 30\n  framedump extract input.mp4 --out frames --format png --compress --resize 320x240 --start 0:02 --end 0:04 --parallel --progress\n  framedump info input.mp4 --json\n  framedump completions zsh > _framedump";

#[derive(Debug, Parser)]
#[command(
    name = "framedump",
    version,
    about = "Sample frames from a video and write them to disk as images",
    after_help = CLI_AFTER_HELP
)]
struct Cli {
    #[command(flatten)]
    global: GlobalOptions,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Parser, Clone)]
struct GlobalOptions {
    /// Log progress information (overridden by RUST_LOG).
    #[arg(long, global = true)]
    verbose: bool,

    /// FFmpeg log level (quiet, fatal, error, warning, info, debug).
    #[arg(long, global = true, default_value = "error")]
    ffmpeg_log_level: String,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Extract sampled frames into a directory.
    #[command(
        about = "Extract video frames",
        after_help = "Times accept seconds (2.5), MM:SS or HH:MM:SS(.fff).\n\nExamples:\n  framedump extract input.mp4 --out frames --every 10 --format jpg\n  framedump extract input.mp4 --out frames --start 00:00:10 --end 00:00:20 --parallel --threads 4"
    )]
    Extract {
        /// Input video path.
        input: PathBuf,
        /// Output directory (created if absent).
        #[arg(long)]
        out: PathBuf,
        /// Extract every Nth frame.
        #[arg(long, default_value_t = 1)]
        every: u64,
        /// Output image format: jpg | png | bmp.
        #[arg(long, default_value = "jpg")]
        format: String,
        /// Recompress frames (JPEG quality 50, PNG best compression).
        #[arg(long)]
        compress: bool,
        /// Scale frames to exactly WIDTHxHEIGHT.
        #[arg(long)]
        resize: Option<String>,
        /// Start of the sampled window.
        #[arg(long)]
        start: Option<String>,
        /// End of the sampled window (exclusive, defaults to the end of the video).
        #[arg(long)]
        end: Option<String>,
        /// Decode frames on a pool of worker threads.
        #[arg(long)]
        parallel: bool,
        /// Worker thread count for --parallel (defaults to one per CPU).
        #[arg(long, requires = "parallel")]
        threads: Option<usize>,
        /// Show a progress bar.
        #[arg(long)]
        progress: bool,
        /// Print the extraction report as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Print video metadata and validation findings.
    #[command(about = "Print video metadata", visible_alias = "probe")]
    Info {
        /// Input video path.
        input: PathBuf,
        /// Output metadata as machine-readable JSON.
        #[arg(long)]
        json: bool,
    },

    /// Generate shell completion scripts.
    #[command(about = "Generate shell completions")]
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Drives an indicatif bar from extraction progress.
struct TerminalProgress {
    bar: ProgressBar,
}

impl TerminalProgress {
    fn new() -> Result<Self, Box<dyn std::error::Error>> {
        let bar = ProgressBar::new(0);
        let style =
            ProgressStyle::with_template("{spinner:.green} {bar:40.cyan/blue} {pos}/{len} {msg}")?;
        bar.set_style(style.progress_chars("##-"));
        Ok(Self { bar })
    }
}

impl ProgressCallback for TerminalProgress {
    fn on_progress(&self, info: &ProgressInfo) {
        self.bar.set_length(info.total);
        self.bar.set_position(info.current);
        match info.current_frame {
            Some(frame_number) => self.bar.set_message(format!("frame {frame_number}")),
            None => self.bar.finish_with_message("done"),
        }
    }
}

fn init_logging(global: &GlobalOptions) -> Result<(), Box<dyn std::error::Error>> {
    let default_filter = if global.verbose { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_target(false)
        .init();

    let level: FfmpegLogLevel = global.ffmpeg_log_level.parse()?;
    framedump::set_ffmpeg_log_level(level);
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn build_request(
    input: PathBuf,
    out: PathBuf,
    every: u64,
    format: &str,
    compress: bool,
    resize: Option<&str>,
    start: Option<&str>,
    end: Option<&str>,
    execution_mode: ExecutionMode,
) -> Result<ExtractionRequest, framedump::FramedumpError> {
    let mut request = ExtractionRequest::new(input, out)
        .with_frame_interval(every)
        .with_output_format(format.parse::<OutputFormat>()?)
        .with_compression(compress)
        .with_execution_mode(execution_mode);

    if let Some(resize) = resize {
        request = request.with_resize(resize.parse::<Resolution>()?);
    }
    if let Some(start) = start {
        request = request.with_start_time(parse_time(start)?);
    }
    if let Some(end) = end {
        request = request.with_end_time(parse_time(end)?);
    }

    Ok(request)
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(&cli.global)?;

    match cli.command {
        Commands::Extract {
            input,
            out,
            every,
            format,
            compress,
            resize,
            start,
            end,
            parallel,
            threads,
            progress,
            json,
        } => {
            let execution_mode = if parallel {
                ExecutionMode::Parallel { threads }
            } else {
                ExecutionMode::Sequential
            };

            let mut request = build_request(
                input,
                out.clone(),
                every,
                &format,
                compress,
                resize.as_deref(),
                start.as_deref(),
                end.as_deref(),
                execution_mode,
            )?;

            if progress {
                request = request.with_progress(Arc::new(TerminalProgress::new()?));
            }

            let report = FrameExtractor::new(request).run()?;

            if json {
                println!("{}", serde_json::to_string_pretty(&report.to_json())?);
                return Ok(());
            }

            for failure in &report.failures {
                eprintln!(
                    "{} {}",
                    "warning:".yellow().bold(),
                    failure.error.to_string().yellow()
                );
            }

            let summary = format!("{report} -> {}", out.display());
            if report.is_complete() {
                println!("{} {}", "success:".green().bold(), summary.green());
            } else {
                println!("{} {}", "partial:".yellow().bold(), summary.yellow());
            }
        }
        Commands::Info { input, json } => {
            let metadata = VideoSource::probe(&input)?;
            let report = validate_source(&metadata);
            if json {
                let payload = json!({
                    "path": input.display().to_string(),
                    "format": metadata.format,
                    "codec": metadata.codec,
                    "width": metadata.width,
                    "height": metadata.height,
                    "fps": metadata.frames_per_second,
                    "frame_count": metadata.frame_count,
                    "duration_seconds": metadata.duration.as_secs_f64(),
                    "warnings": report.warnings,
                    "errors": report.errors,
                });
                println!("{}", serde_json::to_string_pretty(&payload)?);
            } else {
                println!("File: {}", input.display());
                println!("Format: {}", metadata.format);
                println!(
                    "Video: {}x{} @ {:.3} fps [{}]",
                    metadata.width, metadata.height, metadata.frames_per_second, metadata.codec,
                );
                println!(
                    "Frames: {} ({:.2}s)",
                    metadata.frame_count,
                    metadata.duration.as_secs_f64()
                );
                print!("{report}");
            }
        }
        Commands::Completions { shell } => {
            let mut command = Cli::command();
            clap_complete::generate(shell, &mut command, "framedump", &mut std::io::stdout());
        }
    }

    Ok(())
}

fn main() {
    if let Err(error) = run() {
        eprintln!("{} {error}", "error:".red().bold());
        std::process::exit(1);
    }
}
