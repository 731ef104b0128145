//! `murmur` — transcribe local audio files into text, SRT, WebVTT, and JSON
//! artifacts.
//!
//! Exit codes:
//! - 1: no inputs, no matching audio files, output directory not creatable,
//!      or the backend could not be loaded after exhausting fallbacks.
//! - 0: otherwise, even when individual files failed (per-file failures are
//!      reported and the batch continues).

use std::fs;
use std::path::PathBuf;
use std::process;
use std::time::Instant;

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};

use murmur::backends::whisper::WhisperLoader;
use murmur::device::{ComputeType, Device};
use murmur::error::Error;
use murmur::export::{self, OutputFormat, WriteOutcome};
use murmur::inputs::collect_audio_files;
use murmur::opts::{DecodeOpts, Task};
use murmur::progress::ProgressAggregator;
use murmur::resolver::{self, AcquireRequest};
use murmur::runner::transcribe_one;

#[derive(Parser, Debug)]
#[command(name = "murmur")]
#[command(about = "Transcribe local audio files into time-aligned transcripts")]
struct Args {
    /// Audio files, directories, or glob patterns.
    inputs: Vec<String>,

    /// Directory to write outputs.
    #[arg(long, default_value = "transcripts")]
    out_dir: PathBuf,

    /// Model size token (tiny/base/small/medium/large-v3) or a path to a
    /// ggml model file.
    #[arg(long, default_value = "small")]
    model: String,

    /// Directory where model size tokens resolve to ggml-<token>.bin.
    #[arg(long, default_value = "models")]
    model_dir: PathBuf,

    /// Silero VAD model used when voice-activity filtering is enabled.
    #[arg(long, default_value = "models/ggml-silero-v5.1.2.bin")]
    vad_model: PathBuf,

    /// Inference device.
    #[arg(long, value_enum, default_value_t = Device::host_default())]
    device: Device,

    /// Compute type override. When set, no substitute is ever tried.
    #[arg(long, value_enum)]
    compute_type: Option<ComputeType>,

    /// Spoken language (auto-detect if omitted).
    #[arg(long)]
    language: Option<String>,

    #[arg(long, value_enum, default_value = "transcribe")]
    task: Task,

    /// Beam size for decoding.
    #[arg(long, default_value_t = 5, value_parser = clap::value_parser!(u16).range(1..))]
    beam_size: u16,

    /// Enable voice-activity filtering (default).
    #[arg(long = "vad", overrides_with = "no_vad")]
    vad: bool,

    /// Disable voice-activity filtering.
    #[arg(long = "no-vad")]
    no_vad: bool,

    /// CPU threads (0 = auto).
    #[arg(long, default_value_t = 0)]
    threads: usize,

    /// Output format.
    #[arg(long, value_enum, default_value = "all")]
    format: OutputFormat,

    /// Overwrite existing outputs (default).
    #[arg(long = "overwrite", overrides_with = "no_overwrite")]
    overwrite: bool,

    /// Keep existing outputs untouched.
    #[arg(long = "no-overwrite")]
    no_overwrite: bool,
}

fn main() {
    murmur::logging::init();

    let args = Args::parse();
    if let Err(err) = run(args) {
        eprintln!("error: {err}");
        process::exit(1);
    }
}

/// Returns `Err` only for run-fatal conditions; per-file failures are
/// reported inline and the batch continues.
fn run(args: Args) -> murmur::Result<()> {
    let files = collect_audio_files(&args.inputs)?;

    fs::create_dir_all(&args.out_dir).map_err(|e| {
        Error::Input(format!(
            "cannot create output directory '{}': {e}",
            args.out_dir.display()
        ))
    })?;

    let vad_filter = !args.no_vad;
    let overwrite = !args.no_overwrite;

    let loader = WhisperLoader {
        model_dir: args.model_dir.clone(),
        vad_model: vad_filter.then(|| args.vad_model.clone()),
    };

    let request = AcquireRequest {
        model: args.model.clone(),
        device: args.device,
        compute: args.compute_type,
        threads: args.threads,
    };

    println!(
        "Loading model: {} (device={}, compute_type={})",
        request.model,
        request.device,
        request
            .compute
            .unwrap_or_else(|| ComputeType::default_for(request.device)),
    );

    let t0 = Instant::now();
    let (mut backend, effective_compute) = resolver::acquire(&loader, &request)?;
    println!(
        "Model loaded in {:.2}s (compute_type={}). Processing {} file(s)...",
        t0.elapsed().as_secs_f64(),
        effective_compute,
        files.len()
    );

    let opts = DecodeOpts {
        language: args.language.clone(),
        task: args.task,
        beam_size: args.beam_size as usize,
        vad_filter,
    };

    for audio_path in &files {
        let name = audio_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| audio_path.display().to_string());

        // The indicator is finalized (forced to 100% and cleared) when this
        // guard drops, on the success and failure paths alike.
        let mut progress = FileProgress::new(name.clone());

        let result = transcribe_one(&mut backend, audio_path, &opts, |end, total| {
            progress.on_segment_end(end, total);
        });
        drop(progress);

        let result = match result {
            Ok(result) => result,
            Err(err) => {
                eprintln!("error: {err}");
                continue;
            }
        };

        let stem = audio_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| name.clone());

        match export::write_outputs(&args.out_dir, &stem, &result, args.format, overwrite) {
            Ok(reports) => {
                let written: Vec<String> = reports
                    .iter()
                    .filter(|r| r.outcome == WriteOutcome::Written)
                    .filter_map(|r| r.path.file_name())
                    .map(|n| n.to_string_lossy().into_owned())
                    .collect();

                if written.is_empty() {
                    println!("Skipped {name} (already exists, use --overwrite)");
                } else {
                    println!("Done {name} -> {}", written.join(", "));
                }
            }
            Err(err) => {
                // Earlier formats for this file may already be on disk.
                eprintln!("error: {err}");
            }
        }
    }

    Ok(())
}

/// Per-file progress indicator, created lazily on the first usable progress
/// signal and guaranteed finalized when dropped.
struct FileProgress {
    name: String,
    agg: ProgressAggregator,
    bar: Option<ProgressBar>,
}

/// Bar positions are milliseconds of audio so fractional seconds still move
/// the bar.
const MILLIS_PER_SECOND: f64 = 1000.0;

impl FileProgress {
    fn new(name: String) -> Self {
        Self {
            name,
            agg: ProgressAggregator::new(),
            bar: None,
        }
    }

    fn on_segment_end(&mut self, end_seconds: f64, total_seconds: Option<f64>) {
        let Some(update) = self.agg.on_segment_end(end_seconds, total_seconds) else {
            return;
        };

        let bar = self.bar.get_or_insert_with(|| {
            let bar = ProgressBar::new((update.total * MILLIS_PER_SECOND) as u64);
            bar.set_style(
                ProgressStyle::with_template("{msg} {bar:40.cyan/blue} {percent:>3}% {eta}")
                    .expect("static progress template is valid")
                    .progress_chars("#>-"),
            );
            bar.set_message(self.name.clone());
            bar
        });

        bar.set_position((update.completed * MILLIS_PER_SECOND) as u64);
    }
}

impl Drop for FileProgress {
    fn drop(&mut self) {
        if let Some(bar) = self.bar.take() {
            // Force 100%: trailing silence or duration mismatches must not
            // leave a finished file looking incomplete.
            if let Some(len) = bar.length() {
                bar.set_position(len);
            }
            bar.finish_and_clear();
        }
    }
}
