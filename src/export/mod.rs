//! Output writers that serialize a [`TranscriptionResult`] into file
//! artifacts.
//!
//! Each format is an independent, pure `render` function plus a shared
//! write-to-path wrapper that applies the overwrite policy. Writers never
//! read existing file contents; they only check existence. With overwrite
//! disabled and the target present, the write is skipped with no I/O at all.

use std::fs;
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use tracing::debug;

use crate::error::{Error, Result};
use crate::segments::TranscriptionResult;

pub mod json;
pub mod srt;
pub mod txt;
pub mod vtt;

/// The output formats selectable from the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Txt,
    Srt,
    Vtt,
    Json,
    /// Write every format.
    All,
}

impl OutputFormat {
    /// The concrete formats this selection expands to.
    pub fn expanded(self) -> &'static [OutputFormat] {
        match self {
            OutputFormat::Txt => &[OutputFormat::Txt],
            OutputFormat::Srt => &[OutputFormat::Srt],
            OutputFormat::Vtt => &[OutputFormat::Vtt],
            OutputFormat::Json => &[OutputFormat::Json],
            OutputFormat::All => &[
                OutputFormat::Txt,
                OutputFormat::Srt,
                OutputFormat::Vtt,
                OutputFormat::Json,
            ],
        }
    }

    fn extension(self) -> &'static str {
        match self {
            OutputFormat::Txt => "txt",
            OutputFormat::Srt => "srt",
            OutputFormat::Vtt => "vtt",
            OutputFormat::Json => "json",
            OutputFormat::All => unreachable!("All is expanded before rendering"),
        }
    }

    fn render(self, result: &TranscriptionResult) -> Result<String> {
        Ok(match self {
            OutputFormat::Txt => txt::render(result),
            OutputFormat::Srt => srt::render(result),
            OutputFormat::Vtt => vtt::render(result),
            OutputFormat::Json => json::render(result)?,
            OutputFormat::All => unreachable!("All is expanded before rendering"),
        })
    }
}

/// Whether an artifact was actually written or skipped by overwrite policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Written,
    Skipped,
}

/// One artifact's write report.
#[derive(Debug, Clone)]
pub struct ArtifactReport {
    pub path: PathBuf,
    pub outcome: WriteOutcome,
}

/// Write one format's artifact for `stem` into `out_dir`.
pub fn write_one(
    out_dir: &Path,
    stem: &str,
    result: &TranscriptionResult,
    format: OutputFormat,
    overwrite: bool,
) -> Result<ArtifactReport> {
    let path = out_dir.join(format!("{stem}.{}", format.extension()));

    if !overwrite && path.exists() {
        debug!(path = %path.display(), "output exists, skipping");
        return Ok(ArtifactReport {
            path,
            outcome: WriteOutcome::Skipped,
        });
    }

    let rendered = format.render(result)?;
    fs::write(&path, rendered).map_err(|source| Error::OutputWrite {
        path: path.clone(),
        source,
    })?;

    Ok(ArtifactReport {
        path,
        outcome: WriteOutcome::Written,
    })
}

/// Write every artifact the format selection expands to, in a fixed order.
///
/// Fails on the first write error; earlier artifacts may already be on disk,
/// which the caller reports as a partial write for that file.
pub fn write_outputs(
    out_dir: &Path,
    stem: &str,
    result: &TranscriptionResult,
    format: OutputFormat,
    overwrite: bool,
) -> Result<Vec<ArtifactReport>> {
    let mut reports = Vec::new();
    for &f in format.expanded() {
        reports.push(write_one(out_dir, stem, result, f, overwrite)?);
    }
    Ok(reports)
}
