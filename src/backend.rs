use std::fmt;
use std::path::Path;

use crate::Result;
use crate::device::{ComputeType, Device};
use crate::opts::DecodeOpts;
use crate::segments::Segment;

/// Run metadata reported by the backend alongside the segment stream.
///
/// Both fields are optional: language detection may be disabled or
/// inconclusive, and some containers do not carry a usable duration.
#[derive(Debug, Clone, Default)]
pub struct RunInfo {
    pub language: Option<String>,
    pub duration: Option<f64>,
}

/// A lazy, pull-based sequence of recognized segments.
///
/// Callers drain it with repeated `next_segment` calls; `Ok(None)` means the
/// stream is exhausted. Segments arrive in recognition order and that order
/// is preserved all the way to the output writers.
pub trait SegmentStream {
    fn next_segment(&mut self) -> Result<Option<Segment>>;
}

/// The speech-recognition capability consumed by the orchestration layer.
///
/// A backend is bound to a model, device, and compute type at load time (see
/// [`BackendLoader`]) and is then reused for every file in the run. Calls are
/// strictly sequential; the handle is never shared across concurrent
/// transcriptions.
pub trait Backend {
    type Stream: SegmentStream;

    /// Start transcribing one audio file.
    ///
    /// Returns the lazy segment stream plus the run metadata, which is read
    /// once up front and attached to the finished result.
    fn transcribe(&mut self, audio: &Path, opts: &DecodeOpts) -> Result<(Self::Stream, RunInfo)>;
}

/// Everything a loader needs to produce a backend instance.
#[derive(Debug, Clone)]
pub struct LoadRequest<'a> {
    /// Model size token or local path.
    pub model: &'a str,
    pub device: Device,
    pub compute: ComputeType,
    /// CPU threads to use; 0 means "let the backend decide".
    pub threads: usize,
}

/// A backend load failure.
///
/// Only the message is carried: the resolver classifies failures by
/// case-insensitive substring matching against it, which is a best-effort
/// heuristic rather than an exhaustive protocol.
#[derive(Debug, Clone)]
pub struct LoadError {
    pub message: String,
}

impl LoadError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for LoadError {}

/// Produces backend instances for a given device/compute-type request.
///
/// The resolver drives this repeatedly while walking its fallback ladder, so
/// `load` must be side-effect free on failure.
pub trait BackendLoader {
    type Backend: Backend;

    fn load(&self, req: &LoadRequest<'_>) -> std::result::Result<Self::Backend, LoadError>;
}
