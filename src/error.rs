use std::path::PathBuf;

use thiserror::Error;

use crate::device::ComputeType;

/// Murmur's crate-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Murmur's crate-wide error type.
///
/// The variants mirror the failure boundaries of a batch run:
/// - `Input` and `BackendUnavailable` abort the whole run.
/// - `TranscriptionFailed` and `OutputWrite` are recovered at the per-file
///   boundary so one bad file never aborts a multi-file batch.
/// - `PrecisionRejected` is a load failure that must never be silently
///   papered over with a substitute compute type.
#[derive(Debug, Error)]
pub enum Error {
    /// No inputs were given, or no matching audio files were found.
    #[error("{0}")]
    Input(String),

    /// Every backend load attempt failed (or the failure was unclassifiable).
    #[error("backend unavailable: {0}")]
    BackendUnavailable(String),

    /// The caller pinned a compute type the backend refuses.
    #[error(
        "compute type '{requested}' was rejected by the backend: {message}. \
         Pick a different --compute-type (for example int8_float32 or float32)."
    )]
    PrecisionRejected {
        requested: ComputeType,
        message: String,
    },

    /// The backend raised while decoding a specific file.
    #[error("transcription failed for '{path}': {message}")]
    TranscriptionFailed { path: PathBuf, message: String },

    /// Writing one of a file's output artifacts failed.
    #[error("failed writing '{path}': {source}")]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{0}")]
    Message(String),
}

impl Error {
    /// An ad-hoc error from a plain message.
    pub fn msg(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Message(format!("{err:#}"))
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Message(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Message(err.to_string())
    }
}
