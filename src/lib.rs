//! `murmur` — batch transcription of local audio files into time-aligned transcripts.
//!
//! This crate provides:
//! - Backend acquisition with device/compute-type fallback
//! - A pull-based segment stream abstraction over the speech backend
//! - Monotonic progress aggregation for lazy recognition streams
//! - Output writers for plain text, SRT, WebVTT, and JSON artifacts
//!
//! The library is designed to be driven by the `murmur` CLI, but every piece is
//! constructible programmatically so tests and other frontends can reuse it.

// Crate-wide error taxonomy.
pub mod error;

// Hardware device / compute-type selection.
pub mod device;

// Backend capability seams (loader + lazy segment stream).
pub mod backend;

// Backend acquisition with the fallback state machine.
pub mod resolver;

// Segment data model and transcription results.
pub mod segments;

// Timestamp rendering shared by the subtitle writers.
pub mod timestamp;

// Output writers that serialize a transcription into file artifacts.
pub mod export;

// Progress aggregation for lazy recognition streams.
pub mod progress;

// Per-file transcription orchestration.
pub mod runner;

// Input discovery (files, directories, globs).
pub mod inputs;

// Transcription options handed to the backend.
pub mod opts;

// Audio decoding to the mono 16 kHz stream whisper.cpp expects.
pub mod audio;

// Concrete speech backends.
pub mod backends;

// Logging configuration.
pub mod logging;

pub use error::{Error, Result};
