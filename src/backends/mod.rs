//! Concrete speech backends.

pub mod whisper;
