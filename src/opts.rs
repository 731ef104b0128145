use clap::ValueEnum;

/// What the model should do with recognized speech.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Task {
    /// Transcribe speech verbatim in the spoken language.
    Transcribe,
    /// Translate speech to English.
    Translate,
}

/// Fixed minimum-silence duration applied whenever voice-activity filtering
/// is enabled. Deliberately not user-tunable.
pub const VAD_MIN_SILENCE_MS: u32 = 500;

/// Options that control how one file is decoded.
///
/// This is library-level configuration; the CLI maps user flags into it so
/// other frontends (tests, batch jobs) can construct it programmatically.
/// Word-level timestamps are never requested: only segment-level timing is
/// consumed downstream, so there is no knob for them here.
#[derive(Debug, Clone)]
pub struct DecodeOpts {
    /// Spoken language hint (e.g. `"en"`). `None` lets the model auto-detect.
    pub language: Option<String>,

    pub task: Task,

    /// Beam size for decoding. Must be positive.
    pub beam_size: usize,

    /// Whether to apply voice-activity filtering before recognition.
    /// When enabled, [`VAD_MIN_SILENCE_MS`] is always applied.
    pub vad_filter: bool,
}

impl Default for DecodeOpts {
    fn default() -> Self {
        Self {
            language: None,
            task: Task::Transcribe,
            beam_size: 5,
            vad_filter: true,
        }
    }
}
