use serde::{Deserialize, Serialize};

/// One recognized utterance.
///
/// Times are seconds. The upstream model guarantees `0 <= start <= end` and
/// non-decreasing start order, but nothing here enforces reordering: arrival
/// order is preserved all the way into the output artifacts. Empty text is
/// legal and serialized as an empty line rather than discarded.
///
/// The three trailing fields are diagnostic scalars that some backends do
/// not report; they serialize as `null` when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub id: i64,
    pub start: f64,
    pub end: f64,
    pub text: String,
    pub avg_logprob: Option<f64>,
    pub no_speech_prob: Option<f64>,
    pub temperature: Option<f64>,
}

impl Segment {
    /// Segment text with surrounding whitespace removed, as the subtitle and
    /// plain-text writers render it.
    pub fn trimmed_text(&self) -> &str {
        self.text.trim()
    }
}

/// One file's finished transcription.
///
/// Field order matters for the JSON artifact: the object is emitted with
/// exactly the keys `language`, `duration`, `segments`, in that order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptionResult {
    pub language: Option<String>,
    pub duration: Option<f64>,
    pub segments: Vec<Segment>,
}
