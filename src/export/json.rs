use crate::Result;
use crate::segments::TranscriptionResult;

/// Render the JSON artifact.
///
/// The output is a pretty-printed object with exactly the keys `language`,
/// `duration`, `segments`; every segment field is retained verbatim, with
/// `null` for absent diagnostics. serde_json leaves non-ASCII characters
/// unescaped, which is exactly what we want for transcript text.
pub fn render(result: &TranscriptionResult) -> Result<String> {
    Ok(serde_json::to_string_pretty(result)?)
}
