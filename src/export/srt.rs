use std::fmt::Write as _;

use crate::segments::TranscriptionResult;
use crate::timestamp::{TimestampStyle, format_timestamp};

/// Render the SRT artifact.
///
/// Cues are re-numbered positionally 1..N (the sequence index is not the
/// segment's `id`), and every cue, including the last, is followed by a
/// blank separator line.
pub fn render(result: &TranscriptionResult) -> String {
    let mut out = String::new();

    for (i, seg) in result.segments.iter().enumerate() {
        let start = format_timestamp(seg.start, TimestampStyle::Srt);
        let end = format_timestamp(seg.end, TimestampStyle::Srt);
        let _ = writeln!(out, "{}", i + 1);
        let _ = writeln!(out, "{start} --> {end}");
        let _ = writeln!(out, "{}", seg.trimmed_text());
        out.push('\n');
    }

    out
}
