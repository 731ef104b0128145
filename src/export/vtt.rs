use std::fmt::Write as _;

use crate::segments::TranscriptionResult;
use crate::timestamp::{TimestampStyle, format_timestamp};

/// Render the WebVTT artifact.
///
/// WebVTT files begin with a mandatory `WEBVTT` header line followed by a
/// blank line; cues carry no index numbers, just the timestamp range and the
/// trimmed text, blank-line separated.
pub fn render(result: &TranscriptionResult) -> String {
    let mut out = String::from("WEBVTT\n\n");

    for seg in &result.segments {
        let start = format_timestamp(seg.start, TimestampStyle::Vtt);
        let end = format_timestamp(seg.end, TimestampStyle::Vtt);
        let _ = writeln!(out, "{start} --> {end}");
        let _ = writeln!(out, "{}", seg.trimmed_text());
        out.push('\n');
    }

    out
}
