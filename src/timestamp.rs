/// Which subtitle convention a timestamp is rendered for.
///
/// The only behavioral difference is the milliseconds separator:
/// SRT uses `,`, WebVTT uses `.`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimestampStyle {
    Srt,
    Vtt,
}

impl TimestampStyle {
    fn millis_separator(self) -> char {
        match self {
            TimestampStyle::Srt => ',',
            TimestampStyle::Vtt => '.',
        }
    }
}

/// Format a seconds value as a fixed-width clock string (`HH:MM:SS,mmm` or
/// `HH:MM:SS.mmm`).
///
/// Malformed timing must never abort output generation, so NaN and ±Infinity
/// are treated as 0.0. Rounding is to the nearest millisecond; hours are
/// unbounded (two digits minimum, no wraparound).
pub fn format_timestamp(seconds: f64, style: TimestampStyle) -> String {
    let seconds = if seconds.is_finite() { seconds } else { 0.0 };

    // Negative input is clamped rather than wrapped; the float-to-int cast
    // below also saturates, this just makes the intent explicit.
    let total_ms = (seconds.max(0.0) * 1000.0).round() as u64;

    let ms = total_ms % 1000;
    let total_s = total_ms / 1000;
    let s = total_s % 60;
    let total_m = total_s / 60;
    let m = total_m % 60;
    let h = total_m / 60;

    let sep = style.millis_separator();
    format!("{h:02}:{m:02}:{s:02}{sep}{ms:03}")
}
