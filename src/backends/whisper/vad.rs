//! Voice-activity filtering for the whisper backend.
//!
//! Behavior:
//! - Run the silero VAD model to identify speech time ranges.
//! - Zero out everything outside those ranges, keeping the buffer length
//!   intact so segment timestamps stay aligned with the original media.
//! - Report whether any speech was found at all (a fully silent file skips
//!   recognition entirely).

use anyhow::{Result, anyhow};
use whisper_rs::{WhisperVadContext, WhisperVadParams, WhisperVadSegments};

use crate::opts::VAD_MIN_SILENCE_MS;

/// Mute non-speech regions of `samples` in place.
///
/// Returns `false` when the detector found no speech at all.
pub(super) fn mute_non_speech(
    ctx: &mut WhisperVadContext,
    samples: &mut [f32],
    sample_rate: u32,
) -> Result<bool> {
    let mut vad_params = WhisperVadParams::default();
    // Fixed policy: gaps shorter than this are not treated as silence.
    vad_params.set_min_silence_duration(VAD_MIN_SILENCE_MS as i32);

    let segments = ctx.segments_from_samples(vad_params, samples)?;

    let n = segments.num_segments();
    if n == 0 {
        return Ok(false);
    }

    let mut ranges = Vec::with_capacity(n as usize);
    for i in 0..n {
        let (start_cs, end_cs) = segment_timestamps(&segments, i)?;
        ranges.push(sample_range(start_cs, end_cs, sample_rate, samples.len()));
    }

    zero_outside_ranges(samples, &ranges);
    Ok(true)
}

fn segment_timestamps(segments: &WhisperVadSegments, i: i32) -> Result<(f32, f32)> {
    let start_cs = segments
        .get_segment_start_timestamp(i)
        .ok_or_else(|| anyhow!("missing start timestamp for VAD segment {i}"))?;
    let end_cs = segments
        .get_segment_end_timestamp(i)
        .ok_or_else(|| anyhow!("missing end timestamp for VAD segment {i}"))?;
    Ok((start_cs, end_cs))
}

/// Convert a VAD segment (centisecond timestamps) into clamped sample
/// indices. The start is floored and the end ceiled so the boundary samples
/// of a speech region are always kept.
fn sample_range(start_cs: f32, end_cs: f32, sample_rate: u32, len: usize) -> (usize, usize) {
    let rate = sample_rate as f32;
    let start_idx = ((start_cs / 100.0) * rate).floor() as usize;
    let end_idx = ((end_cs / 100.0) * rate).ceil() as usize;

    let start_idx = start_idx.min(len);
    let end_idx = end_idx.min(len).max(start_idx);
    (start_idx, end_idx)
}

/// Zero everything outside the given ranges. Ranges arrive in detection
/// order, which the VAD guarantees is chronological.
fn zero_outside_ranges(samples: &mut [f32], ranges: &[(usize, usize)]) {
    let mut cursor = 0usize;

    for &(start, end) in ranges {
        if start > cursor {
            samples[cursor..start].fill(0.0);
        }
        cursor = cursor.max(end);
    }

    if cursor < samples.len() {
        samples[cursor..].fill(0.0);
    }
}
