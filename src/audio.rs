//! Decode a local audio file into the mono 16 kHz `f32` stream whisper.cpp
//! expects, and recover the total duration for progress normalization.
//!
//! Symphonia handles probing/demuxing/decoding (any container it knows);
//! rubato handles resampling when the source rate is not already 16 kHz.

use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use rubato::{Resampler, SincFixedIn, WindowFunction};
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::CODEC_TYPE_NULL;
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

/// Whisper's expected input sample rate (Hz).
pub const TARGET_SAMPLE_RATE: u32 = 16_000;

/// A fully decoded, normalized audio file.
#[derive(Debug)]
pub struct DecodedAudio {
    /// Mono samples at [`TARGET_SAMPLE_RATE`].
    pub samples: Vec<f32>,
    /// Total duration in seconds, when the container reports enough to
    /// compute it; otherwise derived from the decoded sample count.
    pub duration: Option<f64>,
}

/// Decode `path` to completion.
pub fn decode_audio_file(path: &Path) -> Result<DecodedAudio> {
    let file = File::open(path).with_context(|| format!("cannot open '{}'", path.display()))?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| anyhow!(e))
        .with_context(|| format!("failed to probe '{}'", path.display()))?;

    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL && t.codec_params.sample_rate.is_some())
        .cloned()
        .ok_or_else(|| anyhow!("no decodable audio track in '{}'", path.display()))?;

    let src_rate = track
        .codec_params
        .sample_rate
        .ok_or_else(|| anyhow!("audio track has no sample rate"))?;

    // Container-reported duration, when available.
    let container_duration = track
        .codec_params
        .n_frames
        .map(|frames| frames as f64 / src_rate as f64);

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &Default::default())
        .map_err(|e| anyhow!(e))
        .context("failed to create decoder for audio track")?;

    let mut mono: Vec<f32> = Vec::new();
    let mut sample_buf: Option<SampleBuffer<f32>> = None;

    loop {
        let packet = match format.next_packet() {
            Ok(p) => p,
            // IO errors mark end-of-stream for local files too.
            Err(SymphoniaError::IoError(_)) => break,
            Err(e) => return Err(anyhow!(e)).context("failed reading packet"),
        };

        if packet.track_id() != track.id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(buf) => buf,
            // Skip corrupted frames; decoding can continue.
            Err(SymphoniaError::DecodeError(_)) => continue,
            Err(SymphoniaError::IoError(_)) => break,
            Err(e) => return Err(anyhow!(e)).context("decoder failure"),
        };

        let buf = sample_buf.get_or_insert_with(|| {
            SampleBuffer::<f32>::new(decoded.capacity() as u64, *decoded.spec())
        });
        buf.copy_interleaved_ref(decoded.clone());

        let channels = decoded.spec().channels.count();
        downmix_into(buf.samples(), channels, &mut mono);
    }

    let samples = if src_rate == TARGET_SAMPLE_RATE {
        mono
    } else {
        resample_to_target(&mono, src_rate)?
    };

    let duration =
        container_duration.or_else(|| Some(samples.len() as f64 / TARGET_SAMPLE_RATE as f64));

    Ok(DecodedAudio { samples, duration })
}

/// Downmix interleaved samples into mono by equal-weight channel averaging,
/// appending to `out`.
fn downmix_into(interleaved: &[f32], channels: usize, out: &mut Vec<f32>) {
    if channels <= 1 {
        out.extend_from_slice(interleaved);
        return;
    }

    let frames = interleaved.len() / channels;
    out.reserve(frames);
    for f in 0..frames {
        let base = f * channels;
        let sum: f32 = interleaved[base..base + channels].iter().sum();
        out.push(sum / channels as f32);
    }
}

/// Resample a complete mono buffer to [`TARGET_SAMPLE_RATE`].
///
/// rubato expects fixed-size input blocks; the tail is zero-padded to fill
/// the final block, which adds at most a few milliseconds of silence.
fn resample_to_target(mono: &[f32], src_rate: u32) -> Result<Vec<f32>> {
    if mono.is_empty() {
        return Ok(Vec::new());
    }

    let block_frames = 2048;
    let mut resampler = SincFixedIn::<f32>::new(
        TARGET_SAMPLE_RATE as f64 / src_rate as f64,
        2.0,
        rubato::SincInterpolationParameters {
            sinc_len: 256,
            f_cutoff: 0.95,
            interpolation: rubato::SincInterpolationType::Linear,
            oversampling_factor: 256,
            window: WindowFunction::BlackmanHarris2,
        },
        block_frames,
        1, // mono
    )
    .map_err(|e| anyhow!(e))
    .context("failed to init resampler")?;

    let mut padded = mono.to_vec();
    let rem = padded.len() % block_frames;
    if rem != 0 {
        padded.resize(padded.len() + (block_frames - rem), 0.0);
    }

    let mut out = Vec::with_capacity(
        (padded.len() as f64 * TARGET_SAMPLE_RATE as f64 / src_rate as f64) as usize + block_frames,
    );

    for block in padded.chunks(block_frames) {
        let input = vec![block.to_vec()];
        let resampled = resampler
            .process(&input, None)
            .map_err(|e| anyhow!(e))
            .context("resampler process failed")?;
        out.extend_from_slice(&resampled[0]);
    }

    Ok(out)
}
