//! Built-in backend powered by `whisper-rs` / `whisper.cpp`.
//!
//! The loader maps murmur's device/compute-type vocabulary onto what a
//! whisper.cpp build can actually deliver and reports refusals in error text
//! the resolver's classifier understands. The backend decodes the audio
//! itself (whisper.cpp consumes raw samples, not container files), optionally
//! applies voice-activity filtering, runs one full recognition pass, and
//! exposes the recognized segments as a pull-based stream.

use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::{debug, warn};
use whisper_rs::{
    FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters, WhisperSegment,
    WhisperState, WhisperVadContext, WhisperVadContextParams,
};

use crate::audio::{TARGET_SAMPLE_RATE, decode_audio_file};
use crate::backend::{Backend, BackendLoader, LoadError, LoadRequest, RunInfo, SegmentStream};
use crate::device::{ComputeType, Device};
use crate::error::Result;
use crate::opts::{DecodeOpts, Task};
use crate::segments::Segment;

mod logging;
mod vad;

use logging::init_whisper_logging;

/// Loads [`WhisperBackend`] instances from local ggml model files.
#[derive(Debug, Clone)]
pub struct WhisperLoader {
    /// Directory where model size tokens resolve to `ggml-<token>.bin`.
    pub model_dir: PathBuf,
    /// Optional silero VAD model. Voice-activity filtering is skipped with a
    /// warning when this is absent.
    pub vad_model: Option<PathBuf>,
}

impl BackendLoader for WhisperLoader {
    type Backend = WhisperBackend;

    fn load(&self, req: &LoadRequest<'_>) -> std::result::Result<WhisperBackend, LoadError> {
        // Keep whisper.cpp quiet before the first context is created.
        init_whisper_logging();

        check_device_support(req.device)?;
        check_compute_support(req.compute)?;

        let model_path = self.resolve_model_path(req.model)?;

        let mut ctx_params = WhisperContextParameters::default();
        ctx_params.use_gpu(!matches!(req.device, Device::Cpu));

        let model_str = model_path.to_string_lossy();
        let ctx = WhisperContext::new_with_params(&model_str, ctx_params).map_err(|e| {
            LoadError::new(format!(
                "failed to load model from '{}': {e}",
                model_path.display()
            ))
        })?;

        let vad_ctx = match &self.vad_model {
            Some(path) if path.is_file() => {
                let vad_ctx =
                    WhisperVadContext::new(&path.to_string_lossy(), WhisperVadContextParams::default())
                        .map_err(|e| {
                            LoadError::new(format!(
                                "failed to load VAD model from '{}': {e}",
                                path.display()
                            ))
                        })?;
                Some(vad_ctx)
            }
            Some(path) => {
                warn!(
                    path = %path.display(),
                    "VAD model not found; voice-activity filtering will be skipped"
                );
                None
            }
            None => None,
        };

        Ok(WhisperBackend {
            ctx,
            vad_ctx,
            threads: req.threads,
        })
    }
}

impl WhisperLoader {
    /// Resolve a model size token or direct path to a ggml file on disk.
    ///
    /// Murmur never fetches models over the network; a missing file is a
    /// fatal load failure with download guidance.
    fn resolve_model_path(&self, model: &str) -> std::result::Result<PathBuf, LoadError> {
        let direct = Path::new(model);
        if direct.is_file() {
            return Ok(direct.to_path_buf());
        }

        let named = self.model_dir.join(format!("ggml-{model}.bin"));
        if named.is_file() {
            return Ok(named);
        }

        Err(LoadError::new(format!(
            "model '{model}' not found (looked for '{}'); download a ggml model there first",
            named.display()
        )))
    }
}

/// Refuse accelerator devices this build was not compiled for.
///
/// The message deliberately contains "unsupported device" so the resolver
/// classifies it and falls back to `auto`.
fn check_device_support(device: Device) -> std::result::Result<(), LoadError> {
    let supported = match device {
        Device::Auto | Device::Cpu => true,
        Device::Cuda => cfg!(feature = "cuda"),
        Device::Metal => cfg!(feature = "metal"),
    };

    if supported {
        Ok(())
    } else {
        Err(LoadError::new(format!(
            "unsupported device: {device} (this build was compiled without the '{device}' feature)"
        )))
    }
}

/// Refuse compute types whisper.cpp has no runtime switch for.
///
/// ggml bakes quantization into the model file, so the int8 mixes cannot be
/// selected at load time; float16/float32 requests are honored by the model
/// weights themselves.
fn check_compute_support(compute: ComputeType) -> std::result::Result<(), LoadError> {
    match compute {
        ComputeType::Float16 | ComputeType::Float32 => Ok(()),
        other => Err(LoadError::new(format!(
            "compute type {} is not supported by the whisper backend \
             (quantization is baked into ggml model files)",
            other.as_str()
        ))),
    }
}

/// One loaded whisper.cpp model plus optional VAD model.
pub struct WhisperBackend {
    ctx: WhisperContext,
    vad_ctx: Option<WhisperVadContext>,
    threads: usize,
}

/// Pull-based view over one finished recognition pass.
///
/// whisper.cpp computes a full pass before any segment is available, so the
/// laziness here is in the consumption contract, not the computation.
pub struct WhisperSegmentStream {
    inner: std::vec::IntoIter<Segment>,
}

impl SegmentStream for WhisperSegmentStream {
    fn next_segment(&mut self) -> Result<Option<Segment>> {
        Ok(self.inner.next())
    }
}

impl Backend for WhisperBackend {
    type Stream = WhisperSegmentStream;

    fn transcribe(&mut self, audio: &Path, opts: &DecodeOpts) -> Result<(Self::Stream, RunInfo)> {
        let decoded = decode_audio_file(audio)?;
        let mut samples = decoded.samples;
        let duration = decoded.duration;

        if opts.vad_filter {
            match self.vad_ctx.as_mut() {
                Some(vad_ctx) => {
                    let found_speech =
                        vad::mute_non_speech(vad_ctx, &mut samples, TARGET_SAMPLE_RATE)?;
                    if !found_speech {
                        debug!(path = %audio.display(), "no speech detected, skipping recognition");
                        samples.clear();
                    }
                }
                None => {
                    warn!(path = %audio.display(), "VAD requested but no VAD model loaded, skipping filter");
                }
            }
        }

        if samples.is_empty() {
            let info = RunInfo {
                language: opts.language.clone(),
                duration,
            };
            return Ok((
                WhisperSegmentStream {
                    inner: Vec::new().into_iter(),
                },
                info,
            ));
        }

        let state = self.run_full(opts, &samples)?;

        let mut segments = Vec::new();
        for (i, whisper_segment) in state.as_iter().enumerate() {
            segments.push(to_segment(i as i64, whisper_segment)?);
        }

        let language = opts.language.clone().or_else(|| {
            whisper_rs::get_lang_str(state.full_lang_id_from_state()).map(str::to_owned)
        });

        Ok((
            WhisperSegmentStream {
                inner: segments.into_iter(),
            },
            RunInfo { language, duration },
        ))
    }
}

impl WhisperBackend {
    fn run_full(&self, opts: &DecodeOpts, samples: &[f32]) -> Result<WhisperState> {
        let params = self.build_full_params(opts);

        let mut state = self
            .ctx
            .create_state()
            .context("failed to create whisper state")?;

        state
            .full(params, samples)
            .context("failed to run whisper full()")?;

        Ok(state)
    }

    fn build_full_params<'a>(&self, opts: &'a DecodeOpts) -> FullParams<'a, 'a> {
        let mut params = FullParams::new(SamplingStrategy::BeamSearch {
            beam_size: opts.beam_size as i32,
            patience: 1.0,
        });

        let threads = if self.threads > 0 {
            self.threads
        } else {
            num_cpus::get()
        };
        params.set_n_threads(threads as i32);

        params.set_translate(opts.task == Task::Translate);
        params.set_language(opts.language.as_deref());
        params.set_no_context(true);
        params.set_single_segment(false);

        params.set_print_progress(false);
        params.set_print_special(false);
        params.set_print_realtime(false);
        params.set_print_timestamps(false);

        // Only segment-level timing is consumed downstream; never pay for
        // word-level timestamps.
        params.set_token_timestamps(false);

        params
    }
}

fn to_segment(id: i64, segment: WhisperSegment) -> Result<Segment> {
    let text = segment
        .to_str()
        .context("failed to get segment text")?
        .to_owned();

    Ok(Segment {
        id,
        start: centiseconds_to_seconds(segment.start_timestamp()),
        end: centiseconds_to_seconds(segment.end_timestamp()),
        text,
        avg_logprob: avg_token_logprob(&segment)?,
        // whisper-rs exposes neither of these at the segment level.
        no_speech_prob: None,
        temperature: None,
    })
}

/// Mean natural-log probability across the segment's tokens, when tokens are
/// available.
fn avg_token_logprob(segment: &WhisperSegment) -> Result<Option<f64>> {
    let token_count = segment.n_tokens();
    if token_count <= 0 {
        return Ok(None);
    }

    let mut sum = 0.0f64;
    for i in 0..token_count {
        let token = segment
            .get_token(i)
            .context("failed to get token from segment")?;
        let p = f64::from(token.token_data().p).max(f64::MIN_POSITIVE);
        sum += p.ln();
    }

    Ok(Some(sum / f64::from(token_count)))
}

fn centiseconds_to_seconds(value: i64) -> f64 {
    // whisper uses -1 for unknown; clamp to 0 so consumers never see -0.01s.
    if value < 0 { 0.0 } else { value as f64 / 100.0 }
}
