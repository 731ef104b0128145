//! Per-file transcription orchestration.
//!
//! One backend handle serves the whole run; this module drives a single file
//! through it: start the backend, drain its lazy segment stream fully,
//! forward every segment's end time to the caller's progress hook, then
//! assemble the finished [`TranscriptionResult`]. Failures here are per-file
//! by construction: the caller catches [`Error::TranscriptionFailed`] at the
//! batch boundary and moves on to the next file.

use std::path::Path;

use tracing::debug;

use crate::backend::{Backend, SegmentStream};
use crate::error::{Error, Result};
use crate::opts::DecodeOpts;
use crate::segments::TranscriptionResult;

/// Transcribe one audio file to completion.
///
/// `on_segment_end` is invoked once per segment, in stream order, with the
/// segment's end time and the run's total duration (if known). The stream is
/// drained fully before success is declared; an error mid-stream is an
/// explicit early exit — the partially collected segments are discarded and
/// the stream is dropped so the backend can clean up.
pub fn transcribe_one<B: Backend>(
    backend: &mut B,
    audio: &Path,
    opts: &DecodeOpts,
    mut on_segment_end: impl FnMut(f64, Option<f64>),
) -> Result<TranscriptionResult> {
    let failed = |message: String| Error::TranscriptionFailed {
        path: audio.to_path_buf(),
        message,
    };

    let (mut stream, info) = backend
        .transcribe(audio, opts)
        .map_err(|err| failed(err.to_string()))?;

    let mut segments = Vec::new();
    loop {
        match stream.next_segment() {
            Ok(Some(segment)) => {
                on_segment_end(segment.end, info.duration);
                segments.push(segment);
            }
            Ok(None) => break,
            Err(err) => return Err(failed(err.to_string())),
        }
    }

    debug!(
        path = %audio.display(),
        segments = segments.len(),
        language = info.language.as_deref().unwrap_or("unknown"),
        "transcription complete"
    );

    Ok(TranscriptionResult {
        language: info.language,
        duration: info.duration,
        segments,
    })
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::backend::RunInfo;
    use crate::segments::Segment;

    fn seg(id: i64, start: f64, end: f64, text: &str) -> Segment {
        Segment {
            id,
            start,
            end,
            text: text.to_string(),
            avg_logprob: None,
            no_speech_prob: None,
            temperature: None,
        }
    }

    /// Yields scripted results, optionally failing after `fail_after` pulls.
    struct ScriptedStream {
        segments: std::vec::IntoIter<Segment>,
        fail_after: Option<usize>,
        pulled: usize,
    }

    impl SegmentStream for ScriptedStream {
        fn next_segment(&mut self) -> Result<Option<Segment>> {
            if self.fail_after.is_some_and(|n| self.pulled >= n) {
                return Err(Error::msg("decoder blew up"));
            }
            self.pulled += 1;
            Ok(self.segments.next())
        }
    }

    struct ScriptedBackend {
        segments: Vec<Segment>,
        info: RunInfo,
        fail_after: Option<usize>,
    }

    impl Backend for ScriptedBackend {
        type Stream = ScriptedStream;

        fn transcribe(
            &mut self,
            _audio: &Path,
            _opts: &DecodeOpts,
        ) -> Result<(Self::Stream, RunInfo)> {
            Ok((
                ScriptedStream {
                    segments: self.segments.clone().into_iter(),
                    fail_after: self.fail_after,
                    pulled: 0,
                },
                self.info.clone(),
            ))
        }
    }

    #[test]
    fn drains_stream_and_forwards_end_times_in_order() -> anyhow::Result<()> {
        let mut backend = ScriptedBackend {
            segments: vec![seg(0, 0.0, 1.2, "Hello"), seg(1, 1.2, 3.0, "world")],
            info: RunInfo {
                language: Some("en".to_string()),
                duration: Some(3.0),
            },
            fail_after: None,
        };

        let mut observed = Vec::new();
        let result = transcribe_one(
            &mut backend,
            &PathBuf::from("a.m4a"),
            &DecodeOpts::default(),
            |end, total| observed.push((end, total)),
        )?;

        assert_eq!(observed, vec![(1.2, Some(3.0)), (3.0, Some(3.0))]);
        assert_eq!(result.segments.len(), 2);
        assert_eq!(result.language.as_deref(), Some("en"));
        assert_eq!(result.duration, Some(3.0));
        Ok(())
    }

    #[test]
    fn mid_stream_error_becomes_transcription_failed() {
        let mut backend = ScriptedBackend {
            segments: vec![seg(0, 0.0, 1.0, "partial"), seg(1, 1.0, 2.0, "never seen")],
            info: RunInfo::default(),
            fail_after: Some(1),
        };

        let err = transcribe_one(
            &mut backend,
            &PathBuf::from("b.m4a"),
            &DecodeOpts::default(),
            |_, _| {},
        )
        .unwrap_err();

        match err {
            Error::TranscriptionFailed { path, message } => {
                assert_eq!(path, PathBuf::from("b.m4a"));
                assert!(message.contains("decoder blew up"));
            }
            other => panic!("expected TranscriptionFailed, got {other:?}"),
        }
    }

    #[test]
    fn empty_stream_yields_empty_result() -> anyhow::Result<()> {
        let mut backend = ScriptedBackend {
            segments: vec![],
            info: RunInfo {
                language: None,
                duration: Some(12.5),
            },
            fail_after: None,
        };

        let result = transcribe_one(
            &mut backend,
            &PathBuf::from("silence.m4a"),
            &DecodeOpts::default(),
            |_, _| panic!("no segments, no progress"),
        )?;

        assert!(result.segments.is_empty());
        assert_eq!(result.duration, Some(12.5));
        Ok(())
    }
}
