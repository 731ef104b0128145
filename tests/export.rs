use std::fs;

use murmur::export::{self, OutputFormat, WriteOutcome};
use murmur::segments::{Segment, TranscriptionResult};

fn seg(id: i64, start: f64, end: f64, text: &str) -> Segment {
    Segment {
        id,
        start,
        end,
        text: text.to_string(),
        avg_logprob: Some(-0.3),
        no_speech_prob: Some(0.01),
        temperature: None,
    }
}

fn two_segment_result() -> TranscriptionResult {
    TranscriptionResult {
        language: Some("en".to_string()),
        duration: Some(3.005),
        segments: vec![seg(0, 0.0, 1.2, " Hello"), seg(1, 1.2, 3.005, " world")],
    }
}

#[test]
fn all_formats_produce_the_expected_artifacts() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let result = two_segment_result();

    let reports = export::write_outputs(dir.path(), "episode", &result, OutputFormat::All, true)?;

    assert_eq!(reports.len(), 4);
    assert!(reports.iter().all(|r| r.outcome == WriteOutcome::Written));

    let txt = fs::read_to_string(dir.path().join("episode.txt"))?;
    assert_eq!(txt, "Hello world\n");

    let srt = fs::read_to_string(dir.path().join("episode.srt"))?;
    assert!(srt.starts_with(
        "1\n00:00:00,000 --> 00:00:01,200\nHello\n\n2\n00:00:01,200 --> 00:00:03,005\nworld\n\n"
    ));

    let vtt = fs::read_to_string(dir.path().join("episode.vtt"))?;
    assert!(vtt.starts_with("WEBVTT\n\n"));
    assert!(vtt.contains("00:00:00.000 --> 00:00:01.200\nHello\n\n"));

    let parsed: TranscriptionResult =
        serde_json::from_str(&fs::read_to_string(dir.path().join("episode.json"))?)?;
    assert_eq!(parsed, result);

    Ok(())
}

#[test]
fn single_format_selection_writes_only_that_artifact() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;

    let reports = export::write_outputs(
        dir.path(),
        "episode",
        &two_segment_result(),
        OutputFormat::Srt,
        true,
    )?;

    assert_eq!(reports.len(), 1);
    assert!(dir.path().join("episode.srt").exists());
    assert!(!dir.path().join("episode.txt").exists());
    assert!(!dir.path().join("episode.json").exists());
    Ok(())
}

#[test]
fn overwrite_disabled_skips_and_preserves_existing_content() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let existing = dir.path().join("episode.txt");
    fs::write(&existing, "precious manual edits\n")?;

    let reports = export::write_outputs(
        dir.path(),
        "episode",
        &two_segment_result(),
        OutputFormat::Txt,
        false,
    )?;

    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].outcome, WriteOutcome::Skipped);
    assert_eq!(fs::read_to_string(&existing)?, "precious manual edits\n");
    Ok(())
}

#[test]
fn overwrite_enabled_replaces_existing_content() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let existing = dir.path().join("episode.txt");
    fs::write(&existing, "stale\n")?;

    let reports = export::write_outputs(
        dir.path(),
        "episode",
        &two_segment_result(),
        OutputFormat::Txt,
        true,
    )?;

    assert_eq!(reports[0].outcome, WriteOutcome::Written);
    assert_eq!(fs::read_to_string(&existing)?, "Hello world\n");
    Ok(())
}

#[test]
fn json_artifact_keeps_nulls_and_non_ascii() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let result = TranscriptionResult {
        language: None,
        duration: None,
        segments: vec![Segment {
            id: 0,
            start: 0.0,
            end: 1.0,
            text: " héllo wörld".to_string(),
            avg_logprob: None,
            no_speech_prob: None,
            temperature: None,
        }],
    };

    export::write_outputs(dir.path(), "accents", &result, OutputFormat::Json, true)?;

    let json = fs::read_to_string(dir.path().join("accents.json"))?;
    assert!(json.contains("\"language\": null"));
    assert!(json.contains("héllo wörld"));
    assert!(!json.contains("\\u"));
    Ok(())
}
