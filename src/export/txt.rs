use crate::segments::TranscriptionResult;

/// Render the plain-text artifact: all segment texts (trimmed) joined with a
/// single space, the whole result trimmed, plus exactly one trailing newline.
pub fn render(result: &TranscriptionResult) -> String {
    let joined = result
        .segments
        .iter()
        .map(|seg| seg.trimmed_text())
        .collect::<Vec<_>>()
        .join(" ");

    let mut out = joined.trim().to_string();
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segments::Segment;

    fn seg(text: &str) -> Segment {
        Segment {
            id: 0,
            start: 0.0,
            end: 1.0,
            text: text.to_string(),
            avg_logprob: None,
            no_speech_prob: None,
            temperature: None,
        }
    }

    fn result(segments: Vec<Segment>) -> TranscriptionResult {
        TranscriptionResult {
            language: None,
            duration: None,
            segments,
        }
    }

    #[test]
    fn joins_trimmed_texts_with_single_spaces() {
        let out = render(&result(vec![seg(" Hello"), seg(" world ")]));
        assert_eq!(out, "Hello world\n");
    }

    #[test]
    fn empty_result_is_a_single_newline() {
        assert_eq!(render(&result(vec![])), "\n");
    }

    #[test]
    fn empty_segments_collapse_when_trimming() {
        // An all-whitespace segment contributes an empty join slot; the outer
        // trim removes leading/trailing fallout.
        let out = render(&result(vec![seg("  "), seg("Hello")]));
        assert_eq!(out, "Hello\n");
    }
}
